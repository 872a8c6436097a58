//! LLM provider implementations.

pub mod groq;
pub mod mock;
pub mod ollama;

pub use groq::GroqClient;
pub use mock::MockClient;
pub use ollama::OllamaClient;

use crate::client::{LlmStream, LlmStreamChunk};
use docuchat_core::{AppError, AppResult};
use futures::{Stream, StreamExt};
use std::time::Duration;

/// Build the shared HTTP client, applying an optional request timeout.
pub(crate) fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client, String> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))
}

/// Turn an error response into an `AppError::Api` carrying status and body.
pub(crate) async fn api_error(provider: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AppError::api(provider, format!("HTTP {}: {}", status, error_text))
}

/// Split the remaining complete lines off the front of `buffer`.
///
/// A trailing partial line stays in the buffer until more bytes arrive,
/// so multi-byte characters split across network chunks decode intact.
pub(crate) fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&line).trim().to_string();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Take what is left in `buffer` once the body has ended.
pub(crate) fn drain_tail(buffer: &mut Vec<u8>) -> Option<String> {
    let line = String::from_utf8_lossy(&std::mem::take(buffer))
        .trim()
        .to_string();
    (!line.is_empty()).then_some(line)
}

/// Adapt a line-oriented HTTP body into an `LlmStream`.
///
/// `parse_line` returns `None` for lines that carry no chunk (comments,
/// keep-alives). A last line without a trailing newline is still parsed.
pub(crate) fn line_stream<S, B, E>(
    provider: &'static str,
    body: S,
    parse_line: fn(&str) -> Option<AppResult<LlmStreamChunk>>,
) -> LlmStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let stream = body
        .map(Some)
        .chain(futures::stream::once(futures::future::ready(None)))
        .scan(Vec::<u8>::new(), move |buffer, item| {
            let lines = match item {
                Some(Ok(bytes)) => {
                    buffer.extend_from_slice(bytes.as_ref());
                    Ok(drain_lines(buffer))
                }
                Some(Err(e)) => Err(AppError::api(provider, format!("Stream error: {}", e))),
                None => Ok(drain_tail(buffer).into_iter().collect()),
            };
            let chunks: Vec<AppResult<LlmStreamChunk>> = match lines {
                Ok(lines) => lines.iter().filter_map(|line| parse_line(line)).collect(),
                Err(e) => vec![Err(e)],
            };
            futures::future::ready(Some(futures::stream::iter(chunks)))
        })
        .flatten();

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_lines_keeps_partial_tail() {
        let mut buffer = b"data: one\n\ndata: tw".to_vec();
        let lines = drain_lines(&mut buffer);
        assert_eq!(lines, vec!["data: one".to_string()]);
        assert_eq!(buffer, b"data: tw".to_vec());

        buffer.extend_from_slice(b"o\n");
        assert_eq!(drain_lines(&mut buffer), vec!["data: two".to_string()]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_drain_lines_split_multibyte() {
        let text = "café\n".as_bytes();
        let mut buffer = text[..4].to_vec();
        assert!(drain_lines(&mut buffer).is_empty());
        buffer.extend_from_slice(&text[4..]);
        assert_eq!(drain_lines(&mut buffer), vec!["café".to_string()]);
    }

    fn echo(line: &str) -> Option<AppResult<LlmStreamChunk>> {
        Some(Ok(LlmStreamChunk {
            content: line.to_string(),
            model: String::new(),
            done: false,
            usage: None,
        }))
    }

    #[test]
    fn test_drain_tail() {
        let mut buffer = b"  data: [DONE] ".to_vec();
        assert_eq!(drain_tail(&mut buffer), Some("data: [DONE]".to_string()));
        assert!(buffer.is_empty());
        assert_eq!(drain_tail(&mut b"\r".to_vec()), None);
    }

    #[tokio::test]
    async fn test_line_stream_parses_unterminated_last_line() {
        let body = futures::stream::iter(vec![
            Ok::<_, String>(b"first\nsec".to_vec()),
            Ok(b"ond".to_vec()),
        ]);

        let contents: Vec<String> = line_stream("Test", body, echo)
            .map(|chunk| chunk.unwrap().content)
            .collect()
            .await;
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_line_stream_body_error_names_provider() {
        let body = futures::stream::iter(vec![Err::<Vec<u8>, _>("connection reset".to_string())]);

        let chunks: Vec<_> = line_stream("Test", body, echo).collect().await;
        assert_eq!(chunks.len(), 1);
        match &chunks[0] {
            Err(e) => assert_eq!(
                e.transcript_text(),
                "Error communicating with Test: Stream error: connection reset"
            ),
            Ok(_) => panic!("Expected a stream error"),
        }
    }
}
