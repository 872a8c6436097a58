//! Groq LLM provider implementation.
//!
//! Groq exposes an OpenAI-compatible chat-completions API:
//! https://console.groq.com/docs/api-reference#chat-create
//! Streaming responses are server-sent events terminated by `data: [DONE]`.

use crate::client::{
    ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage,
};
use crate::providers::{api_error, http_client, line_stream};
use docuchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL for the Groq API.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Display name used in error messages.
const PROVIDER: &str = "Groq";

/// Chat-completion request body.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageBody {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl From<UsageBody> for LlmUsage {
    fn from(usage: UsageBody) -> Self {
        LlmUsage::new(usage.prompt_tokens, usage.completion_tokens)
    }
}

/// One server-sent event of a streaming completion.
#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<UsageBody>,
    /// Groq reports usage on the last event under `x_groq`
    #[serde(default)]
    x_groq: Option<GroqExtension>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroqExtension {
    #[serde(default)]
    usage: Option<UsageBody>,
}

/// Groq LLM client.
pub struct GroqClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a client for the public Groq endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, String> {
        Self::with_base_url(GROQ_BASE_URL, api_key, None)
    }

    /// Create a client for a custom OpenAI-compatible endpoint.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, String> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: http_client(timeout)?,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn to_body<'a>(&self, request: &'a LlmRequest, stream: bool) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            stream,
        }
    }

    async fn send(&self, request: &LlmRequest, stream: bool) -> AppResult<reqwest::Response> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::api(PROVIDER, "Missing API key (set GROQ_API_KEY)"));
        }

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&self.to_body(request, stream))
            .send()
            .await
            .map_err(|e| AppError::api(PROVIDER, format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }

        Ok(response)
    }
}

/// Convert a full chat-completion body into an `LlmResponse`.
fn convert_response(body: ChatCompletionResponse) -> AppResult<LlmResponse> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AppError::api(PROVIDER, "Response has no choices[0].message.content"))?;

    Ok(LlmResponse {
        content,
        model: body.model,
        usage: body.usage.map(LlmUsage::from).unwrap_or_default(),
    })
}

/// Parse one SSE line of a streaming completion.
fn parse_sse_line(line: &str) -> Option<AppResult<LlmStreamChunk>> {
    let payload = line.strip_prefix("data:")?.trim();

    if payload == "[DONE]" {
        return Some(Ok(LlmStreamChunk {
            content: String::new(),
            model: String::new(),
            done: true,
            usage: None,
        }));
    }

    let event: StreamEvent = match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(e) => return Some(Err(AppError::api(PROVIDER, format!("Failed to parse chunk: {}", e)))),
    };

    let content = event
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta.content)
        .collect::<String>();
    let usage = event
        .usage
        .or_else(|| event.x_groq.and_then(|x| x.usage))
        .map(LlmUsage::from);

    Some(Ok(LlmStreamChunk {
        content,
        model: event.model,
        done: false,
        usage,
    }))
}

#[async_trait::async_trait]
impl LlmClient for GroqClient {
    fn provider_name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Groq");
        tracing::debug!("Model: {}, messages: {}", request.model, request.messages.len());

        let response = self.send(request, false).await?;

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::api(PROVIDER, format!("Failed to parse response: {}", e)))?;

        tracing::info!("Received completion from Groq");
        convert_response(body)
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::info!("Starting streaming request to Groq");
        tracing::debug!("Model: {}, messages: {}", request.model, request.messages.len());

        let response = self.send(request, true).await?;
        Ok(line_stream(PROVIDER, response.bytes_stream(), parse_sse_line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_client_creation() {
        let client = GroqClient::new("gsk_test").unwrap();
        assert_eq!(client.provider_name(), "groq");
        assert_eq!(
            client.completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_call_time() {
        let client = GroqClient::new("").unwrap();
        let request = LlmRequest::new("llama-3.1-8b-instant").with_message(ChatMessage::user("hi"));

        let err = client.complete(&request).await.unwrap_err();
        assert!(err.is_api());
        assert_eq!(
            err.transcript_text(),
            "Error communicating with Groq: Missing API key (set GROQ_API_KEY)"
        );
    }

    #[test]
    fn test_custom_base_url_trailing_slash() {
        let client = GroqClient::with_base_url("http://localhost:8080/v1/", "k", None).unwrap();
        assert_eq!(client.completions_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_request_body() {
        let client = GroqClient::new("gsk_test").unwrap();
        let request = LlmRequest::new("llama-3.1-8b-instant")
            .with_message(ChatMessage::system("sys"))
            .with_message(ChatMessage::user("hi"))
            .with_temperature(0.5);

        let body = serde_json::to_value(client.to_body(&request, false)).unwrap();
        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_convert_response() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{
                "model": "llama-3.1-8b-instant",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "42"}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
            }"#,
        )
        .unwrap();

        let response = convert_response(body).unwrap();
        assert_eq!(response.content, "42");
        assert_eq!(response.usage, LlmUsage::new(10, 2));
    }

    #[test]
    fn test_convert_response_without_choices() {
        let body: ChatCompletionResponse =
            serde_json::from_str(r#"{"model": "m", "choices": []}"#).unwrap();
        assert!(matches!(convert_response(body), Err(AppError::Api { .. })));
    }

    #[test]
    fn test_parse_sse_lines() {
        let chunk = parse_sse_line(
            r#"data: {"model":"m","choices":[{"index":0,"delta":{"content":"Hel"}}]}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(chunk.content, "Hel");
        assert!(!chunk.done);

        let last = parse_sse_line(
            r#"data: {"model":"m","choices":[{"index":0,"delta":{},"finish_reason":"stop"}],"x_groq":{"usage":{"prompt_tokens":5,"completion_tokens":3}}}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(last.content, "");
        assert_eq!(last.usage, Some(LlmUsage::new(5, 3)));

        let done = parse_sse_line("data: [DONE]").unwrap().unwrap();
        assert!(done.done);

        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(matches!(parse_sse_line("data: {oops"), Some(Err(AppError::Api { .. }))));
    }
}
