//! Ollama LLM provider implementation.
//!
//! Lets DocuChat answer from a local model instead of Groq.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-chat-completion

use crate::client::{
    ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage,
};
use crate::providers::{api_error, http_client, line_stream};
use docuchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL for a local Ollama daemon.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Display name used in error messages.
const PROVIDER: &str = "Ollama";

/// Ollama chat request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Ollama chat response format (also one NDJSON line when streaming).
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    #[serde(default)]
    message: Option<OllamaMessage>,
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

impl OllamaChatResponse {
    fn usage(&self) -> LlmUsage {
        LlmUsage::new(
            self.prompt_eval_count.unwrap_or(0),
            self.eval_count.unwrap_or(0),
        )
    }

    fn into_content(self) -> String {
        self.message.map(|m| m.content).unwrap_or_default()
    }
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    pub fn new() -> Result<Self, String> {
        Self::with_base_url(OLLAMA_BASE_URL, None)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, String> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
        })
    }

    /// Convert LlmRequest to Ollama format.
    fn to_ollama_request<'a>(&self, request: &'a LlmRequest, stream: bool) -> OllamaChatRequest<'a> {
        let options = request.temperature.map(|temperature| OllamaOptions {
            temperature: Some(temperature),
        });

        OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream,
            options,
        }
    }

    async fn send(&self, request: &LlmRequest, stream: bool) -> AppResult<reqwest::Response> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&self.to_ollama_request(request, stream))
            .send()
            .await
            .map_err(|e| AppError::api(PROVIDER, format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }

        Ok(response)
    }
}

/// Parse one NDJSON line of a streaming chat response.
fn parse_ndjson_line(line: &str) -> Option<AppResult<LlmStreamChunk>> {
    let parsed: OllamaChatResponse = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(e) => return Some(Err(AppError::api(PROVIDER, format!("Failed to parse chunk: {}", e)))),
    };

    let usage = parsed.done.then(|| parsed.usage());
    let model = parsed.model.clone();
    let done = parsed.done;

    Some(Ok(LlmStreamChunk {
        content: parsed.into_content(),
        model,
        done,
        usage,
    }))
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Ollama");
        tracing::debug!("Model: {}, messages: {}", request.model, request.messages.len());

        let response = self.send(request, false).await?;

        // For non-streaming, Ollama returns a single JSON object
        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::api(PROVIDER, format!("Failed to parse response: {}", e)))?;

        tracing::info!("Received completion from Ollama");

        let usage = parsed.usage();
        let model = parsed.model.clone();
        Ok(LlmResponse {
            content: parsed.into_content(),
            model,
            usage,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::info!("Starting streaming request to Ollama");

        let response = self.send(request, true).await?;
        Ok(line_stream(PROVIDER, response.bytes_stream(), parse_ndjson_line))
    }
}
