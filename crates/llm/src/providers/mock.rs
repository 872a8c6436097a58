//! Scripted provider for testing and offline development.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use docuchat_core::{AppError, AppResult};
use std::sync::Mutex;

/// Mock provider that replies with a fixed answer or a fixed API failure.
///
/// Every request is recorded so tests can inspect the exact messages
/// that would have been sent over the wire.
#[derive(Debug)]
pub struct MockClient {
    reply: Result<String, String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockClient {
    /// Mock that answers every request with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Mock that fails every request with an API error from provider "Mock".
    pub fn failing(details: impl Into<String>) -> Self {
        Self {
            reply: Err(details.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn record(&self, request: &LlmRequest) -> AppResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.reply
            .clone()
            .map_err(|details| AppError::api("Mock", details))
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let content = self.record(request)?;
        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        let content = self.record(request)?;
        let model = request.model.clone();

        // One chunk per word, then a terminal chunk
        let mut chunks: Vec<AppResult<LlmStreamChunk>> = content
            .split_inclusive(' ')
            .map(|piece| {
                Ok(LlmStreamChunk {
                    content: piece.to_string(),
                    model: model.clone(),
                    done: false,
                    usage: None,
                })
            })
            .collect();
        chunks.push(Ok(LlmStreamChunk {
            content: String::new(),
            model,
            done: true,
            usage: Some(LlmUsage::default()),
        }));

        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}
