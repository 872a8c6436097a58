//! LLM provider factory.
//!
//! Creates LLM clients by provider name, injecting the endpoint, API key
//! and timeout resolved from configuration.

use crate::client::LlmClient;
use crate::providers::{GroqClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("groq", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key for Groq; without one, Groq requests fail with an API error
/// * `timeout` - Optional request timeout
///
/// # Errors
/// Returns an error message if the provider is unknown or the HTTP client
/// cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;
    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());

    tracing::debug!("Creating {} client for {}", provider_type.as_str(), base_url);

    if provider_type.requires_api_key() && api_key.map_or(true, |key| key.trim().is_empty()) {
        tracing::warn!("No {} API key set; requests will fail", provider_type.as_str());
    }

    match provider_type {
        ProviderType::Groq => {
            let client =
                GroqClient::with_base_url(base_url, api_key.unwrap_or_default(), timeout)?;
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => {
            let client = OllamaClient::with_base_url(base_url, timeout)?;
            Ok(Arc::new(client))
        }
    }
}
