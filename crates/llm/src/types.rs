//! Provider identification.

use crate::providers::{groq::GROQ_BASE_URL, ollama::OLLAMA_BASE_URL};

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Groq,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "groq" => Some(Self::Groq),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Ollama => "ollama",
        }
    }

    /// Endpoint used when no custom one is configured.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Groq => GROQ_BASE_URL,
            Self::Ollama => OLLAMA_BASE_URL,
        }
    }

    /// Whether the provider needs an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Groq)
    }
}
