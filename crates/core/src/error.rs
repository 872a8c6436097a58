//! Error types for DocuChat.
//!
//! Each failure domain gets its own variant so callers can surface
//! extraction problems, remote API failures and configuration mistakes
//! differently instead of collapsing them into plain text.

use thiserror::Error;

/// Unified error type for DocuChat.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing API key, bad config file, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Text extraction failed for a single document
    #[error("Failed to extract text from '{file}': {reason}")]
    Extraction { file: String, reason: String },

    /// The remote LLM API failed (network, HTTP status, malformed body)
    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build an extraction error for the named file.
    pub fn extraction(file: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Extraction {
            file: file.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an API error; `provider` is the display name ("Groq", "Ollama").
    pub fn api(provider: impl Into<String>, message: impl ToString) -> Self {
        AppError::Api {
            provider: provider.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error came from the remote LLM API.
    pub fn is_api(&self) -> bool {
        matches!(self, AppError::Api { .. })
    }

    /// Text shown in the chat transcript in place of an answer.
    ///
    /// API failures name the provider that failed; every other error falls
    /// back to its `Display` form.
    pub fn transcript_text(&self) -> String {
        match self {
            AppError::Api { provider, message } => {
                format!("Error communicating with {}: {}", provider, message)
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
