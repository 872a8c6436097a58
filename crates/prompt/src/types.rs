//! Prompt types for DocuChat.

use serde::{Deserialize, Serialize};

/// Identifier of the built-in answer prompt.
pub const ANSWER_PROMPT_ID: &str = "docuchat.answer";

/// System instruction sent with every answer request.
pub const ANSWER_SYSTEM: &str =
    "You are a helpful assistant. Answer strictly based on the context provided.";

/// User message template; `context` and `question` are filled in.
pub const ANSWER_TEMPLATE: &str = "Context:\n{{context}}\n\nQuestion: {{question}}";

/// A prompt definition, built in or loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// System message template (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User message template with Handlebars syntax
    pub template: String,
}

impl PromptDefinition {
    /// The built-in document answering prompt.
    pub fn answer() -> Self {
        Self {
            id: ANSWER_PROMPT_ID.to_string(),
            title: "Answer from document context".to_string(),
            api_version: "1.0".to_string(),
            system: Some(ANSWER_SYSTEM.to_string()),
            template: ANSWER_TEMPLATE.to_string(),
        }
    }
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,
}
