//! Prompt system for DocuChat.
//!
//! - Built-in answer prompt (system instruction + context/question template)
//! - YAML overrides under `.docuchat/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{load_answer_prompt, load_prompt};
pub use types::{
    BuiltPrompt, PromptDefinition, ANSWER_PROMPT_ID, ANSWER_SYSTEM,
    ANSWER_TEMPLATE,
};
