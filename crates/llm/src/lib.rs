//! LLM integration crate for DocuChat.
//!
//! A provider-agnostic chat-completion interface with two backends:
//! - **Groq**: hosted, OpenAI-compatible API (default)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use docuchat_llm::{ChatMessage, LlmClient, LlmRequest, providers::GroqClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GroqClient::new("gsk_...")?;
//! let request = LlmRequest::new("llama-3.1-8b-instant")
//!     .with_message(ChatMessage::user("Hello, world!"));
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{
    ChatMessage, ChatRole, LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk,
    LlmUsage,
};
pub use factory::create_client;
pub use providers::{GroqClient, MockClient, OllamaClient};
pub use types::ProviderType;
