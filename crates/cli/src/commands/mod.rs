//! Command handlers for the DocuChat CLI.

pub mod ask;
pub mod chat;
pub mod extract;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use extract::ExtractCommand;

use docuchat_core::{config::AppConfig, AppError, AppResult};
use docuchat_docs::{AnswerSettings, IngestReport};
use docuchat_llm::{create_client, LlmClient};
use docuchat_prompt::load_answer_prompt;
use std::sync::Arc;
use std::time::Duration;

/// Create the configured LLM client and answer settings.
///
/// The API key is read from the environment here, right before use.
pub(crate) fn connect(config: &AppConfig) -> AppResult<(Arc<dyn LlmClient>, AnswerSettings)> {
    let api_key = config.resolve_api_key();
    let timeout = config.timeout_secs.map(Duration::from_secs);

    let client = create_client(
        &config.provider,
        config.endpoint.as_deref(),
        api_key.as_deref(),
        timeout,
    )
    .map_err(AppError::Config)?;

    let prompt = load_answer_prompt(&config.workspace)?;
    let settings = AnswerSettings::new(&config.model, config.temperature).with_prompt(prompt);

    tracing::debug!(
        "Using provider {} with model {} (temperature {})",
        client.provider_name(),
        settings.model,
        settings.temperature
    );

    Ok((client, settings))
}

/// Print per-file warnings for an ingestion batch to stderr.
pub(crate) fn report_failures(report: &IngestReport) {
    for failure in &report.failures {
        eprintln!("warning: {}", failure.message);
    }
}
