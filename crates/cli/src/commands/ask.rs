//! Ask command handler.
//!
//! One-shot question over a set of files: ingest, select context, answer.

use clap::Args;
use docuchat_core::{config::AppConfig, AppError, AppResult};
use docuchat_docs::{
    generate_answer, ingest_files, select_context, stream_answer, Answer, IngestReport,
};
use std::io::Write;
use std::path::PathBuf;

use super::{connect, report_failures};

/// Ask a single question about one or more documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// PDF/CSV files or directories to read
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// The question to ask
    #[arg(short, long)]
    pub question: String,

    /// Wait for the full answer instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// Print the selected context to stderr before the answer
    #[arg(long)]
    pub show_context: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question.trim();
        if question.is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let report = ingest_files(&self.files);
        report_failures(&report);

        if !report.has_documents() {
            return Err(AppError::Config(
                "No text found in the provided files".to_string(),
            ));
        }

        let context = select_context(&report.texts(), question);
        if self.show_context {
            eprintln!("--- context ({} chars) ---", context.chars().count());
            eprintln!("{}", context);
            eprintln!("--- end context ---");
        }

        let (client, settings) = connect(config)?;

        let result = if self.is_streaming() {
            let answer = stream_answer(client.as_ref(), &settings, &context, question, |token| {
                print!("{}", token);
                std::io::stdout().flush().ok();
            })
            .await;
            if answer.is_ok() {
                println!();
            }
            answer
        } else {
            generate_answer(client.as_ref(), &settings, &context, question).await
        };

        let answer = match result {
            Ok(answer) => answer,
            Err(e) => {
                if e.is_api() {
                    eprintln!("{}", e.transcript_text());
                }
                return Err(e);
            }
        };

        if self.json {
            self.print_json(&answer, config, &report, &context)?;
        } else if !self.is_streaming() {
            println!("{}", answer.content);
        }

        if let Some(usage) = answer.usage {
            tracing::debug!(
                "Token usage - Prompt: {}, Completion: {}, Total: {}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        Ok(())
    }

    /// Check if streaming is enabled; JSON output needs the whole answer first.
    pub fn is_streaming(&self) -> bool {
        !self.no_stream && !self.json
    }

    fn print_json(
        &self,
        answer: &Answer,
        config: &AppConfig,
        report: &IngestReport,
        context: &str,
    ) -> AppResult<()> {
        let documents: Vec<&str> = report.documents.iter().map(|d| d.name.as_str()).collect();
        let failures: Vec<&str> = report.failures.iter().map(|f| f.message.as_str()).collect();

        let output = serde_json::json!({
            "answer": answer.content,
            "model": answer.model,
            "provider": config.provider,
            "usage": answer.usage,
            "documents": documents,
            "failures": failures,
            "contextChars": context.chars().count(),
        });

        let json = serde_json::to_string_pretty(&output)?;
        println!("{}", json);
        Ok(())
    }
}
