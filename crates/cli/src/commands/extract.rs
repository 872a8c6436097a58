//! Extract command handler.
//!
//! Prints the text DocuChat would search, per document.

use clap::Args;
use docuchat_core::{AppError, AppResult};
use docuchat_docs::ingest_files;
use std::path::PathBuf;

use super::report_failures;

/// Show the text extracted from documents
#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// PDF/CSV files or directories to read
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output the full ingestion report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ExtractCommand {
    pub async fn execute(&self) -> AppResult<()> {
        tracing::info!("Executing extract command");

        let report = ingest_files(&self.files);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        report_failures(&report);
        for doc in &report.documents {
            println!(
                "==> {} ({}, {} chars) <==",
                doc.name,
                doc.kind.as_str(),
                doc.text.chars().count()
            );
            println!("{}", doc.text);
        }

        if !report.has_documents() {
            return Err(AppError::Config("No text found.".to_string()));
        }

        Ok(())
    }
}
