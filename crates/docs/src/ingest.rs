//! File ingestion with per-file failure tolerance.
//!
//! One unreadable file never aborts a batch: it is logged, recorded in the
//! report and skipped, and the remaining files are still processed.

use crate::document::{DocumentKind, ExtractText};
use docuchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A document whose text has been extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    /// File name (no directory)
    pub name: String,

    /// Full path the document was read from
    pub path: PathBuf,

    pub kind: DocumentKind,

    /// Extracted plain text
    pub text: String,
}

/// Why a file contributed no document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// Extension is neither .pdf nor .csv
    Unsupported,
    /// Extraction succeeded but produced no text
    NoText,
}

/// A file that was skipped without an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// A file whose extraction failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of ingesting a batch of files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub documents: Vec<UploadedDocument>,
    pub failures: Vec<FailedFile>,
    pub skipped: Vec<SkippedFile>,
}

impl IngestReport {
    /// Extracted texts in ingestion order.
    pub fn texts(&self) -> Vec<&str> {
        self.documents.iter().map(|doc| doc.text.as_str()).collect()
    }

    /// Whether at least one document has text.
    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }
}

/// Outcome of ingesting a single file.
enum FileOutcome {
    Document(UploadedDocument),
    Skipped(SkipReason),
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read and extract a single file.
fn ingest_file(path: &Path) -> AppResult<FileOutcome> {
    let Some(kind) = DocumentKind::from_path(path) else {
        tracing::debug!("Ignoring unsupported file: {:?}", path);
        return Ok(FileOutcome::Skipped(SkipReason::Unsupported));
    };

    let name = file_name(path);
    let bytes = std::fs::read(path).map_err(|e| AppError::extraction(&name, e))?;
    let text = kind.extract_text(&name, &bytes)?;

    if text.is_empty() {
        tracing::debug!("No text extracted from {:?}", path);
        return Ok(FileOutcome::Skipped(SkipReason::NoText));
    }

    tracing::debug!("Extracted {} chars from {} ({})", text.chars().count(), name, kind.as_str());

    Ok(FileOutcome::Document(UploadedDocument {
        name,
        path: path.to_path_buf(),
        kind,
        text,
    }))
}

/// Expand directories into the files they contain, sorted by name.
///
/// Plain file arguments are kept as given, in order.
pub fn collect_paths(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && DocumentKind::from_path(entry_path).is_some() {
                    paths.push(entry_path.to_path_buf());
                }
            }
        } else {
            paths.push(input.clone());
        }
    }

    paths
}

/// Ingest files and directories, tolerating per-file failures.
pub fn ingest_files(inputs: &[PathBuf]) -> IngestReport {
    let mut report = IngestReport::default();

    for path in collect_paths(inputs) {
        match ingest_file(&path) {
            Ok(FileOutcome::Document(document)) => report.documents.push(document),
            Ok(FileOutcome::Skipped(reason)) => report.skipped.push(SkippedFile { path, reason }),
            Err(e) => {
                tracing::warn!("{}", e);
                report.failures.push(FailedFile {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "Ingested {} documents ({} failed, {} skipped)",
        report.documents.len(),
        report.failures.len(),
        report.skipped.len()
    );

    report
}
