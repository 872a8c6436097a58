//! Supported document kinds and their text extractors.

use docuchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Capability of turning a file's raw bytes into plain text.
pub trait ExtractText: Send + Sync {
    /// Extract text; `name` is only used in error messages.
    fn extract_text(&self, name: &str, bytes: &[u8]) -> AppResult<String>;
}

/// Closed set of document kinds DocuChat can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Csv,
}

impl DocumentKind {
    /// Detect the kind from the file extension, case-insensitively.
    ///
    /// Returns `None` for every other extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
        }
    }

    /// The extractor for this kind.
    pub fn extractor(&self) -> &'static dyn ExtractText {
        match self {
            Self::Pdf => &PdfText,
            Self::Csv => &CsvText,
        }
    }
}

impl ExtractText for DocumentKind {
    fn extract_text(&self, name: &str, bytes: &[u8]) -> AppResult<String> {
        self.extractor().extract_text(name, bytes)
    }
}

/// PDF extraction: page texts in order, each followed by a newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfText;

impl ExtractText for PdfText {
    fn extract_text(&self, name: &str, bytes: &[u8]) -> AppResult<String> {
        // pdf-extract panics on some malformed files; treat that as a failed file
        let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map_err(|_| AppError::extraction(name, "PDF parser panicked"))?
            .map_err(|e| AppError::extraction(name, e))?;

        Ok(join_pages(&pages))
    }
}

/// Join page texts, each followed by a newline. Empty pages are dropped.
fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages.iter().filter(|page| !page.is_empty()) {
        text.push_str(page);
        text.push('\n');
    }
    text
}

/// CSV extraction: each row's fields joined by single spaces, one row per line.
///
/// Blank lines are rows with no fields and come out as empty lines, so
/// sections separated by blank rows stay separate paragraphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvText;

impl ExtractText for CsvText {
    fn extract_text(&self, name: &str, bytes: &[u8]) -> AppResult<String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut text = String::new();
        let mut record = csv::StringRecord::new();
        let mut consumed = 0;
        let mut previous = Terminator::Consumed;

        loop {
            let more = reader
                .read_record(&mut record)
                .map_err(|e| AppError::extraction(name, e))?;

            // The reader skips blank lines; recover them from the raw bytes
            let end = if more {
                (reader.position().byte() as usize).min(bytes.len())
            } else {
                bytes.len()
            };
            let raw = bytes.get(consumed..end).unwrap_or_default();
            for _ in 0..blank_lines(raw, previous) {
                text.push('\n');
            }

            if !more {
                break;
            }

            text.push_str(&record.iter().collect::<Vec<_>>().join(" "));
            text.push('\n');

            previous = match raw.last() {
                Some(b'\r') => Terminator::AfterCr,
                Some(b'\n') => Terminator::Consumed,
                _ => Terminator::Pending,
            };
            consumed = end;
        }

        Ok(text)
    }
}

/// How the bytes read for the previous record ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    /// Its line break was read with it (or there was no previous record)
    Consumed,
    /// It ended on `\r`; a following `\n` still belongs to it
    AfterCr,
    /// Its line break is at the start of the next read
    Pending,
}

/// Count the blank lines at the start of `raw`, the bytes read for one record.
fn blank_lines(raw: &[u8], previous: Terminator) -> usize {
    let mut rest = raw;
    if previous == Terminator::AfterCr {
        rest = rest.strip_prefix(b"\n").unwrap_or(rest);
    }

    let mut breaks: usize = 0;
    loop {
        rest = match rest {
            [b'\r', b'\n', tail @ ..] | [b'\r' | b'\n', tail @ ..] => tail,
            _ => break,
        };
        breaks += 1;
    }

    if previous == Terminator::Pending {
        breaks.saturating_sub(1)
    } else {
        breaks
    }
}
