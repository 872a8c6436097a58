//! Document handling for DocuChat.
//!
//! - `document`: supported kinds (PDF, CSV) and their text extractors
//! - `ingest`: batch ingestion that skips failing files instead of aborting
//! - `context`: keyword-overlap selection of the passages sent to the model
//! - `answer`: prompt assembly and the model call

pub mod answer;
pub mod context;
pub mod document;
pub mod ingest;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use answer::{build_answer_request, generate_answer, stream_answer, Answer, AnswerSettings};
pub use context::{select_context, select_context_with, ContextOptions};
pub use document::{DocumentKind, ExtractText};
pub use ingest::{ingest_files, IngestReport, UploadedDocument};
