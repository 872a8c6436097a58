//! In-memory chat session state.
//!
//! One session per process: the loaded documents and the transcript live
//! here and are passed by reference through every request.

use docuchat_core::{AppError, AppResult};
use docuchat_docs::{
    generate_answer, select_context, stream_answer, Answer, AnswerSettings, IngestReport,
    UploadedDocument,
};
use docuchat_llm::{ChatRole, LlmClient};
use serde::Serialize;

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub role: ChatRole,
    pub content: String,

    /// Set on assistant entries produced by a failed model call
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

/// Documents and conversation for one user.
#[derive(Debug, Default)]
pub struct ChatSession {
    documents: Vec<UploadedDocument>,
    messages: Vec<TranscriptEntry>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the loaded documents with the ones from `report`.
    ///
    /// Returns the number of documents now loaded. A report without
    /// documents leaves the previous ones in place.
    pub fn load(&mut self, report: IngestReport) -> usize {
        if report.has_documents() {
            self.documents = report.documents;
        }
        self.documents.len()
    }

    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }

    pub fn documents(&self) -> &[UploadedDocument] {
        &self.documents
    }

    pub fn history(&self) -> &[TranscriptEntry] {
        &self.messages
    }

    /// Forget the conversation; documents stay loaded.
    pub fn clear_history(&mut self) {
        self.messages.clear();
    }

    /// Unload every document.
    pub fn clear_documents(&mut self) {
        self.documents.clear();
    }

    /// Answer a question from the loaded documents.
    ///
    /// Text is passed to `on_token` as it arrives; without streaming the
    /// whole answer is passed once. A failed model call is still recorded
    /// in the transcript, flagged as an error, and then returned.
    pub async fn ask<F>(
        &mut self,
        client: &dyn LlmClient,
        settings: &AnswerSettings,
        question: &str,
        streaming: bool,
        mut on_token: F,
    ) -> AppResult<Answer>
    where
        F: FnMut(&str),
    {
        if !self.has_documents() {
            return Err(AppError::Config(
                "Please load a PDF or CSV file first".to_string(),
            ));
        }

        self.messages.push(TranscriptEntry {
            role: ChatRole::User,
            content: question.to_string(),
            error: false,
        });

        let texts: Vec<&str> = self.documents.iter().map(|d| d.text.as_str()).collect();
        let context = select_context(&texts, question);
        tracing::debug!("Selected {} chars of context", context.chars().count());

        let result = if streaming {
            stream_answer(client, settings, &context, question, &mut on_token).await
        } else {
            generate_answer(client, settings, &context, question)
                .await
                .map(|answer| {
                    on_token(&answer.content);
                    answer
                })
        };

        match result {
            Ok(answer) => {
                self.messages.push(TranscriptEntry {
                    role: ChatRole::Assistant,
                    content: answer.content.clone(),
                    error: false,
                });
                Ok(answer)
            }
            Err(e) => {
                self.messages.push(TranscriptEntry {
                    role: ChatRole::Assistant,
                    content: e.transcript_text(),
                    error: true,
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docuchat_docs::DocumentKind;
    use docuchat_llm::MockClient;
    use std::path::PathBuf;

    fn report(texts: &[&str]) -> IngestReport {
        IngestReport {
            documents: texts
                .iter()
                .enumerate()
                .map(|(i, text)| UploadedDocument {
                    name: format!("doc{}.csv", i),
                    path: PathBuf::from(format!("doc{}.csv", i)),
                    kind: DocumentKind::Csv,
                    text: text.to_string(),
                })
                .collect(),
            ..IngestReport::default()
        }
    }

    fn settings() -> AnswerSettings {
        AnswerSettings::new("llama-3.1-8b-instant", 0.5)
    }

    #[tokio::test]
    async fn test_ask_without_documents() {
        let mut session = ChatSession::new();
        let client = MockClient::replying("unused");

        let err = session
            .ask(&client, &settings(), "Anything?", false, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
        assert!(session.history().is_empty());
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_ask_records_exchange() {
        let mut session = ChatSession::new();
        assert_eq!(session.load(report(&["widgets 42\n"])), 1);
        let client = MockClient::replying("There are 42.");

        let mut printed = String::new();
        let answer = session
            .ask(&client, &settings(), "How many widgets?", false, |t| {
                printed.push_str(t)
            })
            .await
            .unwrap();

        assert_eq!(answer.content, "There are 42.");
        assert_eq!(printed, "There are 42.");
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].role, ChatRole::User);
        assert_eq!(session.history()[1].content, "There are 42.");
        assert!(!session.history()[1].error);
    }

    #[tokio::test]
    async fn test_api_failure_is_flagged_in_history() {
        let mut session = ChatSession::new();
        session.load(report(&["widgets 42\n"]));
        let client = MockClient::failing("timeout");

        let err = session
            .ask(&client, &settings(), "How many widgets?", true, |_| {})
            .await
            .unwrap_err();

        assert!(err.is_api());
        let last = session.history().last().unwrap();
        assert!(last.error);
        assert_eq!(last.content, "Error communicating with Mock: timeout");
    }

    #[tokio::test]
    async fn test_clear_history_keeps_documents() {
        let mut session = ChatSession::new();
        session.load(report(&["a b c\n"]));
        let client = MockClient::replying("ok");
        session
            .ask(&client, &settings(), "question", true, |_| {})
            .await
            .unwrap();

        session.clear_history();
        assert!(session.history().is_empty());
        assert!(session.has_documents());

        session.clear_documents();
        assert!(!session.has_documents());
    }

    #[test]
    fn test_empty_report_keeps_previous_documents() {
        let mut session = ChatSession::new();
        session.load(report(&["first"]));
        assert_eq!(session.load(IngestReport::default()), 1);
        assert_eq!(session.documents()[0].text, "first");
    }
}
