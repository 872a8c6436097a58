//! Answer generation from selected context.

use docuchat_core::AppResult;
use docuchat_llm::{ChatMessage, LlmClient, LlmRequest, LlmUsage};
use docuchat_prompt::{build_prompt, PromptDefinition};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Model and prompt used for answering.
#[derive(Debug, Clone)]
pub struct AnswerSettings {
    pub model: String,
    pub temperature: f32,
    pub prompt: PromptDefinition,
}

impl AnswerSettings {
    /// Settings with the built-in answer prompt.
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
            prompt: PromptDefinition::answer(),
        }
    }

    /// Replace the prompt definition.
    pub fn with_prompt(mut self, prompt: PromptDefinition) -> Self {
        self.prompt = prompt;
        self
    }
}

/// A model answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub content: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<LlmUsage>,
}

/// Build the chat request for a question and its context.
pub fn build_answer_request(
    settings: &AnswerSettings,
    context: &str,
    question: &str,
) -> AppResult<LlmRequest> {
    let mut variables = HashMap::new();
    variables.insert("context".to_string(), context.to_string());
    variables.insert("question".to_string(), question.to_string());

    let built = build_prompt(&settings.prompt, &variables)?;

    let mut request = LlmRequest::new(&settings.model).with_temperature(settings.temperature);
    if let Some(system) = built.system {
        request = request.with_message(ChatMessage::system(system));
    }

    Ok(request.with_message(ChatMessage::user(built.user)))
}

/// Ask the model once and return the full answer.
pub async fn generate_answer(
    client: &dyn LlmClient,
    settings: &AnswerSettings,
    context: &str,
    question: &str,
) -> AppResult<Answer> {
    let request = build_answer_request(settings, context, question)?;
    let response = client.complete(&request).await?;

    Ok(Answer {
        content: response.content,
        model: response.model,
        usage: Some(response.usage),
    })
}

/// Ask the model with streaming, passing each text delta to `on_token`.
///
/// Returns the concatenated answer once the stream ends. An empty reply is
/// returned as an empty answer, the same as [`generate_answer`] does.
pub async fn stream_answer<F>(
    client: &dyn LlmClient,
    settings: &AnswerSettings,
    context: &str,
    question: &str,
    mut on_token: F,
) -> AppResult<Answer>
where
    F: FnMut(&str),
{
    let request = build_answer_request(settings, context, question)?.with_streaming();
    let mut stream = client.stream(&request).await?;

    let mut content = String::new();
    let mut model = request.model.clone();
    let mut usage = None;

    while let Some(result) = stream.next().await {
        let chunk = result?;

        if !chunk.content.is_empty() {
            on_token(&chunk.content);
            content.push_str(&chunk.content);
        }
        if !chunk.model.is_empty() {
            model = chunk.model;
        }
        if chunk.usage.is_some() {
            usage = chunk.usage;
        }
        if chunk.done {
            break;
        }
    }

    Ok(Answer {
        content,
        model,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docuchat_llm::{ChatRole, MockClient};

    fn settings() -> AnswerSettings {
        AnswerSettings::new("llama-3.1-8b-instant", 0.5)
    }

    #[test]
    fn test_build_answer_request() {
        let request = build_answer_request(&settings(), "Cats nap.", "Do cats nap?").unwrap();

        assert_eq!(request.model, "llama-3.1-8b-instant");
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(
            request.messages[0].content,
            "You are a helpful assistant. Answer strictly based on the context provided."
        );
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert_eq!(
            request.messages[1].content,
            "Context:\nCats nap.\n\nQuestion: Do cats nap?"
        );
    }

    #[test]
    fn test_prompt_without_system_message() {
        let mut prompt = PromptDefinition::answer();
        prompt.system = None;
        let request =
            build_answer_request(&settings().with_prompt(prompt), "c", "q").unwrap();
        assert_eq!(request.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_answer() {
        let client = MockClient::replying("They do.");
        let answer = generate_answer(&client, &settings(), "Cats nap.", "Do cats nap?")
            .await
            .unwrap();

        assert_eq!(answer.content, "They do.");
        assert_eq!(client.requests().len(), 1);
        assert!(!client.requests()[0].stream);
    }

    #[tokio::test]
    async fn test_generate_answer_api_error() {
        let client = MockClient::failing("rate limited");
        let err = generate_answer(&client, &settings(), "", "q").await.unwrap_err();

        assert!(err.is_api());
        assert_eq!(err.transcript_text(), "Error communicating with Mock: rate limited");
    }

    #[tokio::test]
    async fn test_stream_answer_collects_tokens() {
        let client = MockClient::replying("cats nap often");
        let mut seen = Vec::new();
        let answer = stream_answer(&client, &settings(), "ctx", "q", |token| {
            seen.push(token.to_string())
        })
        .await
        .unwrap();

        assert_eq!(answer.content, "cats nap often");
        assert_eq!(seen, vec!["cats ", "nap ", "often"]);
        assert!(client.requests()[0].stream);
    }

    #[tokio::test]
    async fn test_empty_reply_is_not_an_error() {
        let client = MockClient::replying("");

        let streamed = stream_answer(&client, &settings(), "ctx", "q", |_| {})
            .await
            .unwrap();
        let completed = generate_answer(&client, &settings(), "ctx", "q").await.unwrap();

        assert_eq!(streamed.content, "");
        assert_eq!(completed.content, "");
    }
}
