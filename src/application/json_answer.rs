//! Structured JSON answer (`/json`).
//!
//! Asks the primary provider for a fixed JSON object and renders it as
//! markdown. A reply that does not parse is shown raw.

use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::errors::InteractionError;
use super::reply::Reply;
use crate::domain::foundation::ConversationId;
use crate::ports::{AiClient, AiRequest, ConversationMessage};

/// Temperature for structured answers.
pub const JSON_TEMPERATURE: f32 = 1.0;

const JSON_SYSTEM_PROMPT: &str = r#"You are a specialized assistant that MUST respond in valid JSON format only.
IMPORTANT RULES:
1. Your entire response must be valid, parseable JSON
2. Start your response with { and end with }
3. Do not include markdown code fences (no ```json)
4. Do not include any text before or after the JSON object
5. Properly escape all special characters in strings (quotes, backslashes, newlines)
6. Use double quotes for all keys and string values

Follow this exact structure:
{
    "title": "string - a brief title for your response",
    "randomBadThoughtAboutWriter": "string - a random bad thought about the writer",
    "answer": "string - your detailed response content"
}

Before outputting, validate that:
- All brackets and braces are properly matched
- All strings are properly quoted and escaped
- No trailing commas exist
- The JSON can be parsed by standard JSON parsers
If you cannot provide a valid response, return:
{"error": "description of why response cannot be generated", "status": "failed"}"#;

/// The JSON object the model is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnswer {
    pub title: String,
    pub random_bad_thought_about_writer: String,
    pub answer: String,
}

impl StructuredAnswer {
    pub fn to_markdown(&self) -> String {
        format!(
            "*{}*\n\n_{}_\n\n{}",
            self.title, self.random_bad_thought_about_writer, self.answer
        )
    }
}

/// Handler for `/json` questions.
pub struct JsonAnswerHandler {
    client: Arc<dyn AiClient>,
}

impl JsonAnswerHandler {
    pub fn new(client: Arc<dyn AiClient>) -> Self {
        Self { client }
    }

    pub async fn handle(
        &self,
        id: ConversationId,
        question: &str,
    ) -> Result<Reply, InteractionError> {
        let request = AiRequest::new(
            vec![
                ConversationMessage::system(JSON_SYSTEM_PROMPT),
                ConversationMessage::user(question),
            ],
            JSON_TEMPERATURE,
        )?;

        let result = self.client.send(request).await?;

        match serde_json::from_str::<StructuredAnswer>(result.content.trim()) {
            Ok(answer) => Ok(Reply::markdown(answer.to_markdown())),
            Err(err) => {
                warn!(conversation_id = %id, error = %err, "Structured answer did not parse");
                Ok(Reply::plain(format!(
                    "Sorry, couldn't parse the response. Raw response: {}",
                    result.content
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiClient;
    use crate::ports::{MessageRole, TextFormat};

    fn id() -> ConversationId {
        ConversationId::new(3)
    }

    #[tokio::test]
    async fn valid_json_is_rendered_as_markdown() {
        let client = MockAiClient::new().with_response(
            r#"{"title": "Paris", "randomBadThoughtAboutWriter": "lazy question", "answer": "It is Paris.", "extra": 1}"#,
        );
        let handler = JsonAnswerHandler::new(Arc::new(client.clone()));

        let reply = handler.handle(id(), "Capital of France?").await.unwrap();

        assert_eq!(reply.format, TextFormat::Markdown);
        assert_eq!(reply.text, "*Paris*\n\n_lazy question_\n\nIt is Paris.");
    }

    #[tokio::test]
    async fn system_prompt_precedes_question() {
        let client = MockAiClient::new();
        let handler = JsonAnswerHandler::new(Arc::new(client.clone()));

        handler.handle(id(), "q").await.unwrap();

        let call = &client.get_calls()[0];
        assert_eq!(call.messages()[0].role, MessageRole::System);
        assert!(call.messages()[0].content.contains("randomBadThoughtAboutWriter"));
        assert_eq!(call.messages()[1].content, "q");
    }

    #[tokio::test]
    async fn invalid_json_returns_raw_response() {
        let client = MockAiClient::new().with_response("```json\n{oops}\n```");
        let handler = JsonAnswerHandler::new(Arc::new(client));

        let reply = handler.handle(id(), "q").await.unwrap();

        assert_eq!(reply.format, TextFormat::Plain);
        assert_eq!(
            reply.text,
            "Sorry, couldn't parse the response. Raw response: ```json\n{oops}\n```"
        );
    }

    #[tokio::test]
    async fn error_object_is_treated_as_unparseable() {
        let client = MockAiClient::new()
            .with_response(r#"{"error": "cannot answer", "status": "failed"}"#);
        let handler = JsonAnswerHandler::new(Arc::new(client));

        let reply = handler.handle(id(), "q").await.unwrap();

        assert!(reply.text.starts_with("Sorry, couldn't parse the response."));
    }
}
