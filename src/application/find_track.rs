//! Find-track flow handler.
//!
//! Drives the guided conversation: `start` opens it with a model-generated
//! question, `handle_turn` feeds each user answer back to the model until it
//! replies with recommendations.

use std::sync::Arc;
use tracing::{info, warn};

use super::errors::InteractionError;
use super::reply::Reply;
use crate::domain::find_track::{
    opening_message, parse_opening, recommendations_message, turn_prompt, FindTrackReply,
    FindTrackState, FindTrackStatus, FALLBACK_OPENER, FIND_TRACK_TEMPERATURE, OPENING_PROMPT,
};
use crate::domain::foundation::{ConversationId, StateMachine};
use crate::ports::{AiClient, AiRequest, ConversationStore};

/// Handler for the guided find-track conversation.
pub struct FindTrackHandler {
    client: Arc<dyn AiClient>,
    store: Arc<dyn ConversationStore<FindTrackState>>,
}

impl FindTrackHandler {
    pub fn new(
        client: Arc<dyn AiClient>,
        store: Arc<dyn ConversationStore<FindTrackState>>,
    ) -> Self {
        Self { client, store }
    }

    pub async fn status(&self, id: ConversationId) -> Result<FindTrackStatus, InteractionError> {
        if self.store.contains(id).await? {
            Ok(FindTrackStatus::InProgress)
        } else {
            Ok(FindTrackStatus::NotStarted)
        }
    }

    pub async fn is_in_progress(&self, id: ConversationId) -> Result<bool, InteractionError> {
        Ok(self.status(id).await? == FindTrackStatus::InProgress)
    }

    /// Opens (or restarts) the flow with a fresh history.
    ///
    /// A failed opening call still leaves the flow in progress; the user gets
    /// a fixed opener instead.
    pub async fn start(&self, id: ConversationId) -> Result<Reply, InteractionError> {
        self.status(id)
            .await?
            .transition_to(FindTrackStatus::InProgress)?;
        let mut state = FindTrackState::new();
        self.store.put(id, state.clone()).await?;
        info!(conversation_id = %id, "Find-track conversation started");

        let request = AiRequest::system(OPENING_PROMPT, FIND_TRACK_TEMPERATURE)?;
        match self.client.send(request).await {
            Ok(result) => {
                let question = parse_opening(&result.content);
                state.push_assistant(&question);
                self.store.put(id, state).await?;
                Ok(Reply::plain(opening_message(&question)))
            }
            Err(err) => {
                warn!(conversation_id = %id, error = %err, "Opening question failed, using fallback");
                Ok(Reply::plain(FALLBACK_OPENER))
            }
        }
    }

    /// Processes one user answer. Returns `None` when no flow is in progress.
    ///
    /// The user line is persisted before the model call and is kept when the
    /// call fails.
    pub async fn handle_turn(
        &self,
        id: ConversationId,
        text: &str,
    ) -> Result<Option<Reply>, InteractionError> {
        let Some(mut state) = self.store.get(id).await? else {
            return Ok(None);
        };

        state.push_user(text);
        self.store.put(id, state.clone()).await?;

        let request = AiRequest::system(turn_prompt(&state.transcript()), FIND_TRACK_TEMPERATURE)?;
        let response = self.client.send(request).await?.content;

        state.push_assistant(&response);

        let reply = match FindTrackReply::parse(&response) {
            FindTrackReply::Ready(recommendations) => {
                FindTrackStatus::InProgress.transition_to(FindTrackStatus::NotStarted)?;
                self.store.remove(id).await?;
                info!(
                    conversation_id = %id,
                    turns = state.history().len(),
                    "Find-track conversation completed"
                );
                Reply::markdown(recommendations_message(&recommendations))
            }
            FindTrackReply::Question(question) => {
                self.store.put(id, state).await?;
                Reply::plain(question)
            }
            FindTrackReply::Other(raw) => {
                self.store.put(id, state).await?;
                Reply::plain(raw)
            }
        };

        Ok(Some(reply))
    }

    /// Current transcript, if a flow is in progress.
    pub async fn history(&self, id: ConversationId) -> Result<Option<Vec<String>>, InteractionError> {
        Ok(self
            .store
            .get(id)
            .await?
            .map(|state| state.history().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAiClient, MockError};
    use crate::adapters::storage::InMemoryConversationStore;
    use crate::ports::{MessageRole, TextFormat};

    fn handler(client: &MockAiClient) -> FindTrackHandler {
        FindTrackHandler::new(
            Arc::new(client.clone()),
            Arc::new(InMemoryConversationStore::new()),
        )
    }

    fn id() -> ConversationId {
        ConversationId::new(77)
    }

    #[tokio::test]
    async fn start_strips_question_prefix_and_records_opening() {
        let client = MockAiClient::new().with_response("QUESTION: What decade do you love?");
        let handler = handler(&client);

        let reply = handler.start(id()).await.unwrap();

        assert_eq!(
            reply,
            Reply::plain("🎵 Let's find some music tracks!\n\nWhat decade do you love?")
        );
        assert_eq!(
            handler.history(id()).await.unwrap().unwrap(),
            vec!["Assistant: What decade do you love?"]
        );
        let call = &client.get_calls()[0];
        assert_eq!(call.temperature(), FIND_TRACK_TEMPERATURE);
        assert_eq!(call.messages()[0].role, MessageRole::System);
    }

    #[tokio::test]
    async fn start_failure_sends_fallback_and_stays_in_progress() {
        let client = MockAiClient::new().with_error(MockError::Unavailable {
            message: "down".to_string(),
        });
        let handler = handler(&client);

        let reply = handler.start(id()).await.unwrap();

        assert_eq!(reply.text, FALLBACK_OPENER);
        assert!(handler.is_in_progress(id()).await.unwrap());
        assert_eq!(handler.history(id()).await.unwrap().unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn restart_discards_previous_history() {
        let client = MockAiClient::new()
            .with_response("QUESTION: Era?")
            .with_response("QUESTION: Genre?")
            .with_response("QUESTION: Fresh start?");
        let handler = handler(&client);

        handler.start(id()).await.unwrap();
        handler.handle_turn(id(), "80s").await.unwrap();
        handler.start(id()).await.unwrap();

        assert_eq!(
            handler.history(id()).await.unwrap().unwrap(),
            vec!["Assistant: Fresh start?"]
        );
    }

    #[tokio::test]
    async fn question_reply_is_sent_and_state_kept() {
        let client = MockAiClient::new()
            .with_response("QUESTION: Which era?")
            .with_response("question: Which region?");
        let handler = handler(&client);
        handler.start(id()).await.unwrap();

        let reply = handler.handle_turn(id(), "jazz").await.unwrap().unwrap();

        assert_eq!(reply, Reply::plain("Which region?"));
        assert_eq!(
            handler.history(id()).await.unwrap().unwrap(),
            vec![
                "Assistant: Which era?",
                "User: jazz",
                "Assistant: question: Which region?",
            ]
        );
    }

    #[tokio::test]
    async fn turn_prompt_contains_full_history() {
        let client = MockAiClient::new()
            .with_response("QUESTION: Which era?")
            .with_response("QUESTION: Genre?");
        let handler = handler(&client);
        handler.start(id()).await.unwrap();

        handler.handle_turn(id(), "the 80s").await.unwrap();

        let prompt = client.get_calls()[1].last_content().to_string();
        assert!(prompt.ends_with("Conversation so far:\nAssistant: Which era?\nUser: the 80s"));
    }

    #[tokio::test]
    async fn ready_reply_sends_recommendations_and_ends_flow() {
        let client = MockAiClient::new()
            .with_response("QUESTION: Which era?")
            .with_response("READY: 1. A-ha - Take On Me");
        let handler = handler(&client);
        handler.start(id()).await.unwrap();

        let reply = handler.handle_turn(id(), "80s synth pop from Norway").await.unwrap().unwrap();

        assert_eq!(reply.format, TextFormat::Markdown);
        assert_eq!(
            reply.text,
            "🎵 *Music Recommendations:*\n\n1. A-ha - Take On Me"
        );
        assert_eq!(handler.status(id()).await.unwrap(), FindTrackStatus::NotStarted);
    }

    #[tokio::test]
    async fn unprefixed_reply_is_sent_raw() {
        let client = MockAiClient::new()
            .with_response("QUESTION: Which era?")
            .with_response("Nice! And the genre?");
        let handler = handler(&client);
        handler.start(id()).await.unwrap();

        let reply = handler.handle_turn(id(), "90s").await.unwrap().unwrap();

        assert_eq!(reply, Reply::plain("Nice! And the genre?"));
        assert!(handler.is_in_progress(id()).await.unwrap());
    }

    #[tokio::test]
    async fn failed_turn_keeps_user_line() {
        let client = MockAiClient::new()
            .with_response("QUESTION: Which era?")
            .with_error(MockError::Timeout { timeout_secs: 60 });
        let handler = handler(&client);
        handler.start(id()).await.unwrap();

        let err = handler.handle_turn(id(), "2000s").await.unwrap_err();

        assert!(matches!(err, InteractionError::Ai(_)));
        assert!(handler.is_in_progress(id()).await.unwrap());
        assert_eq!(
            handler.history(id()).await.unwrap().unwrap(),
            vec!["Assistant: Which era?", "User: 2000s"]
        );
    }

    #[tokio::test]
    async fn turn_without_flow_is_ignored() {
        let client = MockAiClient::new();
        let handler = handler(&client);

        assert_eq!(handler.handle_turn(id(), "hello").await.unwrap(), None);
        assert_eq!(client.call_count(), 0);
    }
}
