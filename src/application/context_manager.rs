//! Context manager - per-conversation context collection.
//!
//! Wraps the `ConversationStore` holding [`ContextState`] values. A
//! conversation has context collection enabled exactly when a state is stored
//! for it.

use std::sync::Arc;
use tracing::{debug, info};

use super::errors::InteractionError;
use crate::domain::context::ContextState;
use crate::domain::foundation::ConversationId;
use crate::ports::{AiClient, AiRequest, ConversationStore, StoreError};

/// Temperature used when asking the model for a summary.
pub const COMPRESSION_TEMPERATURE: f32 = 0.3;

/// Builds the summarisation prompt for a rendered context block.
pub fn compression_prompt(context: &str) -> String {
    format!(
        "Summarize the following conversation context concisely in 2-3 paragraphs.\n\
         Focus on key topics, important information, and the flow of the conversation:\n\n{}",
        context
    )
}

/// Keyed access to conversation context.
#[derive(Clone)]
pub struct ContextManager {
    store: Arc<dyn ConversationStore<ContextState>>,
}

impl ContextManager {
    pub fn new(store: Arc<dyn ConversationStore<ContextState>>) -> Self {
        Self { store }
    }

    /// Starts collecting with a fresh state, discarding any previous one.
    pub async fn enable(&self, id: ConversationId) -> Result<(), StoreError> {
        self.store.put(id, ContextState::enabled()).await?;
        info!(conversation_id = %id, "Context collection enabled");
        Ok(())
    }

    /// Stops collecting and forgets everything collected so far.
    pub async fn disable(&self, id: ConversationId) -> Result<(), StoreError> {
        self.store.remove(id).await?;
        info!(conversation_id = %id, "Context collection disabled and cleared");
        Ok(())
    }

    pub async fn is_enabled(&self, id: ConversationId) -> Result<bool, StoreError> {
        Ok(self
            .store
            .get(id)
            .await?
            .is_some_and(|state| state.is_enabled()))
    }

    /// Records one message. No-op when collection is off.
    pub async fn add_message(
        &self,
        id: ConversationId,
        role: &str,
        content: &str,
    ) -> Result<(), StoreError> {
        let Some(mut state) = self.store.get(id).await? else {
            return Ok(());
        };
        if !state.is_enabled() {
            return Ok(());
        }
        state.add_message(role, content);
        self.store.put(id, state).await
    }

    pub async fn should_compress(&self, id: ConversationId) -> Result<bool, StoreError> {
        Ok(self
            .store
            .get(id)
            .await?
            .is_some_and(|state| state.should_compress()))
    }

    /// Context block for the system prompt, if there is anything to show.
    pub async fn render_prompt(&self, id: ConversationId) -> Result<Option<String>, StoreError> {
        Ok(self.store.get(id).await?.and_then(|state| state.render()))
    }

    /// Replaces the transcript with `new_summary`. No-op when absent.
    pub async fn compress(
        &self,
        id: ConversationId,
        new_summary: &str,
    ) -> Result<(), StoreError> {
        let Some(mut state) = self.store.get(id).await? else {
            return Ok(());
        };

        let messages_compressed = state.recent_messages().len();
        state.compress(new_summary);
        self.store.put(id, state).await?;

        info!(
            conversation_id = %id,
            messages_compressed,
            summary_length = new_summary.chars().count(),
            "Context compressed"
        );
        debug!(
            conversation_id = %id,
            summary = %new_summary.chars().take(100).collect::<String>(),
            "Compressed summary"
        );
        Ok(())
    }

    /// Asks `client` for a summary of the current context and compresses.
    pub async fn compress_with(
        &self,
        id: ConversationId,
        client: &dyn AiClient,
    ) -> Result<(), InteractionError> {
        let context = self.render_prompt(id).await?.unwrap_or_default();
        let request = AiRequest::user(compression_prompt(&context), COMPRESSION_TEMPERATURE)?;

        let summary = client.send(request).await?;
        self.compress(id, &summary.content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiClient;
    use crate::adapters::storage::InMemoryConversationStore;

    fn manager() -> ContextManager {
        ContextManager::new(Arc::new(InMemoryConversationStore::new()))
    }

    fn id() -> ConversationId {
        ConversationId::new(100)
    }

    #[tokio::test]
    async fn add_message_is_ignored_until_enabled() {
        let manager = manager();

        manager.add_message(id(), "user", "hello").await.unwrap();

        assert!(!manager.is_enabled(id()).await.unwrap());
        assert_eq!(manager.render_prompt(id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn enable_then_add_renders_transcript() {
        let manager = manager();
        manager.enable(id()).await.unwrap();

        manager.add_message(id(), "user", "hi").await.unwrap();
        manager.add_message(id(), "assistant", "hello").await.unwrap();

        let rendered = manager.render_prompt(id()).await.unwrap().unwrap();
        assert!(rendered.contains("user: hi\nassistant: hello"));
    }

    #[tokio::test]
    async fn enable_discards_previous_state() {
        let manager = manager();
        manager.enable(id()).await.unwrap();
        manager.add_message(id(), "user", "old").await.unwrap();

        manager.enable(id()).await.unwrap();

        assert_eq!(manager.render_prompt(id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn disable_removes_state() {
        let manager = manager();
        manager.enable(id()).await.unwrap();
        manager.add_message(id(), "user", "x").await.unwrap();

        manager.disable(id()).await.unwrap();

        assert!(!manager.is_enabled(id()).await.unwrap());
        assert!(!manager.should_compress(id()).await.unwrap());
    }

    #[tokio::test]
    async fn should_compress_after_ten_messages() {
        let manager = manager();
        manager.enable(id()).await.unwrap();

        for i in 0..10 {
            assert!(!manager.should_compress(id()).await.unwrap());
            manager.add_message(id(), "user", &i.to_string()).await.unwrap();
        }

        assert!(manager.should_compress(id()).await.unwrap());
    }

    #[tokio::test]
    async fn compress_on_absent_state_is_noop() {
        let manager = manager();
        manager.compress(id(), "summary").await.unwrap();
        assert!(!manager.is_enabled(id()).await.unwrap());
    }

    #[tokio::test]
    async fn compress_with_asks_client_and_stores_summary() {
        let manager = manager();
        let client = MockAiClient::new().with_response("They talked about jazz.");
        manager.enable(id()).await.unwrap();
        manager.add_message(id(), "user", "I like jazz").await.unwrap();

        manager.compress_with(id(), &client).await.unwrap();

        let calls = client.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature(), COMPRESSION_TEMPERATURE);
        assert!(calls[0]
            .last_content()
            .starts_with("Summarize the following conversation context"));
        assert!(calls[0].last_content().contains("user: I like jazz"));

        let rendered = manager.render_prompt(id()).await.unwrap().unwrap();
        assert_eq!(
            rendered,
            "=== CONVERSATION CONTEXT ===\n=== Previous Context Summary ===\nThey talked about jazz.\n\n=== END CONTEXT ==="
        );
        assert!(!manager.should_compress(id()).await.unwrap());
    }

    #[tokio::test]
    async fn contexts_are_isolated_per_conversation() {
        let manager = manager();
        let other = ConversationId::new(200);
        manager.enable(id()).await.unwrap();

        manager.add_message(other, "user", "ignored").await.unwrap();
        manager.add_message(id(), "user", "kept").await.unwrap();

        assert!(!manager.is_enabled(other).await.unwrap());
        assert!(manager
            .render_prompt(id())
            .await
            .unwrap()
            .unwrap()
            .contains("user: kept"));
    }
}
