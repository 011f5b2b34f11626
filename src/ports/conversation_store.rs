//! Conversation Store Port - Interface for per-conversation state.
//!
//! Every piece of per-conversation state (context transcripts, find-track
//! histories, metrics toggles) is keyed by [`ConversationId`] and kept behind
//! this port so that flows never own a global map directly.

use async_trait::async_trait;

use crate::domain::foundation::ConversationId;

/// Errors that can occur during conversation store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Conversation store unavailable: {0}")]
    Unavailable(String),
}

/// Port for keyed per-conversation state.
///
/// Values are cloned in and out; callers never hold a reference into the store
/// across an await point.
#[async_trait]
pub trait ConversationStore<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Load the value for a conversation, `None` when absent.
    async fn get(&self, id: ConversationId) -> Result<Option<T>, StoreError>;

    /// Insert or replace the value for a conversation.
    async fn put(&self, id: ConversationId, value: T) -> Result<(), StoreError>;

    /// Remove the value for a conversation, returning the previous one.
    async fn remove(&self, id: ConversationId) -> Result<Option<T>, StoreError>;

    /// Check whether a value exists for a conversation.
    async fn contains(&self, id: ConversationId) -> Result<bool, StoreError> {
        Ok(self.get(id).await?.is_some())
    }
}
