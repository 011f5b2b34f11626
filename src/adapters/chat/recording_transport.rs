//! Recording chat transport for tests.
//!
//! Keeps every outbound message and typing indicator in memory so tests can
//! assert on exactly what a user would have seen.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::foundation::ConversationId;
use crate::ports::{ChatTransport, TextFormat, TransportError};

/// A message captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub conversation_id: ConversationId,
    pub text: String,
    pub format: TextFormat,
}

/// Transport that records instead of delivering.
///
/// Clones share the same recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    messages: Arc<Mutex<Vec<SentMessage>>>,
    typing: Arc<Mutex<Vec<ConversationId>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far.
    pub fn messages(&self) -> Vec<SentMessage> {
        lock(&self.messages).clone()
    }

    /// Texts sent to one conversation, in order.
    pub fn texts_for(&self, id: ConversationId) -> Vec<String> {
        lock(&self.messages)
            .iter()
            .filter(|m| m.conversation_id == id)
            .map(|m| m.text.clone())
            .collect()
    }

    /// Last message sent to one conversation.
    pub fn last_for(&self, id: ConversationId) -> Option<SentMessage> {
        lock(&self.messages)
            .iter()
            .rev()
            .find(|m| m.conversation_id == id)
            .cloned()
    }

    /// Number of typing indicators sent to one conversation.
    pub fn typing_count(&self, id: ConversationId) -> usize {
        lock(&self.typing).iter().filter(|t| **t == id).count()
    }

    pub fn clear(&self) {
        lock(&self.messages).clear();
        lock(&self.typing).clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(
        &self,
        id: ConversationId,
        text: &str,
        format: TextFormat,
    ) -> Result<(), TransportError> {
        lock(&self.messages).push(SentMessage {
            conversation_id: id,
            text: text.to_string(),
            format,
        });
        Ok(())
    }

    async fn send_typing(&self, id: ConversationId) -> Result<(), TransportError> {
        lock(&self.typing).push(id);
        Ok(())
    }
}
