//! In-Memory Conversation Store Adapter
//!
//! Keeps per-conversation values in a process-local map. Nothing survives a
//! restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StoreError};

/// In-memory storage for per-conversation values
#[derive(Debug, Clone)]
pub struct InMemoryConversationStore<T> {
    values: Arc<RwLock<HashMap<ConversationId, T>>>,
}

impl<T> InMemoryConversationStore<T> {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            values: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all stored values (useful for tests)
    pub async fn clear(&self) {
        self.values.write().await.clear();
    }

    /// Get the number of stored values
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    /// Check whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

impl<T> Default for InMemoryConversationStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> ConversationStore<T> for InMemoryConversationStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, id: ConversationId) -> Result<Option<T>, StoreError> {
        Ok(self.values.read().await.get(&id).cloned())
    }

    async fn put(&self, id: ConversationId, value: T) -> Result<(), StoreError> {
        self.values.write().await.insert(id, value);
        Ok(())
    }

    async fn remove(&self, id: ConversationId) -> Result<Option<T>, StoreError> {
        Ok(self.values.write().await.remove(&id))
    }

    async fn contains(&self, id: ConversationId) -> Result<bool, StoreError> {
        Ok(self.values.read().await.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: i64) -> ConversationId {
        ConversationId::new(value)
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let store: InMemoryConversationStore<String> = InMemoryConversationStore::new();
        assert_eq!(store.get(id(1)).await.unwrap(), None);
        assert!(!store.contains(id(1)).await.unwrap());
    }

    #[tokio::test]
    async fn put_then_get_returns_value() {
        let store = InMemoryConversationStore::new();
        store.put(id(1), "hello".to_string()).await.unwrap();

        assert_eq!(store.get(id(1)).await.unwrap(), Some("hello".to_string()));
        assert!(store.contains(id(1)).await.unwrap());
    }

    #[tokio::test]
    async fn put_replaces_existing_value() {
        let store = InMemoryConversationStore::new();
        store.put(id(1), 1u32).await.unwrap();
        store.put(id(1), 2u32).await.unwrap();

        assert_eq!(store.get(id(1)).await.unwrap(), Some(2));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn values_are_isolated_per_conversation() {
        let store = InMemoryConversationStore::new();
        store.put(id(1), true).await.unwrap();
        store.put(id(2), false).await.unwrap();

        assert_eq!(store.get(id(1)).await.unwrap(), Some(true));
        assert_eq!(store.get(id(2)).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn remove_returns_previous_value() {
        let store = InMemoryConversationStore::new();
        store.put(id(7), "x".to_string()).await.unwrap();

        assert_eq!(store.remove(id(7)).await.unwrap(), Some("x".to_string()));
        assert_eq!(store.remove(id(7)).await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = InMemoryConversationStore::new();
        store.put(id(1), 1u8).await.unwrap();
        store.put(id(2), 2u8).await.unwrap();

        store.clear().await;

        assert_eq!(store.len().await, 0);
    }
}
