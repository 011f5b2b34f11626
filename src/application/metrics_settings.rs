//! Per-conversation toggle for showing metrics under answers.

use std::sync::Arc;
use tracing::info;

use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StoreError};

/// Metrics display preference, enabled unless a conversation opts out.
#[derive(Clone)]
pub struct MetricsSettings {
    store: Arc<dyn ConversationStore<bool>>,
}

impl MetricsSettings {
    pub fn new(store: Arc<dyn ConversationStore<bool>>) -> Self {
        Self { store }
    }

    pub async fn enable(&self, id: ConversationId) -> Result<(), StoreError> {
        self.store.put(id, true).await?;
        info!(conversation_id = %id, "Metrics enabled");
        Ok(())
    }

    pub async fn disable(&self, id: ConversationId) -> Result<(), StoreError> {
        self.store.put(id, false).await?;
        info!(conversation_id = %id, "Metrics disabled");
        Ok(())
    }

    pub async fn is_enabled(&self, id: ConversationId) -> Result<bool, StoreError> {
        Ok(self.store.get(id).await?.unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryConversationStore;

    fn settings() -> MetricsSettings {
        MetricsSettings::new(Arc::new(InMemoryConversationStore::new()))
    }

    #[tokio::test]
    async fn metrics_default_to_enabled() {
        assert!(settings().is_enabled(ConversationId::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn disable_and_enable_toggle_flag() {
        let settings = settings();
        let id = ConversationId::new(1);

        settings.disable(id).await.unwrap();
        assert!(!settings.is_enabled(id).await.unwrap());

        settings.enable(id).await.unwrap();
        assert!(settings.is_enabled(id).await.unwrap());
    }
}
