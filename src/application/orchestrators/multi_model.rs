//! Multi-model orchestrator.
//!
//! Sends the same question to each configured model in turn. A failing model
//! is reported inline and does not stop the others.

use std::sync::Arc;
use tracing::{info, warn};

use super::{notify, report_failure, typing};
use crate::application::errors::InteractionError;
use crate::application::formatting::provider_metrics;
use crate::domain::foundation::ConversationId;
use crate::ports::{AiClient, AiRequest, ChatTransport};

const MODEL_TEMPERATURE: f32 = 0.7;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━";

/// One model taking part in the comparison.
#[derive(Clone)]
pub struct ModelSlot {
    /// Marker shown before the heading, e.g. `🔵`.
    pub badge: String,
    /// Heading text, e.g. `Model A: moonshotai/Kimi-K2-Thinking`.
    pub title: String,
    pub client: Arc<dyn AiClient>,
}

impl ModelSlot {
    pub fn new(badge: impl Into<String>, title: impl Into<String>, client: Arc<dyn AiClient>) -> Self {
        Self {
            badge: badge.into(),
            title: title.into(),
            client,
        }
    }

    fn heading(&self) -> String {
        format!("\n{} *{}*", self.badge, self.title)
    }
}

/// Orchestrates the multi-model comparison.
pub struct MultiModelOrchestrator {
    models: Vec<ModelSlot>,
    transport: Arc<dyn ChatTransport>,
}

impl MultiModelOrchestrator {
    pub fn new(models: Vec<ModelSlot>, transport: Arc<dyn ChatTransport>) -> Self {
        Self { models, transport }
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub async fn process(&self, id: ConversationId, question: &str) {
        if let Err(err) = self.run(id, question).await {
            report_failure(self.transport.as_ref(), id, &err).await;
        }
    }

    /// Queries every model. Only an invalid question aborts the run.
    pub async fn run(&self, id: ConversationId, question: &str) -> Result<(), InteractionError> {
        let transport = self.transport.as_ref();
        let count = self.models.len();
        typing(transport, id).await;
        info!(conversation_id = %id, models = count, "Starting multi-model comparison");

        notify(
            transport,
            id,
            &format!(
                "🤖 *Processing your question with {} different HuggingFace models*\n\n{}",
                count, RULE
            ),
        )
        .await;

        for slot in &self.models {
            notify(transport, id, &slot.heading()).await;
            typing(transport, id).await;

            let request = AiRequest::user(question, MODEL_TEMPERATURE)?;
            match slot.client.send(request).await {
                Ok(result) => {
                    notify(transport, id, &result.content).await;
                    notify(transport, id, &provider_metrics(&result)).await;
                }
                Err(err) => {
                    warn!(conversation_id = %id, model = %slot.title, error = %err, "Model call failed");
                    notify(transport, id, &format!("❌ Error: {}", err)).await;
                }
            }
        }

        notify(
            transport,
            id,
            &format!(
                "\n{}\n✨ *Processing Complete!*\n\nAll {} HuggingFace models have responded to your question.",
                RULE, count
            ),
        )
        .await;
        Ok(())
    }
}
