//! Plain question flow.
//!
//! Handles free text outside of a guided conversation: optional context
//! compression, one call to the primary provider with the context block as a
//! system message, transcript bookkeeping and metrics rendering.

use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::context_manager::ContextManager;
use super::errors::InteractionError;
use super::formatting::answer_with_metrics;
use super::metrics_settings::MetricsSettings;
use super::reply::Reply;
use crate::domain::foundation::ConversationId;
use crate::domain::metrics::MetricsCollector;
use crate::ports::{AiClient, AiRequest, ConversationMessage};

/// Temperature for plain questions.
pub const ASK_TEMPERATURE: f32 = 1.0;

/// Command to answer one free-text question.
#[derive(Debug, Clone)]
pub struct AskCommand {
    pub conversation_id: ConversationId,
    pub question: String,
}

impl AskCommand {
    pub fn new(conversation_id: ConversationId, question: impl Into<String>) -> Self {
        Self {
            conversation_id,
            question: question.into(),
        }
    }
}

/// Handler for [`AskCommand`].
pub struct AskHandler {
    client: Arc<dyn AiClient>,
    context: ContextManager,
    metrics: Arc<MetricsCollector>,
    settings: MetricsSettings,
}

impl AskHandler {
    pub fn new(
        client: Arc<dyn AiClient>,
        context: ContextManager,
        metrics: Arc<MetricsCollector>,
        settings: MetricsSettings,
    ) -> Self {
        Self {
            client,
            context,
            metrics,
            settings,
        }
    }

    pub async fn handle(&self, cmd: AskCommand) -> Result<Reply, InteractionError> {
        let id = cmd.conversation_id;

        if self.context.should_compress(id).await? {
            info!(conversation_id = %id, "Starting context compression");
            let started = Instant::now();
            self.context.compress_with(id, self.client.as_ref()).await?;
            info!(
                conversation_id = %id,
                duration_ms = started.elapsed().as_millis() as u64,
                "Context compression completed"
            );
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(context) = self.context.render_prompt(id).await? {
            messages.push(ConversationMessage::system(context));
        }
        messages.push(ConversationMessage::user(cmd.question.as_str()));
        let request = AiRequest::new(messages, ASK_TEMPERATURE)?;

        let result = self.client.send(request).await?;

        self.context.add_message(id, "user", &cmd.question).await?;
        self.context
            .add_message(id, "assistant", &result.content)
            .await?;

        // Baseline must exclude this call, so compare before recording
        let comparison = self.metrics.compare(&result);
        self.metrics.record(result.clone());

        if self.settings.is_enabled(id).await? {
            Ok(Reply::markdown(answer_with_metrics(
                &result,
                comparison.as_ref(),
            )))
        } else {
            Ok(Reply::markdown(result.content))
        }
    }
}
