//! Multi-step orchestrators.
//!
//! Each orchestrator runs several provider calls for one question and reports
//! every step to the user as it completes.
//!
//! - `ExpertsOrchestrator` - three prompting strategies, validated and compared
//! - `TemperatureSweepOrchestrator` - the same prompt at three temperatures
//! - `MultiModelOrchestrator` - the same question on several hosted models

mod experts;
mod multi_model;
mod temperature_sweep;

pub use experts::ExpertsOrchestrator;
pub use multi_model::{ModelSlot, MultiModelOrchestrator};
pub use temperature_sweep::{TemperatureSweepOrchestrator, SWEEP_TEMPERATURES};

use tracing::warn;

use crate::domain::foundation::ConversationId;
use crate::ports::{AiClient, AiRequest, ChatTransport, TextFormat};

use super::errors::InteractionError;

/// Prefix for the message reporting an aborted orchestration.
pub const FAILURE_PREFIX: &str = "❌ Sorry, an error occurred while processing your question: ";

/// Sends one progress message as markdown. Delivery failures are logged only.
pub(crate) async fn notify(transport: &dyn ChatTransport, id: ConversationId, text: &str) {
    if let Err(err) = transport.send_text(id, text, TextFormat::Markdown).await {
        warn!(conversation_id = %id, error = %err, "Failed to deliver progress message");
    }
}

/// Shows the typing indicator. Delivery failures are logged only.
pub(crate) async fn typing(transport: &dyn ChatTransport, id: ConversationId) {
    if let Err(err) = transport.send_typing(id).await {
        warn!(conversation_id = %id, error = %err, "Failed to send typing indicator");
    }
}

/// One single-message call returning the answer text.
pub(crate) async fn ask(
    client: &dyn AiClient,
    prompt: impl Into<String>,
    temperature: f32,
) -> Result<String, InteractionError> {
    let request = AiRequest::user(prompt, temperature)?;
    Ok(client.send(request).await?.content)
}

/// Reports an aborted orchestration to the user.
pub(crate) async fn report_failure(
    transport: &dyn ChatTransport,
    id: ConversationId,
    err: &InteractionError,
) {
    warn!(conversation_id = %id, error = %err, "Orchestration aborted");
    notify(transport, id, &format!("{}{}", FAILURE_PREFIX, err)).await;
}
