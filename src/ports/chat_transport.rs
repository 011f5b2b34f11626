//! Chat Transport Port - Interface for delivering replies to users.
//!
//! The application layer only ever pushes text and typing indicators through
//! this port. Delivery failures are reported as [`TransportError`] and are
//! logged by callers rather than propagated to the user.

use async_trait::async_trait;

use crate::domain::foundation::ConversationId;

/// How the transport should render outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    /// Sent as-is.
    #[default]
    Plain,
    /// Rendered with the chat platform's markdown dialect.
    Markdown,
}

/// A message received from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Conversation the message belongs to.
    pub conversation_id: ConversationId,
    /// Raw message text.
    pub text: String,
}

impl InboundEvent {
    pub fn new(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation_id,
            text: text.into(),
        }
    }
}

/// Errors that can occur while talking to the chat platform.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("chat API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("failed to parse chat API response: {0}")]
    Parse(String),
}

/// Port for outbound chat traffic.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver a text message to a conversation.
    async fn send_text(
        &self,
        id: ConversationId,
        text: &str,
        format: TextFormat,
    ) -> Result<(), TransportError>;

    /// Show a typing indicator in a conversation.
    async fn send_typing(&self, id: ConversationId) -> Result<(), TransportError>;
}

/// Port for inbound chat traffic.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Waits for the next batch of messages. An empty batch is not an error.
    async fn next_events(&self) -> Result<Vec<InboundEvent>, TransportError>;
}
