//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the bot flows and the outside world. Adapters implement these ports.
//!
//! ## AI Ports
//!
//! - `AiClient` - One LLM provider binding (Claude, YandexGPT, HuggingFace)
//!
//! ## State Ports
//!
//! - `ConversationStore` - Keyed per-conversation state
//!
//! ## Chat Ports
//!
//! - `ChatTransport` - Outbound messages and typing indicators
//! - `EventSource` - Inbound messages

mod ai_client;
mod chat_transport;
mod conversation_store;

pub use ai_client::{
    AIError, AiClient, AiRequest, AiResult, ConversationMessage, MessageRole, ProviderInfo,
    TokenUsage,
};
pub use chat_transport::{ChatTransport, EventSource, InboundEvent, TextFormat, TransportError};
pub use conversation_store::{ConversationStore, StoreError};
