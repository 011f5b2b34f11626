//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the bot flows to external systems:
//! - `ai` - LLM provider clients (Anthropic, YandexGPT, HuggingFace, mock)
//! - `chat` - Event polling loop and the recording transport
//! - `http` - Plain-text question endpoint
//! - `storage` - Conversation store implementations
//! - `telegram` - Telegram Bot API transport

pub mod ai;
pub mod chat;
pub mod http;
pub mod storage;
pub mod telegram;
