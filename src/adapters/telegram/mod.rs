//! Telegram Bot API adapter.
//!
//! - `TelegramTransport` - `ChatTransport` and `EventSource` over the Bot API
//! - `types` - Wire types for the methods in use

mod transport;
pub mod types;

pub use transport::{updates_to_events, TelegramConfig, TelegramTransport};
