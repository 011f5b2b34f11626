//! Chat Adapters.
//!
//! - `EventPoller` - Background loop from an `EventSource` to the dispatcher
//! - `RecordingTransport` - In-memory transport for tests
//!
//! The Telegram binding lives in `adapters::telegram`.

mod poller;
mod recording_transport;

pub use poller::{EventPoller, EventPollerConfig};
pub use recording_transport::{RecordingTransport, SentMessage};
