//! EventPoller - Background loop feeding inbound messages to the dispatcher.
//!
//! Pulls batches from an [`EventSource`] and spawns one dispatcher task per
//! event. A failed poll is logged and retried after `error_backoff`.
//!
//! ## Graceful Shutdown
//!
//! The loop stops when the shutdown channel flips to `true`. Tasks already
//! spawned keep running to completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::application::Dispatcher;
use crate::ports::{EventSource, TransportError};

/// Configuration for the EventPoller.
#[derive(Debug, Clone)]
pub struct EventPollerConfig {
    /// Pause after a failed poll.
    pub error_backoff: Duration,
}

impl Default for EventPollerConfig {
    fn default() -> Self {
        Self {
            error_backoff: Duration::from_secs(5),
        }
    }
}

impl EventPollerConfig {
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }
}

/// Long-polling loop.
pub struct EventPoller {
    source: Arc<dyn EventSource>,
    dispatcher: Dispatcher,
    config: EventPollerConfig,
}

impl EventPoller {
    pub fn new(source: Arc<dyn EventSource>, dispatcher: Dispatcher) -> Self {
        Self::with_config(source, dispatcher, EventPollerConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn EventSource>,
        dispatcher: Dispatcher,
        config: EventPollerConfig,
    ) -> Self {
        Self {
            source,
            dispatcher,
            config,
        }
    }

    /// Runs until `shutdown` becomes `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Event poller started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                result = self.poll_once() => {
                    if let Err(err) = result {
                        warn!(error = %err, backoff_secs = self.config.error_backoff.as_secs(), "Polling failed");
                        tokio::time::sleep(self.config.error_backoff).await;
                    }
                }
            }
        }

        info!("Event poller stopped");
    }

    /// Fetches one batch and spawns a task per event. Returns the batch size.
    pub async fn poll_once(&self) -> Result<usize, TransportError> {
        let events = self.source.next_events().await?;
        let count = events.len();
        if count > 0 {
            debug!(count, "Dispatching inbound events");
        }
        for event in events {
            self.dispatcher.spawn(event);
        }
        Ok(count)
    }
}
