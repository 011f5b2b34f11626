//! Application-level error type shared by the bot flows.

use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::ports::{AIError, StoreError, TransportError};

/// Anything that can go wrong while handling one inbound message.
#[derive(Debug, Error)]
pub enum InteractionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Ai(#[from] AIError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl InteractionError {
    /// True when the failure came from user input rather than a collaborator.
    pub fn is_validation(&self) -> bool {
        matches!(self, InteractionError::Validation(_))
    }
}
