//! Error types for the domain layer.

use thiserror::Error;

/// Bad input rejected before any provider call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Message of {length} characters exceeds the maximum length of {max} characters")]
    MessageTooLong { length: usize, max: usize },

    #[error("Temperature must be between 0.0 and 1.0, got {0}")]
    TemperatureOutOfRange(f32),

    #[error("Request must contain at least one message")]
    EmptyRequest,

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),
}

impl ValidationError {
    /// Creates a message too long error.
    pub fn message_too_long(length: usize, max: usize) -> Self {
        ValidationError::MessageTooLong { length, max }
    }

    /// Checks a user supplied question against the configured ceiling.
    ///
    /// Length is measured in characters, not bytes.
    pub fn check_question(question: &str, max_length: usize) -> Result<(), ValidationError> {
        if question.trim().is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }
        // Unicode scalar values, so an emoji counts once
        let length = question.chars().count();
        if length > max_length {
            return Err(ValidationError::message_too_long(length, max_length));
        }
        Ok(())
    }
}
