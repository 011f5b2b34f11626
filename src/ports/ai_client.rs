//! AI Client Port - Interface for LLM provider integrations.
//!
//! This port abstracts all interactions with LLM providers (Claude, YandexGPT,
//! HuggingFace router models), enabling the bot flows to request completions
//! without coupling to a specific provider.
//!
//! # Design
//!
//! - One request shape for every provider: ordered messages plus temperature
//! - Every successful call returns content together with latency and token usage
//! - Error types separate "provider answered with nothing usable" from
//!   transport failures
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoClient;
//!
//! #[async_trait]
//! impl AiClient for EchoClient {
//!     async fn send(&self, request: AiRequest) -> Result<AiResult, AIError> {
//!         Ok(AiResult::new(request.last_content().to_string(), 0, TokenUsage::default()))
//!     }
//!
//!     fn provider_info(&self) -> ProviderInfo {
//!         ProviderInfo::new("echo", "echo-1")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Port for LLM provider interactions.
///
/// Implementations connect to external AI services and translate between
/// the provider-specific API and our request/result types.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Sends the request and waits for the full completion.
    ///
    /// Bindings whose provider distinguishes system prompts must combine all
    /// `System` messages into one system instruction; the order of the other
    /// messages is preserved.
    async fn send(&self, request: AiRequest) -> Result<AiResult, AIError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions (guides model behavior).
    System,
    /// User input.
    User,
    /// Assistant (model) response.
    Assistant,
}

impl MessageRole {
    /// Lowercase wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Who sent this message.
    pub role: MessageRole,
    /// Message content.
    pub content: String,
}

impl ConversationMessage {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Request for an AI completion.
///
/// Always holds at least one message and a temperature within `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AiRequest {
    messages: Vec<ConversationMessage>,
    temperature: f32,
}

impl AiRequest {
    /// Lowest accepted temperature.
    pub const MIN_TEMPERATURE: f32 = 0.0;
    /// Highest accepted temperature.
    pub const MAX_TEMPERATURE: f32 = 1.0;

    /// Creates a validated request.
    ///
    /// # Errors
    ///
    /// - `EmptyRequest` if `messages` is empty
    /// - `TemperatureOutOfRange` if the temperature is outside `[0.0, 1.0]` or NaN
    pub fn new(
        messages: Vec<ConversationMessage>,
        temperature: f32,
    ) -> Result<Self, ValidationError> {
        if messages.is_empty() {
            return Err(ValidationError::EmptyRequest);
        }
        if !(Self::MIN_TEMPERATURE..=Self::MAX_TEMPERATURE).contains(&temperature) {
            return Err(ValidationError::TemperatureOutOfRange(temperature));
        }
        Ok(Self {
            messages,
            temperature,
        })
    }

    /// Creates a one-message request.
    pub fn single(
        role: MessageRole,
        content: impl Into<String>,
        temperature: f32,
    ) -> Result<Self, ValidationError> {
        Self::new(vec![ConversationMessage::new(role, content)], temperature)
    }

    /// Creates a one-message user request.
    pub fn user(content: impl Into<String>, temperature: f32) -> Result<Self, ValidationError> {
        Self::single(MessageRole::User, content, temperature)
    }

    /// Creates a one-message system request.
    pub fn system(content: impl Into<String>, temperature: f32) -> Result<Self, ValidationError> {
        Self::single(MessageRole::System, content, temperature)
    }

    /// Messages in send order.
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Sampling temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Content of the last message.
    pub fn last_content(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    /// All system message contents joined by blank lines, if any.
    pub fn combined_system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    /// Non-system messages in their original order.
    pub fn conversation_messages(&self) -> impl Iterator<Item = &ConversationMessage> {
        self.messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
    }
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens in the completion.
    pub completion_tokens: u64,
    /// Total tokens as reported by the provider.
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Creates usage with total = prompt + completion.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Creates usage with an explicit total (providers may report their own).
    pub fn with_total(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

/// Result of one provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResult {
    /// Generated text.
    pub content: String,
    /// Wall-clock time of the network round trip.
    pub duration_ms: u64,
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens in the completion.
    pub completion_tokens: u64,
    /// Total tokens.
    pub total_tokens: u64,
}

impl AiResult {
    /// Creates a result from content, latency and usage.
    pub fn new(content: impl Into<String>, duration_ms: u64, usage: TokenUsage) -> Self {
        Self {
            content: content.into(),
            duration_ms,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }

    /// Token usage of this call.
    pub fn usage(&self) -> TokenUsage {
        TokenUsage::with_total(self.prompt_tokens, self.completion_tokens, self.total_tokens)
    }
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "anthropic", "yandex").
    pub name: String,
    /// Model identifier.
    pub model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for ProviderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.model)
    }
}

/// AI client errors.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    /// Provider answered but the reply holds no usable text.
    #[error("no text content in response from {provider}")]
    EmptyResponse {
        /// Provider that returned the empty reply.
        provider: String,
    },

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl AIError {
    /// Creates an empty response error.
    pub fn empty_response(provider: impl Into<String>) -> Self {
        Self::EmptyResponse {
            provider: provider.into(),
        }
    }

    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }

    /// Returns true if the failure happened in transport rather than in the provider reply.
    pub fn is_transport(&self) -> bool {
        matches!(self, AIError::Network(_) | AIError::Timeout { .. })
    }
}
