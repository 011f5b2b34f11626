//! Anthropic Client - Implementation of AiClient for Anthropic's Claude API.
//!
//! The primary provider. Every bot flow that is not explicitly multi-provider
//! talks to Claude through this binding.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new(api_key)
//!     .with_model("claude-sonnet-4-5-20250929")
//!     .with_base_url("https://api.anthropic.com");
//!
//! let client = AnthropicClient::new(config)?;
//! ```
//!
//! # System prompts
//!
//! Anthropic takes the system prompt as a top-level field, so every
//! `System` message of the request is folded into that field and only user
//! and assistant turns are sent as messages.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::http_support::{build_client, send_json, with_retries};
use crate::ports::{AIError, AiClient, AiRequest, AiResult, MessageRole, ProviderInfo, TokenUsage};

/// Default Claude model.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Stand-in user turn for requests made only of system messages.
const PLACEHOLDER_USER_TURN: &str = "Please respond according to the instructions above.";

/// Configuration for the Anthropic client.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API (default: https://api.anthropic.com).
    pub base_url: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl AnthropicConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 1000,
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the generated token ceiling.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Anthropic API client implementation.
pub struct AnthropicClient {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicClient {
    /// Creates a new Anthropic client with the given configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self, AIError> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    /// Builds the messages endpoint URL.
    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    /// Converts our request to Anthropic's format.
    fn to_anthropic_request(&self, request: &AiRequest) -> AnthropicRequest {
        let mut messages: Vec<AnthropicMessage> = request
            .conversation_messages()
            .map(|msg| AnthropicMessage {
                role: match msg.role {
                    MessageRole::Assistant => "assistant",
                    _ => "user",
                }
                .to_string(),
                content: msg.content.clone(),
            })
            .collect();

        // Anthropic rejects an empty message list
        if messages.is_empty() {
            messages.push(AnthropicMessage {
                role: "user".to_string(),
                content: PLACEHOLDER_USER_TURN.to_string(),
            });
        }

        AnthropicRequest {
            model: self.config.model.clone(),
            messages,
            system: request.combined_system_prompt(),
            max_tokens: self.config.max_tokens,
            temperature: request.temperature(),
        }
    }

    /// Sends one attempt and converts the response.
    async fn send_once(&self, body: &AnthropicRequest) -> Result<AiResult, AIError> {
        let request = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(body);

        let (response, duration_ms) =
            send_json::<AnthropicResponse>(request, self.config.timeout).await?;

        Self::into_result(response, duration_ms)
    }

    fn into_result(response: AnthropicResponse, duration_ms: u64) -> Result<AiResult, AIError> {
        let content = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if content.is_empty() {
            return Err(AIError::empty_response("anthropic"));
        }

        let usage = TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens);
        Ok(AiResult::new(content, duration_ms, usage))
    }
}

#[async_trait]
impl AiClient for AnthropicClient {
    async fn send(&self, request: AiRequest) -> Result<AiResult, AIError> {
        let body = self.to_anthropic_request(&request);

        let result = with_retries("anthropic", self.config.max_retries, || {
            self.send_once(&body)
        })
        .await?;

        debug!(
            provider = "anthropic",
            model = %self.config.model,
            duration_ms = result.duration_ms,
            total_tokens = result.total_tokens,
            "Claude completion received"
        );
        Ok(result)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("anthropic", &self.config.model)
    }
}

// ----- Anthropic API Types -----

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}
