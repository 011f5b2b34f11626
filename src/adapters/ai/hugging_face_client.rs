//! HuggingFace Client - Implementation of AiClient for the HuggingFace router.
//!
//! The router exposes an OpenAI-compatible chat completions endpoint, so one
//! binding serves every hosted model; the model name is part of the config.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HuggingFaceConfig::new(api_key, "Qwen/Qwen2.5-7B-Instruct");
//! let client = HuggingFaceClient::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::http_support::{build_client, send_json, with_retries};
use crate::ports::{AIError, AiClient, AiRequest, AiResult, ProviderInfo, TokenUsage};

/// Configuration for a HuggingFace-hosted model.
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    api_key: Secret<String>,
    /// Model to use (e.g., "meta-llama/Meta-Llama-3-8B-Instruct").
    pub model: String,
    /// Base URL for the API (default: https://router.huggingface.co/v1).
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl HuggingFaceConfig {
    /// Creates a new configuration for one model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: model.into(),
            base_url: "https://router.huggingface.co/v1".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// HuggingFace router client implementation.
pub struct HuggingFaceClient {
    config: HuggingFaceConfig,
    client: Client,
}

impl HuggingFaceClient {
    pub fn new(config: HuggingFaceConfig) -> Result<Self, AIError> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts our request to the OpenAI-compatible format.
    fn to_chat_request(&self, request: &AiRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages().len());

        if let Some(system) = request.combined_system_prompt() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }

        messages.extend(request.conversation_messages().map(|msg| ChatMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }));

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: request.temperature(),
        }
    }

    async fn send_once(&self, body: &ChatRequest) -> Result<AiResult, AIError> {
        let request = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .json(body);

        let (response, duration_ms) = send_json::<ChatResponse>(request, self.config.timeout).await?;

        Self::into_result(response, duration_ms)
    }

    fn into_result(response: ChatResponse, duration_ms: u64) -> Result<AiResult, AIError> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AIError::empty_response("huggingface"))?;

        let usage = response
            .usage
            .map(|u| {
                let prompt = u.prompt_tokens.unwrap_or(0);
                let completion = u.completion_tokens.unwrap_or(0);
                TokenUsage::with_total(
                    prompt,
                    completion,
                    u.total_tokens.unwrap_or(prompt + completion),
                )
            })
            .unwrap_or_default();

        Ok(AiResult::new(content, duration_ms, usage))
    }
}

#[async_trait]
impl AiClient for HuggingFaceClient {
    async fn send(&self, request: AiRequest) -> Result<AiResult, AIError> {
        let body = self.to_chat_request(&request);

        let result =
            with_retries("huggingface", self.config.max_retries, || self.send_once(&body)).await?;

        debug!(
            provider = "huggingface",
            model = %self.config.model,
            duration_ms = result.duration_ms,
            total_tokens = result.total_tokens,
            "HuggingFace completion received"
        );
        Ok(result)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("huggingface", &self.config.model)
    }
}

// ----- OpenAI-compatible API Types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}
