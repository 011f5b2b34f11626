//! Telegram Bot API transport.
//!
//! Implements the `ChatTransport` port over `sendMessage` / `sendChatAction`
//! and exposes `getUpdates` long polling for the inbound side.
//!
//! # Configuration
//!
//! ```ignore
//! let config = TelegramConfig::new(bot_token).with_poll_timeout(30);
//! let transport = TelegramTransport::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{
    ApiResponse, GetUpdatesRequest, SendChatActionRequest, SendMessageRequest, Update,
};
use crate::domain::foundation::ConversationId;
use crate::ports::{ChatTransport, EventSource, InboundEvent, TextFormat, TransportError};

/// Slack added on top of the long-poll timeout for the HTTP client timeout.
const HTTP_TIMEOUT_SLACK_SECS: u64 = 10;

/// Telegram Bot API configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather.
    bot_token: Secret<String>,
    /// Base URL for the Bot API (default: https://api.telegram.org).
    pub api_base_url: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: Secret::new(bot_token.into()),
            api_base_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base_url,
            self.bot_token.expose_secret(),
            method
        )
    }
}

/// Telegram transport adapter.
pub struct TelegramTransport {
    config: TelegramConfig,
    http_client: Client,
    /// Next `getUpdates` offset (last seen update id + 1).
    offset: AtomicI64,
}

impl TelegramTransport {
    pub fn new(config: TelegramConfig) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(
                config.poll_timeout_secs + HTTP_TIMEOUT_SLACK_SECS,
            ))
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            offset: AtomicI64::new(0),
        })
    }

    /// Calls a Bot API method and unwraps the response envelope.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.config.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.without_url().to_string()))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.without_url().to_string()))?;

        unwrap_envelope(envelope)
    }

    /// Long-polls for new updates and advances the offset past them.
    pub async fn get_updates(&self) -> Result<Vec<Update>, TransportError> {
        let request = GetUpdatesRequest {
            offset: self.offset.load(Ordering::SeqCst),
            timeout: self.config.poll_timeout_secs,
            allowed_updates: vec!["message"],
        };

        let updates: Vec<Update> = self.call("getUpdates", &request).await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::SeqCst);
        }
        Ok(updates)
    }

    /// Long-polls and keeps only text messages.
    pub async fn poll_events(&self) -> Result<Vec<InboundEvent>, TransportError> {
        let updates = self.get_updates().await?;
        debug!(count = updates.len(), "Received Telegram updates");
        Ok(updates_to_events(updates))
    }

    async fn send_message(
        &self,
        id: ConversationId,
        text: &str,
        parse_mode: Option<&'static str>,
    ) -> Result<(), TransportError> {
        let request = SendMessageRequest {
            chat_id: id.as_i64(),
            text,
            parse_mode,
        };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }
}

fn unwrap_envelope<T>(envelope: ApiResponse<T>) -> Result<T, TransportError> {
    match (envelope.ok, envelope.result) {
        (true, Some(result)) => Ok(result),
        (true, None) => Err(TransportError::Parse(
            "response marked ok without a result".to_string(),
        )),
        (false, _) => Err(TransportError::Api {
            code: envelope.error_code.unwrap_or_default(),
            description: envelope.description.unwrap_or_default(),
        }),
    }
}

/// Maps raw updates to inbound events, dropping non-text updates.
pub fn updates_to_events(updates: Vec<Update>) -> Vec<InboundEvent> {
    updates
        .into_iter()
        .filter_map(|update| update.message)
        .filter_map(|message| {
            message
                .text
                .map(|text| InboundEvent::new(ConversationId::new(message.chat.id), text))
        })
        .collect()
}

fn is_markdown_rejection(err: &TransportError) -> bool {
    matches!(
        err,
        TransportError::Api { code: 400, description } if description.contains("can't parse entities")
    )
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(
        &self,
        id: ConversationId,
        text: &str,
        format: TextFormat,
    ) -> Result<(), TransportError> {
        match format {
            TextFormat::Plain => self.send_message(id, text, None).await,
            TextFormat::Markdown => match self.send_message(id, text, Some("Markdown")).await {
                // Model output often contains unbalanced markdown
                Err(err) if is_markdown_rejection(&err) => {
                    warn!(conversation_id = %id, "Markdown rejected, resending as plain text");
                    self.send_message(id, text, None).await
                }
                other => other,
            },
        }
    }

    async fn send_typing(&self, id: ConversationId) -> Result<(), TransportError> {
        let request = SendChatActionRequest {
            chat_id: id.as_i64(),
            action: "typing",
        };
        let _: bool = self.call("sendChatAction", &request).await?;
        Ok(())
    }
}

#[async_trait]
impl EventSource for TelegramTransport {
    async fn next_events(&self) -> Result<Vec<InboundEvent>, TransportError> {
        self.poll_events().await
    }
}
