//! Telegram Bot API configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Telegram Bot API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Token issued by BotFather
    pub bot_token: Option<Secret<String>>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// `getUpdates` long-poll timeout
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl TelegramConfig {
    /// Validate Telegram configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self
            .bot_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
        {
            return Err(ValidationError::MissingRequired("TRACK_BOT__TELEGRAM__BOT_TOKEN"));
        }
        if !self.api_base_url.starts_with("http") {
            return Err(ValidationError::InvalidUrl("telegram.api_base_url"));
        }
        if self.poll_timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base_url: default_api_base_url(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_required() {
        assert_eq!(
            TelegramConfig::default().validate(),
            Err(ValidationError::MissingRequired("TRACK_BOT__TELEGRAM__BOT_TOKEN"))
        );
    }

    #[test]
    fn test_valid_config() {
        let config = TelegramConfig {
            bot_token: Some(Secret::new("123:abc".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_timeout_secs, 30);
    }
}
