//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TRACK_BOT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use track_bot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Long-polling with {}s timeout", config.telegram.poll_timeout_secs);
//! ```

mod ai;
mod bot;
mod error;
mod http;
mod logging;
mod telegram;

pub use ai::AiConfig;
pub use bot::BotConfig;
pub use error::{ConfigError, ValidationError};
pub use http::HttpConfig;
pub use logging::LoggingConfig;
pub use telegram::TelegramConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Telegram Bot API (token, polling)
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// LLM providers (Claude, YandexGPT, HuggingFace)
    #[serde(default)]
    pub ai: AiConfig,

    /// Bot behaviour (message limits)
    #[serde(default)]
    pub bot: BotConfig,

    /// Optional HTTP endpoint
    #[serde(default)]
    pub http: HttpConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TRACK_BOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TRACK_BOT__TELEGRAM__BOT_TOKEN=...` -> `telegram.bot_token = ...`
    /// - `TRACK_BOT__AI__ANTHROPIC_API_KEY=...` -> `ai.anthropic_api_key = ...`
    /// - `TRACK_BOT__HTTP__PORT=8080` -> `http.port = 8080`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    /// Missing credentials are reported by [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TRACK_BOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.telegram.validate()?;
        self.ai.validate()?;
        self.bot.validate()?;
        self.http.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "TRACK_BOT__TELEGRAM__BOT_TOKEN",
        "TRACK_BOT__AI__ANTHROPIC_API_KEY",
        "TRACK_BOT__AI__MAX_RETRIES",
        "TRACK_BOT__BOT__MAX_MESSAGE_LENGTH",
        "TRACK_BOT__HTTP__ENABLED",
        "TRACK_BOT__HTTP__PORT",
    ];

    fn set_minimal_env() {
        env::set_var("TRACK_BOT__TELEGRAM__BOT_TOKEN", "123:abc");
        env::set_var("TRACK_BOT__AI__ANTHROPIC_API_KEY", "sk-ant-xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.telegram.bot_token.unwrap().expose_secret(),
            "123:abc"
        );
        assert!(config.ai.has_anthropic());
        assert!(!config.ai.has_yandex());
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.bot.max_message_length, 200_000);
        assert!(!config.http.enabled);
        assert_eq!(config.http.max_question_length, 1000);
        assert_eq!(config.telegram.poll_timeout_secs, 30);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("TRACK_BOT__AI__MAX_RETRIES", "5");
        env::set_var("TRACK_BOT__BOT__MAX_MESSAGE_LENGTH", "4096");
        env::set_var("TRACK_BOT__HTTP__ENABLED", "true");
        env::set_var("TRACK_BOT__HTTP__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.max_retries, 5);
        assert_eq!(config.bot.max_message_length, 4096);
        assert!(config.http.enabled);
        assert_eq!(config.http.port, 3000);
    }

    #[test]
    fn test_missing_token_fails_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }
}
