//! Bot behaviour configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Bot behaviour configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Longest accepted question, in characters
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl BotConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_message_length == 0 {
            return Err(ValidationError::InvalidMaxLength("bot.max_message_length"));
        }
        Ok(())
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_message_length: default_max_message_length(),
        }
    }
}

fn default_max_message_length() -> usize {
    200_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_defaults() {
        assert_eq!(BotConfig::default().max_message_length, 200_000);
        assert!(BotConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_length_rejected() {
        let config = BotConfig {
            max_message_length: 0,
        };
        assert!(config.validate().is_err());
    }
}
