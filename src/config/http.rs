//! HTTP endpoint configuration

use serde::Deserialize;
use std::net::SocketAddr;

use super::error::ValidationError;

/// HTTP endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Serve `/` and `/ask` next to the bot
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Longest accepted `/ask` question, in characters
    #[serde(default = "default_max_question_length")]
    pub max_question_length: usize,
}

impl HttpConfig {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }

    /// Validate HTTP configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.max_question_length == 0 {
            return Err(ValidationError::InvalidMaxLength("http.max_question_length"));
        }
        self.socket_addr().map(|_| ())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_host(),
            port: default_port(),
            max_question_length: default_max_question_length(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_question_length() -> usize {
    1000
}
