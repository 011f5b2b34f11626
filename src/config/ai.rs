//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
///
/// Claude is the primary provider and is required. YandexGPT and the
/// HuggingFace models are optional and switched off when their credentials
/// are missing.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Anthropic API key
    pub anthropic_api_key: Option<Secret<String>>,

    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,

    /// Override for the Anthropic API base URL
    pub anthropic_base_url: Option<String>,

    /// YandexGPT API key
    pub yandex_api_key: Option<Secret<String>>,

    /// Yandex Cloud folder the model runs in
    pub yandex_folder_id: Option<String>,

    #[serde(default = "default_yandex_model")]
    pub yandex_model: String,

    /// HuggingFace router API key
    pub hugging_face_api_key: Option<Secret<String>>,

    #[serde(default = "default_hugging_face_base_url")]
    pub hugging_face_base_url: String,

    #[serde(default = "default_model_a")]
    pub hugging_face_model_a: String,

    #[serde(default = "default_model_b")]
    pub hugging_face_model_b: String,

    #[serde(default = "default_model_c")]
    pub hugging_face_model_c: String,

    /// Completion token limit for Claude and YandexGPT
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_anthropic(&self) -> bool {
        is_set(&self.anthropic_api_key)
    }

    /// YandexGPT needs both the key and the folder id.
    pub fn has_yandex(&self) -> bool {
        is_set(&self.yandex_api_key) && self.yandex_folder_id.as_ref().is_some_and(|f| !f.is_empty())
    }

    pub fn has_hugging_face(&self) -> bool {
        is_set(&self.hugging_face_api_key)
    }

    /// The three HuggingFace model ids, in display order.
    pub fn hugging_face_models(&self) -> [&str; 3] {
        [
            &self.hugging_face_model_a,
            &self.hugging_face_model_b,
            &self.hugging_face_model_c,
        ]
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_anthropic() {
            return Err(ValidationError::MissingRequired("TRACK_BOT__AI__ANTHROPIC_API_KEY"));
        }
        if is_set(&self.yandex_api_key) && !self.has_yandex() {
            return Err(ValidationError::IncompleteProvider(
                "TRACK_BOT__AI__YANDEX_FOLDER_ID is required with the Yandex API key",
            ));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !self.hugging_face_base_url.starts_with("http") {
            return Err(ValidationError::InvalidUrl("hugging_face_base_url"));
        }
        Ok(())
    }
}

fn is_set(key: &Option<Secret<String>>) -> bool {
    key.as_ref().is_some_and(|k| !k.expose_secret().is_empty())
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            anthropic_model: default_anthropic_model(),
            anthropic_base_url: None,
            yandex_api_key: None,
            yandex_folder_id: None,
            yandex_model: default_yandex_model(),
            hugging_face_api_key: None,
            hugging_face_base_url: default_hugging_face_base_url(),
            hugging_face_model_a: default_model_a(),
            hugging_face_model_b: default_model_b(),
            hugging_face_model_c: default_model_c(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_anthropic_model() -> String {
    crate::adapters::ai::DEFAULT_ANTHROPIC_MODEL.to_string()
}

fn default_yandex_model() -> String {
    crate::adapters::ai::DEFAULT_YANDEX_MODEL.to_string()
}

fn default_hugging_face_base_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_model_a() -> String {
    "moonshotai/Kimi-K2-Thinking".to_string()
}

fn default_model_b() -> String {
    "meta-llama/Meta-Llama-3-8B-Instruct".to_string()
}

fn default_model_c() -> String {
    "Qwen/Qwen2.5-7B-Instruct".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}
