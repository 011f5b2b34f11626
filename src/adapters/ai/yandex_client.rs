//! YandexGPT Client - Implementation of AiClient for Yandex Foundation Models.
//!
//! Secondary provider used by the experts orchestrator. Authenticates with an
//! API key plus a folder id, and addresses models as `gpt://<folder>/<model>`.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::http_support::{build_client, send_json, with_retries};
use crate::ports::{AIError, AiClient, AiRequest, AiResult, ProviderInfo, TokenUsage};

/// Default YandexGPT model.
pub const DEFAULT_YANDEX_MODEL: &str = "yandexgpt/latest";

/// Configuration for the YandexGPT client.
#[derive(Debug, Clone)]
pub struct YandexConfig {
    api_key: Secret<String>,
    /// Cloud folder the model is billed to.
    pub folder_id: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl YandexConfig {
    /// Creates a new configuration with the given credentials.
    pub fn new(api_key: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            folder_id: folder_id.into(),
            model: DEFAULT_YANDEX_MODEL.to_string(),
            base_url: "https://llm.api.cloud.yandex.net".to_string(),
            max_tokens: 1000,
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
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

    /// Model URI in Yandex's addressing scheme.
    pub fn model_uri(&self) -> String {
        format!("gpt://{}/{}", self.folder_id, self.model)
    }
}

/// YandexGPT API client implementation.
pub struct YandexClient {
    config: YandexConfig,
    client: Client,
}

impl YandexClient {
    pub fn new(config: YandexConfig) -> Result<Self, AIError> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }

    fn completion_url(&self) -> String {
        format!("{}/foundationModels/v1/completion", self.config.base_url)
    }

    /// Converts our request to Yandex's format.
    ///
    /// System messages are merged into one leading `system` message.
    fn to_yandex_request(&self, request: &AiRequest) -> YandexRequest {
        let mut messages = Vec::with_capacity(request.messages().len());

        if let Some(system) = request.combined_system_prompt() {
            messages.push(YandexMessage {
                role: "system".to_string(),
                text: system,
            });
        }

        messages.extend(request.conversation_messages().map(|msg| YandexMessage {
            role: msg.role.as_str().to_string(),
            text: msg.content.clone(),
        }));

        YandexRequest {
            model_uri: self.config.model_uri(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: request.temperature(),
                max_tokens: self.config.max_tokens.to_string(),
            },
            messages,
        }
    }

    async fn send_once(&self, body: &YandexRequest) -> Result<AiResult, AIError> {
        let request = self
            .client
            .post(self.completion_url())
            .header("Authorization", format!("Api-Key {}", self.config.api_key()))
            .header("x-folder-id", &self.config.folder_id)
            .json(body);

        let (response, duration_ms) =
            send_json::<YandexResponse>(request, self.config.timeout).await?;

        Self::into_result(response, duration_ms)
    }

    fn into_result(response: YandexResponse, duration_ms: u64) -> Result<AiResult, AIError> {
        let content = response
            .result
            .alternatives
            .into_iter()
            .next()
            .map(|alt| alt.message.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AIError::empty_response("yandex"))?;

        let usage = match response.result.usage {
            Some(usage) => TokenUsage::with_total(
                parse_count(&usage.input_text_tokens)?,
                parse_count(&usage.completion_tokens)?,
                parse_count(&usage.total_tokens)?,
            ),
            None => TokenUsage::default(),
        };

        Ok(AiResult::new(content, duration_ms, usage))
    }
}

/// Yandex reports token counts as decimal strings.
fn parse_count(value: &str) -> Result<u64, AIError> {
    value
        .parse::<u64>()
        .map_err(|e| AIError::parse(format!("Invalid token count '{}': {}", value, e)))
}

#[async_trait]
impl AiClient for YandexClient {
    async fn send(&self, request: AiRequest) -> Result<AiResult, AIError> {
        let body = self.to_yandex_request(&request);

        let result = with_retries("yandex", self.config.max_retries, || self.send_once(&body)).await?;

        debug!(
            provider = "yandex",
            model = %self.config.model,
            duration_ms = result.duration_ms,
            total_tokens = result.total_tokens,
            "YandexGPT completion received"
        );
        Ok(result)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("yandex", &self.config.model)
    }
}

// ----- YandexGPT API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YandexRequest {
    model_uri: String,
    completion_options: CompletionOptions,
    messages: Vec<YandexMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f32,
    max_tokens: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct YandexMessage {
    role: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct YandexResponse {
    result: YandexResult,
}

#[derive(Debug, Deserialize)]
struct YandexResult {
    alternatives: Vec<Alternative>,
    usage: Option<YandexUsage>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    message: YandexMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YandexUsage {
    input_text_tokens: String,
    completion_tokens: String,
    total_tokens: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ConversationMessage;

    fn client() -> YandexClient {
        YandexClient::new(YandexConfig::new("key", "folder-1")).unwrap()
    }

    #[test]
    fn model_uri_includes_folder_and_model() {
        let config = YandexConfig::new("key", "b1g").with_model("yandexgpt-lite/latest");
        assert_eq!(config.model_uri(), "gpt://b1g/yandexgpt-lite/latest");
    }

    #[test]
    fn request_serializes_in_camel_case() {
        let request = AiRequest::user("hello", 0.3).unwrap();

        let json = serde_json::to_value(client().to_yandex_request(&request)).unwrap();

        assert_eq!(json["modelUri"], "gpt://folder-1/yandexgpt/latest");
        assert_eq!(json["completionOptions"]["stream"], false);
        assert_eq!(json["completionOptions"]["maxTokens"], "1000");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["text"], "hello");
    }

    #[test]
    fn system_messages_become_single_leading_message() {
        let request = AiRequest::new(
            vec![
                ConversationMessage::user("q"),
                ConversationMessage::system("s1"),
                ConversationMessage::system("s2"),
            ],
            0.5,
        )
        .unwrap();

        let body = client().to_yandex_request(&request);

        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[0].text, "s1\n\ns2");
        assert_eq!(body.messages[1].role, "user");
    }

    #[test]
    fn response_usage_strings_are_parsed() {
        let response: YandexResponse = serde_json::from_str(
            r#"{
                "result": {
                    "alternatives": [{"message": {"role": "assistant", "text": "Привет"}, "status": "ALTERNATIVE_STATUS_FINAL"}],
                    "usage": {"inputTextTokens": "18", "completionTokens": "4", "totalTokens": "22"},
                    "modelVersion": "23.10.2024"
                }
            }"#,
        )
        .unwrap();

        let result = YandexClient::into_result(response, 90).unwrap();

        assert_eq!(result.content, "Привет");
        assert_eq!(result.prompt_tokens, 18);
        assert_eq!(result.completion_tokens, 4);
        assert_eq!(result.total_tokens, 22);
    }

    #[test]
    fn response_without_alternatives_is_empty_response_error() {
        let response: YandexResponse =
            serde_json::from_str(r#"{"result": {"alternatives": []}}"#).unwrap();

        let err = YandexClient::into_result(response, 1).unwrap_err();
        assert!(matches!(err, AIError::EmptyResponse { .. }));
    }

    #[test]
    fn malformed_token_count_is_parse_error() {
        assert!(matches!(parse_count("many"), Err(AIError::Parse(_))));
    }
}
