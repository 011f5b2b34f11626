//! AI Client Adapters.
//!
//! Implementations of the AiClient port for the supported LLM providers.
//!
//! ## Available Adapters
//!
//! - `AnthropicClient` - Anthropic Claude (primary provider)
//! - `YandexClient` - YandexGPT (secondary provider for expert comparisons)
//! - `HuggingFaceClient` - Any model behind the HuggingFace router
//! - `MockAiClient` - Configurable mock for testing

mod anthropic_client;
mod http_support;
mod hugging_face_client;
mod mock_client;
mod yandex_client;

pub use anthropic_client::{AnthropicClient, AnthropicConfig, DEFAULT_ANTHROPIC_MODEL};
pub use hugging_face_client::{HuggingFaceClient, HuggingFaceConfig};
pub use mock_client::{MockAiClient, MockError, MockResponse, DEFAULT_MOCK_RESPONSE};
pub use yandex_client::{YandexClient, YandexConfig, DEFAULT_YANDEX_MODEL};
