//! Mock AI Client for testing.
//!
//! Provides a configurable mock implementation of the AiClient port,
//! allowing tests to run without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses consumed in order
//! - Simulated delays for concurrency testing
//! - Error injection for resilience testing
//! - Call tracking for verification (messages and temperatures)
//!
//! # Example
//!
//! ```ignore
//! let client = MockAiClient::new()
//!     .with_response("QUESTION: Which decade?")
//!     .with_delay(Duration::from_millis(100));
//!
//! let result = client.send(request).await?;
//! assert_eq!(result.content, "QUESTION: Which decade?");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AIError, AiClient, AiRequest, AiResult, ProviderInfo, TokenUsage};

/// Content returned once the configured queue is exhausted.
pub const DEFAULT_MOCK_RESPONSE: &str = "Mock response";

/// Mock AI client for testing.
///
/// Clones share the same queue and call history.
#[derive(Debug, Clone)]
pub struct MockAiClient {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<AiRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful result.
    Success {
        content: String,
        duration_ms: u64,
        usage: TokenUsage,
    },
    /// Return an error.
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate a reply without text.
    EmptyResponse,
    /// Simulate an unparseable reply.
    Parse { message: String },
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl MockError {
    fn into_ai_error(self, provider: &str) -> AIError {
        match self {
            MockError::EmptyResponse => AIError::empty_response(provider),
            MockError::Parse { message } => AIError::parse(message),
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAiClient {
    /// Creates a new mock client with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_response_full(content, 100, TokenUsage::new(10, 20))
    }

    /// Adds a successful response with explicit latency and usage.
    pub fn with_response_full(
        self,
        content: impl Into<String>,
        duration_ms: u64,
        usage: TokenUsage,
    ) -> Self {
        lock(&self.responses).push_back(MockResponse::Success {
            content: content.into(),
            duration_ms,
            usage,
        });
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the provider info.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this client.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<AiRequest> {
        lock(&self.calls).clone()
    }

    /// Temperatures of all recorded calls, in call order.
    pub fn temperatures(&self) -> Vec<f32> {
        lock(&self.calls).iter().map(|r| r.temperature()).collect()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Gets the next response or a default.
    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: DEFAULT_MOCK_RESPONSE.to_string(),
                duration_ms: 50,
                usage: TokenUsage::new(5, 10),
            })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl AiClient for MockAiClient {
    async fn send(&self, request: AiRequest) -> Result<AiResult, AIError> {
        // Record the call
        lock(&self.calls).push(request);

        // Simulate delay
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success {
                content,
                duration_ms,
                usage,
            } => Ok(AiResult::new(content, duration_ms, usage)),
            MockResponse::Error(err) => Err(err.into_ai_error(&self.info.name)),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
