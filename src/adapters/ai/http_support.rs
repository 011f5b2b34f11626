//! Shared HTTP plumbing for the provider bindings.
//!
//! All three bindings speak JSON over HTTPS with the same status semantics
//! and the same retry policy, so the request loop lives here.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::warn;

use crate::ports::AIError;

/// Default retry-after when a provider rate limits without saying for how long.
const DEFAULT_RETRY_AFTER_SECS: u32 = 60;

/// Builds the shared reqwest client for a binding.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, AIError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))
}

/// Maps a reqwest failure to the port error.
pub(crate) fn map_send_error(err: reqwest::Error, timeout: Duration) -> AIError {
    if err.is_timeout() {
        AIError::Timeout {
            timeout_secs: timeout.as_secs() as u32,
        }
    } else if err.is_connect() {
        AIError::network(format!("Connection failed: {}", err))
    } else {
        AIError::network(err.to_string())
    }
}

/// Parses the API response status and handles errors.
pub(crate) async fn handle_response_status(response: Response) -> Result<Response, AIError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

    let error_body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => Err(AIError::AuthenticationFailed),
        429 => Err(AIError::rate_limited(retry_after)),
        400 | 404 | 422 => Err(AIError::InvalidRequest(error_body)),
        500..=599 => Err(AIError::unavailable(format!(
            "Server error {}: {}",
            status, error_body
        ))),
        _ => Err(AIError::network(format!(
            "Unexpected status {}: {}",
            status, error_body
        ))),
    }
}

/// Sends one request and decodes the JSON body, timing the round trip.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<(T, u64), AIError> {
    let started = Instant::now();

    let response = request
        .send()
        .await
        .map_err(|e| map_send_error(e, timeout))?;
    let response = handle_response_status(response).await?;
    let body = response
        .json::<T>()
        .await
        .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

    Ok((body, started.elapsed().as_millis() as u64))
}

/// Runs `attempt` until it succeeds, fails permanently, or retries run out.
///
/// Backoff is exponential: 1s, 2s, 4s, ...
pub(crate) async fn with_retries<T, F, Fut>(
    provider: &str,
    max_retries: u32,
    mut attempt: F,
) -> Result<T, AIError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AIError>>,
{
    let mut retry_count = 0;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() || retry_count >= max_retries {
                    return Err(err);
                }
                warn!(provider, retry_count, error = %err, "Retrying provider call");
            }
        }

        let delay = Duration::from_secs(1 << retry_count);
        sleep(delay).await;
        retry_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn with_retries_returns_first_success() {
        let calls = AtomicU32::new(0);

        let result = with_retries("test", 3, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AIError>(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn with_retries_stops_on_permanent_error() {
        let calls = AtomicU32::new(0);

        let result: Result<(), AIError> = with_retries("test", 3, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AIError::AuthenticationFailed)
        })
        .await;

        assert!(matches!(result, Err(AIError::AuthenticationFailed)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn with_retries_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);

        let result: Result<(), AIError> = with_retries("test", 2, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AIError::network("reset"))
        })
        .await;

        assert!(matches!(result, Err(AIError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn with_retries_recovers_from_transient_error() {
        let calls = AtomicU32::new(0);

        let result = with_retries("test", 3, || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AIError::unavailable("busy"))
            } else {
                Ok("ok")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
