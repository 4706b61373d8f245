//! Throttle-aware HTTP client shared by every outbound regsift call.
//!
//! Regulations.gov signals rate limiting with HTTP 429 and an optional
//! `Retry-After` header. This wrapper retries throttled requests in place,
//! so callers only ever observe a successful response or a terminal
//! failure carrying the status and body for logging.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_RETRY_AFTER_SECS: u64 = 10;
const DEFAULT_MAX_THROTTLE_RETRIES: u32 = 5;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("still throttled after {attempts} retries")]
    ThrottledOut { attempts: u32 },

    #[error("request cannot be retried (non-cloneable body)")]
    NotRetryable,
}

/// Wait strategy applied between a throttled response and its retry.
pub trait BackoffPolicy: Send + Sync {
    /// How long to wait, given the server-suggested duration (if any).
    fn delay(&self, retry_after: Option<Duration>) -> Duration;
}

/// Honors the server's `Retry-After` hint, falling back to 10 seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryAfterBackoff;

impl BackoffPolicy for RetryAfterBackoff {
    fn delay(&self, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or(Duration::from_secs(DEFAULT_RETRY_AFTER_SECS))
    }
}

/// Zero-delay policy for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackoff;

impl BackoffPolicy for NoBackoff {
    fn delay(&self, _retry_after: Option<Duration>) -> Duration {
        Duration::ZERO
    }
}

pub struct ThrottledClient {
    client: Client,
    backoff: Box<dyn BackoffPolicy>,
    max_throttle_retries: u32,
}

impl ThrottledClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            backoff: Box::new(RetryAfterBackoff),
            max_throttle_retries: DEFAULT_MAX_THROTTLE_RETRIES,
        })
    }

    /// Replaces the backoff policy (tests substitute [`NoBackoff`]).
    pub fn with_backoff(mut self, policy: impl BackoffPolicy + 'static) -> Self {
        self.backoff = Box::new(policy);
        self
    }

    pub fn with_max_throttle_retries(mut self, retries: u32) -> Self {
        self.max_throttle_retries = retries;
        self
    }

    /// Starts a GET request against `url`; finish it with [`execute`].
    ///
    /// [`execute`]: ThrottledClient::execute
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Sends the request, transparently retrying while the server throttles.
    ///
    /// Any other non-success status is terminal and reported with its body.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let mut attempts = 0;

        loop {
            let attempt = request.try_clone().ok_or(FetchError::NotRetryable)?;
            let response = attempt.send().await?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return check_status(response).await;
            }

            if attempts >= self.max_throttle_retries {
                return Err(FetchError::ThrottledOut { attempts });
            }

            let wait = self.backoff.delay(retry_after_hint(&response));
            warn!(
                wait_secs = wait.as_secs(),
                attempts, "Rate limit hit, backing off before retry"
            );
            tokio::time::sleep(wait).await;
            attempts += 1;
        }
    }
}

/// Parses the `Retry-After` header as whole seconds.
fn retry_after_hint(response: &Response) -> Option<Duration> {
    let secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()?;
    debug!(secs, "Server provided a Retry-After hint");
    Some(Duration::from_secs(secs))
}

async fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_backoff_honors_hint() {
        let policy = RetryAfterBackoff;
        assert_eq!(
            policy.delay(Some(Duration::from_secs(3))),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn retry_after_backoff_defaults_to_ten_seconds() {
        let policy = RetryAfterBackoff;
        assert_eq!(policy.delay(None), Duration::from_secs(10));
    }

    #[test]
    fn no_backoff_never_waits() {
        let policy = NoBackoff;
        assert_eq!(policy.delay(Some(Duration::from_secs(60))), Duration::ZERO);
        assert_eq!(policy.delay(None), Duration::ZERO);
    }
}
