//! Retry policy for provider requests with linear backoff.
//!
//! Only transport faults are retried:
//! - Timeouts
//! - Connection failures (refused, reset, DNS)
//! - Response bodies cut off mid-stream
//!
//! It does NOT retry anything the server actually answered:
//! - Non-success HTTP status codes, including 5xx
//! - Malformed or undecodable payloads
//! - Provider error codes inside a 200 response

use std::time::Duration;

/// Default retry configuration
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_STEP_MS: u64 = 1000;

/// Retry configuration
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay after attempt `n` is `n * backoff_step`
    pub backoff_step: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_step: Duration::from_millis(DEFAULT_BACKOFF_STEP_MS),
        }
    }
}

impl RetryConfig {
    /// One-second linear backoff with the given attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Override the backoff step (tests use milliseconds).
    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// At least one attempt is always made.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

/// Error classification for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Should retry the request
    Retry,
    /// Should not retry - permanent failure
    NoRetry,
}

/// Check if a reqwest error raised while sending or streaming is retryable
pub fn is_retryable_error(error: &reqwest::Error) -> RetryDecision {
    if error.is_timeout() {
        tracing::debug!("Request timed out, will retry");
        return RetryDecision::Retry;
    }

    if error.is_connect() {
        tracing::debug!("Connection error, will retry");
        return RetryDecision::Retry;
    }

    // Decompression failures are deterministic for a given body.
    if error.is_decode() {
        tracing::debug!("Body decode error, not retryable");
        return RetryDecision::NoRetry;
    }

    if error.is_body() {
        tracing::debug!("Body stream interrupted, will retry");
        return RetryDecision::Retry;
    }

    // Bad URL or request construction
    if error.is_builder() {
        tracing::debug!("Request could not be built, not retryable");
        return RetryDecision::NoRetry;
    }

    // Whatever is left failed on the wire before a response arrived.
    RetryDecision::Retry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_step, Duration::from_secs(1));
    }

    #[test]
    fn test_linear_delay_calculation() {
        let config = RetryConfig::new(3);

        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(3));
    }

    #[test]
    fn test_custom_backoff_step() {
        let config = RetryConfig::new(5).with_backoff_step(Duration::from_millis(10));
        assert_eq!(config.delay_for_attempt(4), Duration::from_millis(40));
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        assert_eq!(RetryConfig::new(0).attempts(), 1);
        assert_eq!(RetryConfig::new(4).attempts(), 4);
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_retryable() {
        let err = reqwest::Client::new()
            .get("http://")
            .send()
            .await
            .unwrap_err();
        assert_eq!(is_retryable_error(&err), RetryDecision::NoRetry);
    }

    #[tokio::test]
    async fn test_connection_refused_is_retryable() {
        // Bind then drop to get a port nobody is listening on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{}/", port))
            .send()
            .await
            .unwrap_err();
        assert_eq!(is_retryable_error(&err), RetryDecision::Retry);
    }
}
