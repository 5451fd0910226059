//! Single-endpoint JSON fetcher with bounded retries.

use std::sync::Arc;
use std::time::Duration;

use raincheck_core::ReqwestErrorExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::FetchError;
use crate::retry::{is_retryable_error, RetryConfig, RetryDecision};
use crate::types::ProviderStatus;

/// Default ceiling for one attempt, independent of the retry budget.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("raincheck/", env!("CARGO_PKG_VERSION"));

/// Why one attempt failed.
enum AttemptError {
    /// Worth another attempt after backing off
    Transport(raincheck_core::NetworkError),
    /// Returned to the caller as-is
    Fatal(FetchError),
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Arc<Client>,
    retry: RetryConfig,
}

impl Fetcher {
    pub fn new(retry: RetryConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        // gzip bodies are decompressed transparently before decoding.
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            retry,
        })
    }

    /// GET `url` and decode the JSON body into `T`.
    ///
    /// Transport faults are retried up to the configured attempt count, sleeping
    /// `attempt * backoff_step` in between. A non-success status, an undecodable body
    /// or a provider error code fails immediately. Cancelling `cancel` aborts both
    /// in-flight requests and backoff sleeps.
    pub async fn fetch<T>(&self, url: &Url, cancel: &CancellationToken) -> Result<T, FetchError>
    where
        T: DeserializeOwned + ProviderStatus,
    {
        // The query string carries the API key; only the path goes into logs and errors.
        let endpoint = url.path().to_string();
        let max_attempts = self.retry.attempts();
        let mut attempt = 1;

        loop {
            tracing::debug!(endpoint = %endpoint, attempt, max_attempts, "Sending request");

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(FetchError::Cancelled { endpoint: endpoint.clone() });
                }
                outcome = self.attempt::<T>(url, &endpoint) => outcome,
            };

            let error = match outcome {
                Ok(record) => {
                    if attempt > 1 {
                        tracing::info!(endpoint = %endpoint, "Request succeeded on attempt {}", attempt);
                    }
                    return Ok(record);
                }
                Err(AttemptError::Fatal(e)) => {
                    tracing::debug!(endpoint = %endpoint, "Non-retryable failure: {}", e);
                    return Err(e);
                }
                Err(AttemptError::Transport(e)) => e,
            };

            tracing::warn!(
                endpoint = %endpoint,
                "Attempt {} of {} failed: {}",
                attempt,
                max_attempts,
                error
            );

            if attempt >= max_attempts {
                tracing::error!(endpoint = %endpoint, "All {} attempts exhausted", max_attempts);
                return Err(FetchError::AttemptsExhausted {
                    endpoint,
                    attempts: max_attempts,
                    source: error,
                });
            }

            let delay = self.retry.delay_for_attempt(attempt);
            tracing::debug!(endpoint = %endpoint, "Backing off for {:?}", delay);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(FetchError::Cancelled { endpoint: endpoint.clone() });
                }
                _ = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }

    /// One request/response exchange. The response is dropped before returning,
    /// so no connection outlives its attempt.
    async fn attempt<T>(&self, url: &Url, endpoint: &str) -> Result<T, AttemptError>
    where
        T: DeserializeOwned + ProviderStatus,
    {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(e, endpoint))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Fatal(FetchError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }));
        }

        let body = response.bytes().await.map_err(|e| classify(e, endpoint))?;

        let record: T = serde_json::from_slice(&body).map_err(|e| {
            AttemptError::Fatal(FetchError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })
        })?;

        if !record.is_success() {
            return Err(AttemptError::Fatal(FetchError::ProviderCode {
                endpoint: endpoint.to_string(),
                code: record.code().to_string(),
                message: record.message().map(str::to_string),
            }));
        }

        Ok(record)
    }
}

fn classify(error: reqwest::Error, endpoint: &str) -> AttemptError {
    match is_retryable_error(&error) {
        RetryDecision::Retry => AttemptError::Transport(error.into_network_error()),
        RetryDecision::NoRetry if error.is_decode() => AttemptError::Fatal(FetchError::Decode {
            endpoint: endpoint.to_string(),
            message: error.without_url().to_string(),
        }),
        RetryDecision::NoRetry => AttemptError::Fatal(FetchError::Request {
            endpoint: endpoint.to_string(),
            source: error.into_network_error(),
        }),
    }
}
