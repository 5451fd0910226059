//! Weather acquisition errors.

use raincheck_core::NetworkError;
use thiserror::Error;

/// Outcome of a failed [`Fetcher::fetch`](crate::Fetcher::fetch).
///
/// Only `AttemptsExhausted` follows retries; every other variant is returned on the
/// attempt that produced it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{endpoint}: gave up after {attempts} attempts: {source}")]
    AttemptsExhausted {
        endpoint: String,
        attempts: u32,
        #[source]
        source: NetworkError,
    },

    #[error("{endpoint}: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: NetworkError,
    },

    #[error("{endpoint}: HTTP {status}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("{endpoint}: failed to decode response: {message}")]
    Decode { endpoint: String, message: String },

    #[error("{endpoint}: provider returned code {code}{}", parenthesized(.message))]
    ProviderCode {
        endpoint: String,
        code: String,
        message: Option<String>,
    },

    #[error("{endpoint}: cancelled")]
    Cancelled { endpoint: String },
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::AttemptsExhausted { source, .. } => source.user_message(),
            FetchError::Request { source, .. } => source.user_message(),
            FetchError::HttpStatus { status, .. } if *status >= 500 => {
                "The weather service is having problems. Will try again next cycle."
            }
            FetchError::HttpStatus { .. } => "The weather service rejected the request.",
            FetchError::Decode { .. } => "Received an unexpected response from the weather service.",
            FetchError::ProviderCode { .. } => {
                "The weather service reported an error. Check the API key and host."
            }
            FetchError::Cancelled { .. } => "The request was cancelled.",
        }
    }
}

fn parenthesized(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({})", m))
        .unwrap_or_default()
}

/// Location resolution errors. Each carries the name that was being resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("looking up location '{name}': {source}")]
    Lookup {
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("location lookup for '{name}' failed with provider code {code}: {info}")]
    Provider {
        name: String,
        code: String,
        info: String,
    },

    #[error("location not found: {name}")]
    NotFound { name: String },
}

impl ResolveError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ResolveError::Lookup { source, .. } => source.user_message(),
            ResolveError::Provider { .. } => "Location lookup failed. Check the API key.",
            ResolveError::NotFound { .. } => "Location not found. Check the configured name.",
        }
    }
}

/// Weather provider errors
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Location error: {0}")]
    Location(#[from] ResolveError),

    #[error("Current conditions unavailable: {0}")]
    Current(#[source] FetchError),

    #[error("Hourly forecast unavailable: {0}")]
    Hourly(#[source] FetchError),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Client(_) => "Could not set up the HTTP client.",
            WeatherError::Location(e) => e.user_message(),
            WeatherError::Current(e) | WeatherError::Hourly(e) => e.user_message(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            WeatherError::Location(ResolveError::Lookup { source, .. }) => {
                matches!(source, FetchError::Cancelled { .. })
            }
            WeatherError::Current(e) | WeatherError::Hourly(e) => {
                matches!(e, FetchError::Cancelled { .. })
            }
            _ => false,
        }
    }
}
