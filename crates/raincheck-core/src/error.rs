//! Shared error types for the raincheck crates.
//!
//! This module provides the errors every crate needs to agree on:
//! - Configuration problems found while loading or validating settings
//! - Transport-level network failures, which are the only retryable class
//!
//! Each error carries an operator-facing `user_message()` for the cycle log.

use thiserror::Error;

/// Transport-level failures (connectivity, timeouts, interrupted bodies).
///
/// A non-success HTTP status is not represented here; the server answered.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Response body interrupted: {0}")]
    BodyInterrupted(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Will try again next cycle.",
            NetworkError::BodyInterrupted(_) => "The connection dropped mid-response.",
            NetworkError::InvalidRequest(_) => "The request could not be built. Check settings.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration file not found. Pass --config <path>.",
            ConfigError::Read { .. } => "Configuration file could not be read.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        // Request URLs carry credentials in the query string.
        let error = self.without_url();
        if error.is_timeout() {
            NetworkError::Timeout
        } else if error.is_connect() {
            NetworkError::ConnectionFailed(describe(&error))
        } else if error.is_body() {
            NetworkError::BodyInterrupted(describe(&error))
        } else if error.is_builder() {
            NetworkError::InvalidRequest(describe(&error))
        } else {
            // Anything else surfacing from `send()` happened on the wire.
            NetworkError::ConnectionFailed(describe(&error))
        }
    }
}

/// The error and every `source()` below it, joined with `": "`.
fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
