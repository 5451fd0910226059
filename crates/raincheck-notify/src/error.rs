//! Notification error types.

use raincheck_core::NetworkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Notification request failed: {0}")]
    Request(#[source] NetworkError),

    #[error("Bark server returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl NotifyError {
    /// User-friendly error message for the cycle log.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(_) => "Notification client could not be created".to_string(),
            Self::Request(e) => format!("Notification not delivered. {}", e.user_message()),
            Self::Rejected { status, .. } => {
                format!("Bark rejected the notification (HTTP {}). Check the device key.", status)
            }
        }
    }
}
