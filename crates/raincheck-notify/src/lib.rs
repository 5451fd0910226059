//! Push notifications for raincheck.
//!
//! Renders a [`Notification`] from the current observation and forecast window and
//! delivers it through a Bark server.

pub mod bark;
pub mod error;
pub mod message;

pub use bark::BarkClient;
pub use error::NotifyError;
pub use message::{Notification, ALERT_LINK, ALERT_TITLE};
