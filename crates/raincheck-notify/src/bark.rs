//! Bark push client.

use std::time::Duration;

use raincheck_core::{BarkConfig, ReqwestErrorExt};
use serde::Serialize;
use tracing::instrument;

use crate::error::NotifyError;
use crate::message::Notification;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON body accepted by `POST <server>/<device_key>`.
#[derive(Debug, Serialize)]
struct BarkRequest<'a> {
    device_key: &'a str,
    title: &'a str,
    body: &'a str,
    category: &'a str,
    sound: &'a str,
    level: &'a str,
    url: &'a str,
}

pub struct BarkClient {
    client: reqwest::Client,
    server_url: String,
    device_key: String,
    category: String,
    sound: String,
    level: String,
    verbose: bool,
}

impl BarkClient {
    pub fn new(config: &BarkConfig, verbose: bool) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;

        Ok(Self {
            client,
            server_url: config.server_url.trim_end_matches('/').to_string(),
            device_key: config.device_key.clone(),
            category: config.category.clone(),
            sound: config.sound.clone(),
            level: config.level.clone(),
            verbose,
        })
    }

    /// Push `notification` to the configured device.
    #[instrument(skip_all, level = "info")]
    pub async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let request = BarkRequest {
            device_key: &self.device_key,
            title: &notification.title,
            body: &notification.body,
            category: &self.category,
            sound: &self.sound,
            level: &self.level,
            url: &notification.url,
        };

        if self.verbose {
            tracing::info!("Sending Bark notification to {}", self.server_url);
            tracing::info!("  title: {}", request.title);
            tracing::info!("  body: {}", request.body);
            tracing::info!("  category: {}", request.category);
            tracing::info!("  sound: {}", request.sound);
            tracing::info!("  level: {}", request.level);
        }

        let url = format!("{}/{}", self.server_url, self.device_key);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.into_network_error()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        if self.verbose {
            tracing::info!("Bark notification delivered");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_field_names() {
        let request = BarkRequest {
            device_key: "dev",
            title: "t",
            body: "b",
            category: "weather",
            sound: "alarm",
            level: "timeSensitive",
            url: "https://www.qweather.com/",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["device_key"], "dev");
        assert_eq!(value["level"], "timeSensitive");
        assert_eq!(value.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = BarkConfig {
            server_url: "https://bark.example.com/".to_string(),
            device_key: "dev".to_string(),
            ..Default::default()
        };
        let client = BarkClient::new(&config, false).unwrap();
        assert_eq!(client.server_url, "https://bark.example.com");
    }
}
