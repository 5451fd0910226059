//! One check cycle: acquire, reduce, notify.

use anyhow::Result;
use chrono::{DateTime, Utc};
use raincheck_core::Config;
use raincheck_notify::{BarkClient, Notification};
use raincheck_weather::{aggregate, default_horizon, ForecastWindow, WeatherProvider};
use tokio_util::sync::CancellationToken;

/// How a cycle ended. Failures are logged where they happen and never escape `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No precipitation within the horizon
    Clear,
    Notified,
    /// Precipitation found but the push was not delivered
    NotifyFailed,
    /// Weather data could not be obtained
    AcquireFailed,
}

impl CycleOutcome {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::NotifyFailed | Self::AcquireFailed)
    }
}

pub struct Monitor {
    provider: WeatherProvider,
    notifier: BarkClient,
    location: String,
    simulate: bool,
}

impl Monitor {
    pub fn new(config: &Config, simulate: bool) -> Result<Self> {
        let provider = WeatherProvider::new(&config.weather_api, &config.app)?;
        let notifier = BarkClient::new(&config.bark, config.app.verbose)?;

        Ok(Self {
            provider,
            notifier,
            location: config.weather_api.location.clone(),
            simulate,
        })
    }

    pub async fn check(&self, cancel: &CancellationToken) -> CycleOutcome {
        self.check_at(cancel, Utc::now()).await
    }

    async fn check_at(&self, cancel: &CancellationToken, now: DateTime<Utc>) -> CycleOutcome {
        tracing::info!("Checking weather for {}", self.location);

        let reading = match self.provider.acquire(&self.location, cancel).await {
            Ok(reading) => reading,
            Err(e) if e.is_cancelled() => {
                tracing::info!("Check cancelled");
                return CycleOutcome::AcquireFailed;
            }
            Err(e) => {
                tracing::error!("Failed to get weather: {} ({})", e.user_message(), e);
                return CycleOutcome::AcquireFailed;
            }
        };

        let window = if self.simulate {
            tracing::info!("Simulation mode: using a fixed forecast");
            ForecastWindow::simulated()
        } else {
            aggregate(&reading, default_horizon(), now)
        };

        if !window.will_precipitate {
            tracing::info!("No precipitation expected in the next 3 hours");
            return CycleOutcome::Clear;
        }

        tracing::info!(
            "Precipitation expected: {} from {} to {}, {} {}",
            window.weather_type,
            window.start,
            window.end,
            window.intensity,
            window.amount
        );

        let notification = Notification::precipitation_alert(&self.location, &reading.now, &window);
        match self.notifier.send(&notification).await {
            Ok(()) => {
                tracing::info!("Notification sent");
                CycleOutcome::Notified
            }
            Err(e) => {
                tracing::error!("Failed to send notification: {} ({})", e.user_message(), e);
                CycleOutcome::NotifyFailed
            }
        }
    }
}
