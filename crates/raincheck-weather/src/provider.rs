//! Acquisition of one composite reading: resolve, fetch current, fetch hourly, merge.

use std::time::Duration;

use raincheck_core::{AppSettings, NetworkError, WeatherApiConfig};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::classify::is_precipitating;
use crate::error::{FetchError, WeatherError};
use crate::fetcher::Fetcher;
use crate::location::LocationResolver;
use crate::retry::RetryConfig;
use crate::types::{CompositeReading, HourlyResponse, LocationId, NowResponse};

const NOW_PATH: &str = "/v7/weather/now";
const HOURLY_PATH: &str = "/v7/weather/24h";

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    fetcher: Fetcher,
    resolver: LocationResolver,
    base_url: String,
    api_key: String,
    lang: String,
}

impl WeatherProvider {
    /// Build a provider from configuration: `max_retries` attempts, one-second linear
    /// backoff, `request_timeout_secs` per attempt.
    pub fn new(api: &WeatherApiConfig, app: &AppSettings) -> Result<Self, WeatherError> {
        Self::with_retry(api, RetryConfig::new(app.max_retries), app.request_timeout())
    }

    pub fn with_retry(
        api: &WeatherApiConfig,
        retry: RetryConfig,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let fetcher = Fetcher::new(retry, timeout)?;
        let base_url = api.base_url();
        let resolver = LocationResolver::new(fetcher.clone(), &base_url, &api.api_key, &api.lang);

        Ok(Self {
            fetcher,
            resolver,
            base_url,
            api_key: api.api_key.clone(),
            lang: api.lang.clone(),
        })
    }

    /// Fetch everything one check cycle needs for `location_name`.
    ///
    /// Any failure aborts the whole acquisition; no partial reading is returned.
    pub async fn acquire(
        &self,
        location_name: &str,
        cancel: &CancellationToken,
    ) -> Result<CompositeReading, WeatherError> {
        let location_id = self.resolver.resolve(location_name, cancel).await?;

        let now_url = self.endpoint_url(NOW_PATH, &location_id).map_err(WeatherError::Current)?;
        let current: NowResponse = self
            .fetcher
            .fetch(&now_url, cancel)
            .await
            .map_err(WeatherError::Current)?;

        let currently_precipitating = is_precipitating(&current.now.text, &current.now.precip);
        tracing::info!(
            "Current weather in {}: {}, {}°C, {}mm, precipitating: {}",
            location_name,
            current.now.text,
            current.now.temp,
            current.now.precip,
            currently_precipitating
        );

        let hourly_url = self
            .endpoint_url(HOURLY_PATH, &location_id)
            .map_err(WeatherError::Hourly)?;
        let hourly: HourlyResponse = self
            .fetcher
            .fetch(&hourly_url, cancel)
            .await
            .map_err(WeatherError::Hourly)?;

        tracing::debug!("Received {} hourly entries", hourly.hourly.len());

        Ok(CompositeReading {
            now: current.now,
            hourly: hourly.hourly,
            currently_precipitating,
        })
    }

    fn endpoint_url(&self, path: &str, location: &LocationId) -> Result<Url, FetchError> {
        let mut params = vec![("location", location.as_str()), ("key", self.api_key.as_str())];
        if !self.lang.is_empty() {
            params.push(("lang", self.lang.as_str()));
        }

        Url::parse_with_params(&format!("{}{}", self.base_url, path), &params).map_err(|e| {
            FetchError::Request {
                endpoint: path.to_string(),
                source: NetworkError::InvalidRequest(e.to_string()),
            }
        })
    }
}
