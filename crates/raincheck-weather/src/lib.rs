//! Weather acquisition and precipitation analysis for raincheck.
//!
//! Fetches current conditions and the 24-hour series from the QWeather v7 API
//! and reduces them into a single [`ForecastWindow`].

pub mod classify;
pub mod error;
pub mod fetcher;
pub mod forecast;
pub mod location;
pub mod provider;
pub mod retry;
pub mod types;

pub use classify::is_precipitating;
pub use error::{FetchError, ResolveError, WeatherError};
pub use fetcher::{Fetcher, DEFAULT_REQUEST_TIMEOUT};
pub use forecast::{aggregate, default_horizon};
pub use location::{lookup_known, LocationResolver};
pub use provider::WeatherProvider;
pub use retry::RetryConfig;
pub use types::*;
