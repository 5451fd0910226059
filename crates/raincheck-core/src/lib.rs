pub mod config;
pub mod error;

pub use config::{AppSettings, BarkConfig, Config, ValidationResult, WeatherApiConfig};
pub use error::{ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

const QUIET_FILTER: &str = "info";
const VERBOSE_FILTER: &str = "info,raincheck=debug,raincheck_weather=debug,raincheck_notify=debug";

/// Initialize tracing. `RUST_LOG` wins; otherwise our crates log at debug when verbose.
pub fn init(verbose: bool) -> Result<()> {
    let fallback = if verbose { VERBOSE_FILTER } else { QUIET_FILTER };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("raincheck core initialized");
    Ok(())
}
