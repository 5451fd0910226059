//! raincheck: polls QWeather and pushes a Bark alert when rain or snow is near.

mod cycle;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use raincheck_core::Config;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cycle::Monitor;

/// Precipitation notifier
#[derive(Parser)]
#[command(name = "raincheck", version, about = "Push a notification when precipitation is near")]
struct Cli {
    /// Run a single check and exit.
    #[arg(long)]
    once: bool,

    /// Use a fixed simulated forecast to exercise the notification path.
    #[arg(long)]
    simulate: bool,

    /// Configuration file (defaults to ./config.toml, then the user config dir).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    raincheck_core::init(config.app.verbose)?;

    if let Err(e) = config.ensure_valid() {
        tracing::error!("{}", e.user_message());
        return Err(e.into());
    }

    tracing::info!(
        "raincheck starting: location {}, every {} min, {} attempts per request",
        config.weather_api.location,
        config.app.check_interval_minutes,
        config.app.max_retries
    );
    if cli.simulate {
        tracing::info!("Simulation mode enabled");
    }

    let monitor = Monitor::new(&config, cli.simulate)?;
    let cancel = CancellationToken::new();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    if cli.once {
        let outcome = monitor.check(&cancel).await;
        if outcome.is_failure() {
            anyhow::bail!("Check failed: {:?}", outcome);
        }
        return Ok(());
    }

    // The first tick completes immediately.
    let mut interval = tokio::time::interval(config.app.check_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let outcome = monitor.check(&cancel).await;
                tracing::debug!("Cycle finished: {:?}", outcome);
            }
        }
    }

    tracing::info!("raincheck stopped");
    Ok(())
}
