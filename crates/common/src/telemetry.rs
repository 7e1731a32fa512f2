//! Logging initialization for processes embedding the HeavyDB backend.
//!
//! Sets up a `tracing` registry with an `EnvFilter` and a fmt layer. `RUST_LOG` takes
//! precedence over the configured filter.

use crate::config::LoggingSettings;
use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Filter from `RUST_LOG`, falling back to the configured directives.
pub fn env_filter(settings: &LoggingSettings) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.filter)
            .with_context(|| format!("Invalid log filter '{}'", settings.filter)),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let filter = env_filter(settings)?;

    let fmt_layer = if settings.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(filter = %settings.filter, json = settings.json, "Logging initialized");
    Ok(())
}
