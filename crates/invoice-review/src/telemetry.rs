//! Process-wide logging setup.
//!
//! Library code logs through the `log` facade and opens `tracing` spans around
//! network calls; both end up in the same subscriber.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::ReviewError;

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Fails if a subscriber or `log` logger is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ReviewError> {
    let filter = build_filter(config)?;

    tracing_log::LogTracer::init().map_err(|e| ReviewError::Logging(e.to_string()))?;

    let registry = Registry::default().with(filter);
    let result = match config.format {
        LogFormat::Text => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().with_target(true)))
        }
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_current_span(true)),
        ),
    };
    result.map_err(|e| ReviewError::Logging(e.to_string()))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, ReviewError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| ReviewError::Logging(format!("invalid level '{}': {}", config.level, e)))
}
