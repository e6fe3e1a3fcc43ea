//! Tracing subscriber setup for embedding binaries.
//!
//! The library itself only emits `tracing` events; hosts that want output
//! call `init` once at startup. Filter resolution: `PROVENANCE_LOG` env var,
//! then the configured default.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};

pub const LOG_ENV_VAR: &str = "PROVENANCE_LOG";

/// Install the global subscriber. Errors (e.g. a subscriber already set by
/// the host) are returned, not panicked on.
pub fn init(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(config.filter.clone()));

    match config.format {
        LogFormat::Pretty => Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .try_init(),
    }
}
