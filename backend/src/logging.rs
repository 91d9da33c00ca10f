//! Logging setup for the care tracker backend.
//!
//! Everything logs through `tracing`. The configured level is only a default:
//! `RUST_LOG` takes precedence when set.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` if set, otherwise the configured level
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(config: &LoggingConfig) {
    let subscriber = tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt::layer().with_target(true));

    // Ignore the error if a subscriber is already set
    let _ = subscriber.try_init();
}
