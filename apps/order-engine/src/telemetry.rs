//! Logging setup.
//!
//! `RUST_LOG` wins over the configured level.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_engine::{config::load_config, telemetry::init_telemetry};
//!
//! let config = load_config(None)?;
//! init_telemetry(&config.observability.logging)?;
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Error returned when a global subscriber is already installed.
pub type TelemetryError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns error if a global subscriber was already set.
pub fn init_telemetry(logging: &LoggingConfig) -> Result<(), TelemetryError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    match logging.format {
        LogFormat::Pretty => builder.with_target(false).pretty().try_init(),
        LogFormat::Json => builder.with_ansi(false).json().try_init(),
    }
}
