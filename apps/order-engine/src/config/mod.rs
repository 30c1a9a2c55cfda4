//! Configuration loading for the order engine.
//!
//! YAML files with `${VAR}` and `${VAR:-default}` environment interpolation,
//! validated after parsing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_engine::config::load_config;
//!
//! // ORDER_ENGINE_CONFIG, falling back to config.yaml
//! let config = load_config(None)?;
//! println!("starting cash: {}", config.engine.starting_cash);
//! ```

mod api;
mod engine;
mod fees;
mod fills;
mod observability;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use api::ApiConfig;
pub use engine::EngineConfig;
pub use fees::{FeeModelKind, FeesConfig};
pub use fills::FillsConfig;
pub use observability::{LogFormat, LoggingConfig, ObservabilityConfig};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "ORDER_ENGINE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Account and order settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Fill simulation.
    #[serde(default)]
    pub fills: FillsConfig,
    /// Commissions.
    #[serde(default)]
    pub fees: FeesConfig,
    /// Platform API client.
    #[serde(default)]
    pub api: ApiConfig,
    /// Logging.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// Without an explicit path, `ORDER_ENGINE_CONFIG` is used, then `config.yaml`.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(
        || std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
        str::to_string,
    );

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
        path: path.clone(),
        source,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Replace `${VAR}` and `${VAR:-default}` with environment values.
///
/// Unset or empty variables take the default, or the empty string.
#[allow(clippy::expect_used)] // constant pattern
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let engine = &config.engine;

    if engine.account_currency.len() != 3
        || !engine.account_currency.chars().all(|c| c.is_ascii_uppercase())
    {
        return Err(ConfigError::ValidationError(
            "engine.account_currency must be a three-letter uppercase code".to_string(),
        ));
    }

    if engine.starting_cash < 0.0 {
        return Err(ConfigError::ValidationError(
            "engine.starting_cash must not be negative".to_string(),
        ));
    }

    if engine.market_on_close_buffer_minutes < 0.0 {
        return Err(ConfigError::ValidationError(
            "engine.market_on_close_buffer_minutes must not be negative".to_string(),
        ));
    }

    for (name, value) in [
        (
            "engine.minimum_order_margin_portfolio_percentage",
            engine.minimum_order_margin_portfolio_percentage,
        ),
        (
            "engine.free_portfolio_value_percentage",
            engine.free_portfolio_value_percentage,
        ),
    ] {
        if !(0.0..1.0).contains(&value) {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be in [0.0, 1.0)"
            )));
        }
    }

    if let Some(fraction) = config.fills.partial_fill_volume_fraction
        && (fraction <= 0.0 || fraction > 1.0)
    {
        return Err(ConfigError::ValidationError(
            "fills.partial_fill_volume_fraction must be in (0.0, 1.0]".to_string(),
        ));
    }

    let fees = &config.fees;
    if [fees.per_share, fees.per_contract, fees.minimum, fees.sec_fee_per_dollar]
        .iter()
        .any(|fee| *fee < 0.0)
    {
        return Err(ConfigError::ValidationError(
            "fees must not be negative".to_string(),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs must be positive".to_string(),
        ));
    }

    if config.observability.logging.level.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "observability.logging.level must not be empty".to_string(),
        ));
    }

    Ok(())
}
