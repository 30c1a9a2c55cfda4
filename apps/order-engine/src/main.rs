//! Order Engine Binary
//!
//! Loads the configuration, initializes logging and builds the engine.
//! With API credentials configured it also checks them against the
//! platform.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-engine
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_ENGINE_CONFIG`: config file path (default: config.yaml)
//! - `RUST_LOG`: log filter (default: `observability.logging.level`)
//!
//! Any `${VAR}` in the config file is replaced by the variable's value.

use anyhow::Context;
use order_engine::Algorithm;
use order_engine::config::load_config;
use order_engine::infrastructure::api::ApiClient;
use order_engine::telemetry::init_telemetry;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config(None).context("loading configuration")?;
    init_telemetry(&config.observability.logging)
        .map_err(|e| anyhow::anyhow!("initializing logging: {e}"))?;

    let algorithm = Algorithm::from_config(&config).context("building the engine")?;
    info!(
        account_currency = %algorithm.portfolio().account_currency(),
        cash = %algorithm.portfolio().cash(),
        max_orders = algorithm.settings().max_orders(),
        live_mode = algorithm.settings().live_mode(),
        "Order engine ready"
    );

    if config.api.has_credentials() {
        let client = ApiClient::new(&config.api).context("building the API client")?;
        let response = client.authenticate().await;
        if response.success {
            info!(base_url = %config.api.base_url, "API credentials accepted");
        } else {
            warn!(errors = ?response.errors, "API authentication failed");
        }
    } else {
        info!("No API credentials configured");
    }

    Ok(())
}
