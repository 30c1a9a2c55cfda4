//! Engine configuration: account, order cap and sizing parameters.

use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Account currency code.
    #[serde(default = "default_account_currency")]
    pub account_currency: String,
    /// Starting cash in the account currency.
    #[serde(default = "default_starting_cash")]
    pub starting_cash: f64,
    /// Lifetime order cap for non-live runs.
    #[serde(default = "default_max_orders")]
    pub max_orders: usize,
    /// Minutes before the close after which market-on-close orders are refused.
    #[serde(default = "default_market_on_close_buffer_minutes")]
    pub market_on_close_buffer_minutes: f64,
    /// Whether the run trades live.
    #[serde(default)]
    pub live_mode: bool,
    /// Whether liquidation may place orders.
    #[serde(default = "default_true")]
    pub liquidate_enabled: bool,
    /// Orders worth less than this fraction of portfolio value are skipped.
    #[serde(default = "default_minimum_order_margin_portfolio_percentage")]
    pub minimum_order_margin_portfolio_percentage: f64,
    /// Fraction of portfolio value excluded from target sizing.
    #[serde(default = "default_free_portfolio_value_percentage")]
    pub free_portfolio_value_percentage: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            account_currency: default_account_currency(),
            starting_cash: default_starting_cash(),
            max_orders: default_max_orders(),
            market_on_close_buffer_minutes: default_market_on_close_buffer_minutes(),
            live_mode: false,
            liquidate_enabled: true,
            minimum_order_margin_portfolio_percentage:
                default_minimum_order_margin_portfolio_percentage(),
            free_portfolio_value_percentage: default_free_portfolio_value_percentage(),
        }
    }
}

fn default_account_currency() -> String {
    "USD".to_string()
}

const fn default_starting_cash() -> f64 {
    100_000.0
}

const fn default_max_orders() -> usize {
    10_000
}

const fn default_market_on_close_buffer_minutes() -> f64 {
    15.5
}

const fn default_true() -> bool {
    true
}

const fn default_minimum_order_margin_portfolio_percentage() -> f64 {
    0.001
}

const fn default_free_portfolio_value_percentage() -> f64 {
    0.0025
}
