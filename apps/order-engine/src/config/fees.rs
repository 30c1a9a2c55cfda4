//! Commission configuration.

use serde::{Deserialize, Serialize};

/// Fee model applied to newly added securities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeModelKind {
    /// No commissions.
    Zero,
    /// Per-share and per-contract commissions with a minimum.
    #[default]
    PerUnit,
}

/// Commission configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeesConfig {
    /// Model kind.
    #[serde(default)]
    pub model: FeeModelKind,
    /// Commission per equity share.
    #[serde(default = "default_per_share")]
    pub per_share: f64,
    /// Commission per option contract.
    #[serde(default = "default_per_contract")]
    pub per_contract: f64,
    /// Minimum commission per order.
    #[serde(default = "default_minimum")]
    pub minimum: f64,
    /// Regulatory fee per dollar of equity sales.
    #[serde(default = "default_sec_fee_per_dollar")]
    pub sec_fee_per_dollar: f64,
}

impl Default for FeesConfig {
    fn default() -> Self {
        Self {
            model: FeeModelKind::default(),
            per_share: default_per_share(),
            per_contract: default_per_contract(),
            minimum: default_minimum(),
            sec_fee_per_dollar: default_sec_fee_per_dollar(),
        }
    }
}

const fn default_per_share() -> f64 {
    0.005
}

const fn default_per_contract() -> f64 {
    0.65
}

const fn default_minimum() -> f64 {
    1.0
}

const fn default_sec_fee_per_dollar() -> f64 {
    0.000_027_8
}
