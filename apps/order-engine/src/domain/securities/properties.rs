//! Static symbol properties and exchange state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::SecurityType;

/// Contract properties of a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolProperties {
    /// Currency prices are quoted in.
    pub quote_currency: String,
    /// Units of the underlying per contract (100 for equity options).
    pub contract_multiplier: Decimal,
    /// Price tick.
    pub minimum_price_variation: Decimal,
    /// Minimum tradable quantity increment.
    pub lot_size: Decimal,
}

impl SymbolProperties {
    /// Default properties for a security type.
    #[must_use]
    pub fn for_security_type(security_type: SecurityType, quote_currency: &str) -> Self {
        let (contract_multiplier, minimum_price_variation, lot_size) = match security_type {
            SecurityType::Option | SecurityType::IndexOption => {
                (Decimal::ONE_HUNDRED, Decimal::new(1, 2), Decimal::ONE)
            }
            SecurityType::Forex => (Decimal::ONE, Decimal::new(1, 5), Decimal::ONE_THOUSAND),
            SecurityType::Crypto => (Decimal::ONE, Decimal::new(1, 2), Decimal::new(1, 8)),
            _ => (Decimal::ONE, Decimal::new(1, 2), Decimal::ONE),
        };
        Self {
            quote_currency: quote_currency.to_string(),
            contract_multiplier,
            minimum_price_variation,
            lot_size,
        }
    }

    /// Override the lot size.
    #[must_use]
    pub const fn with_lot_size(mut self, lot_size: Decimal) -> Self {
        self.lot_size = lot_size;
        self
    }
}

/// Round a quantity toward zero to a multiple of the lot size.
#[must_use]
pub fn round_to_lot(quantity: Decimal, lot_size: Decimal) -> Decimal {
    if lot_size <= Decimal::ZERO {
        return quantity;
    }
    (quantity / lot_size).trunc() * lot_size
}

/// Data resolution of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Tick data.
    Tick,
    /// One-second bars.
    Second,
    /// One-minute bars.
    #[default]
    Minute,
    /// Hourly bars.
    Hour,
    /// Daily bars.
    Daily,
}

/// Exchange hours state as seen by the engine at the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeState {
    /// Whether the exchange is open now.
    pub is_open: bool,
    /// Next regular market close, if known.
    pub next_market_close: Option<DateTime<Utc>>,
}

impl Default for ExchangeState {
    fn default() -> Self {
        Self {
            is_open: true,
            next_market_close: None,
        }
    }
}
