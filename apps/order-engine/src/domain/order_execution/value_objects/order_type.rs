//! Order types and direction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported order types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Fill immediately at the current price.
    Market,
    /// Fill at the limit price or better.
    Limit,
    /// Becomes a market order once the stop price is touched.
    StopMarket,
    /// Becomes a limit order once the stop price is touched.
    StopLimit,
    /// Fill at the next exchange open.
    MarketOnOpen,
    /// Fill at the exchange close.
    MarketOnClose,
    /// Exercise a long option position.
    OptionExercise,
    /// Becomes a limit order once the trigger price is touched.
    LimitIfTouched,
}

impl OrderType {
    /// Types that fill at market price without a price condition.
    #[must_use]
    pub const fn is_market_like(self) -> bool {
        matches!(self, Self::Market | Self::MarketOnOpen)
    }

    /// Whether the order carries a limit price.
    #[must_use]
    pub const fn requires_limit_price(self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit | Self::LimitIfTouched)
    }

    /// Whether the order carries a stop price.
    #[must_use]
    pub const fn requires_stop_price(self) -> bool {
        matches!(self, Self::StopMarket | Self::StopLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
            Self::StopMarket => "STOP_MARKET",
            Self::StopLimit => "STOP_LIMIT",
            Self::MarketOnOpen => "MARKET_ON_OPEN",
            Self::MarketOnClose => "MARKET_ON_CLOSE",
            Self::OptionExercise => "OPTION_EXERCISE",
            Self::LimitIfTouched => "LIMIT_IF_TOUCHED",
        };
        write!(f, "{s}")
    }
}

/// Direction implied by the sign of an order quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderDirection {
    /// Positive quantity.
    Buy,
    /// Negative quantity.
    Sell,
    /// Zero quantity.
    Hold,
}

impl OrderDirection {
    /// Direction for a signed quantity.
    #[must_use]
    pub fn from_quantity(quantity: Decimal) -> Self {
        if quantity > Decimal::ZERO {
            Self::Buy
        } else if quantity < Decimal::ZERO {
            Self::Sell
        } else {
            Self::Hold
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}
