//! OHLCV price bar.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar time.
    pub time: DateTime<Utc>,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Volume.
    pub volume: Decimal,
}

impl Bar {
    /// Create a new bar.
    #[must_use]
    pub const fn new(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar where every price equals `price`.
    #[must_use]
    pub const fn flat(time: DateTime<Utc>, price: Decimal, volume: Decimal) -> Self {
        Self::new(time, price, price, price, price, volume)
    }

    /// The low traded at or under `price`.
    #[must_use]
    pub fn price_went_below(&self, price: Decimal) -> bool {
        self.low <= price
    }

    /// The high traded at or over `price`.
    #[must_use]
    pub fn price_went_above(&self, price: Decimal) -> bool {
        self.high >= price
    }
}
