//! Strategy and leg definitions.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::order_execution::OrderType;
use crate::domain::shared::{OptionRight, Symbol};

/// One option leg of a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionLegData {
    /// Call or put.
    pub right: OptionRight,
    /// Strike price.
    pub strike: Decimal,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Signed contracts per unit of strategy quantity.
    pub quantity: i64,
    /// Order type used for the leg.
    pub order_type: OrderType,
    /// Limit price for limit legs.
    pub order_price: Option<Decimal>,
}

impl OptionLegData {
    /// Market leg.
    #[must_use]
    pub const fn market(right: OptionRight, strike: Decimal, expiration: NaiveDate, quantity: i64) -> Self {
        Self {
            right,
            strike,
            expiration,
            quantity,
            order_type: OrderType::Market,
            order_price: None,
        }
    }

    /// Same leg placed as a limit order.
    #[must_use]
    pub fn with_limit_price(mut self, price: Decimal) -> Self {
        self.order_type = OrderType::Limit;
        self.order_price = Some(price);
        self
    }
}

/// One underlying leg of a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnderlyingLegData {
    /// Signed contract multiples of the underlying per unit of strategy quantity.
    pub quantity: i64,
    /// Order type used for the leg.
    pub order_type: OrderType,
    /// Limit price for limit legs.
    pub order_price: Option<Decimal>,
}

impl UnderlyingLegData {
    /// Market leg.
    #[must_use]
    pub const fn market(quantity: i64) -> Self {
        Self {
            quantity,
            order_type: OrderType::Market,
            order_price: None,
        }
    }

    /// Same leg placed as a limit order.
    #[must_use]
    pub fn with_limit_price(mut self, price: Decimal) -> Self {
        self.order_type = OrderType::Limit;
        self.order_price = Some(price);
        self
    }
}

/// A named multi-leg option strategy on one canonical chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionStrategy {
    /// Display name, used in order tags.
    pub name: String,
    /// Canonical option symbol of the chain.
    pub canonical_option: Symbol,
    /// Option legs.
    pub option_legs: Vec<OptionLegData>,
    /// Underlying legs.
    pub underlying_legs: Vec<UnderlyingLegData>,
}

impl OptionStrategy {
    /// Underlying symbol of the chain.
    #[must_use]
    pub fn underlying(&self) -> Option<&Symbol> {
        self.canonical_option.underlying()
    }

    /// Number of legs.
    #[must_use]
    pub fn leg_count(&self) -> usize {
        self.option_legs.len() + self.underlying_legs.len()
    }
}
