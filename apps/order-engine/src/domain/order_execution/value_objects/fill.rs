//! Fill events and fees.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::domain::shared::OrderId;

/// Fee charged for a fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFee {
    /// Fee amount, non-negative.
    pub amount: Decimal,
    /// Currency the fee is charged in.
    pub currency: String,
}

impl OrderFee {
    /// Fee in the given currency.
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Zero fee.
    #[must_use]
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }
}

/// A status change or fill on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Order id.
    pub order_id: OrderId,
    /// Symbol value of the filled security.
    pub symbol: String,
    /// Event time.
    pub time: DateTime<Utc>,
    /// Ticket status after this event.
    pub status: OrderStatus,
    /// Signed fill quantity (zero for non-fill events).
    pub fill_quantity: Decimal,
    /// Fill price.
    pub fill_price: Decimal,
    /// Fee charged for the fill.
    pub fee: OrderFee,
    /// Free-form message.
    pub message: String,
}

impl OrderEvent {
    /// Whether this event carries a fill.
    #[must_use]
    pub fn is_fill(&self) -> bool {
        !self.fill_quantity.is_zero()
    }
}
