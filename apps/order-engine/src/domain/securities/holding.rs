//! Position held in a single security.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Signed position with average cost and realized profit.
///
/// Values are in the security's quote currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityHolding {
    quantity: Decimal,
    average_price: Decimal,
    market_price: Decimal,
    total_fees: Decimal,
    realized_profit: Decimal,
}

impl SecurityHolding {
    /// Signed quantity (positive long, negative short).
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Average entry price of the open position.
    #[must_use]
    pub const fn average_price(&self) -> Decimal {
        self.average_price
    }

    /// Last known market price.
    #[must_use]
    pub const fn market_price(&self) -> Decimal {
        self.market_price
    }

    /// Fees paid over the life of the holding, in account currency.
    #[must_use]
    pub const fn total_fees(&self) -> Decimal {
        self.total_fees
    }

    /// Profit realized by closing trades.
    #[must_use]
    pub const fn realized_profit(&self) -> Decimal {
        self.realized_profit
    }

    /// Whether there is a non-zero position.
    #[must_use]
    pub fn invested(&self) -> bool {
        !self.quantity.is_zero()
    }

    /// Whether the position is long.
    #[must_use]
    pub fn is_long(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    /// Whether the position is short.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.quantity < Decimal::ZERO
    }

    /// Signed market value.
    #[must_use]
    pub fn holdings_value(&self, contract_multiplier: Decimal) -> Decimal {
        self.quantity * self.market_price * contract_multiplier
    }

    /// Unrealized profit at the last market price.
    #[must_use]
    pub fn unrealized_profit(&self, contract_multiplier: Decimal) -> Decimal {
        (self.market_price - self.average_price) * self.quantity * contract_multiplier
    }

    /// Update the mark price.
    pub const fn update_market_price(&mut self, price: Decimal) {
        self.market_price = price;
    }

    /// Record a fee paid in account currency.
    pub fn add_fee(&mut self, fee: Decimal) {
        self.total_fees += fee;
    }

    /// Apply a signed fill and return the profit it realized.
    pub fn apply_fill(
        &mut self,
        quantity: Decimal,
        price: Decimal,
        contract_multiplier: Decimal,
    ) -> Decimal {
        let old_qty = self.quantity;
        let new_qty = old_qty + quantity;
        let mut realized = Decimal::ZERO;

        // Closing trades realize P&L against the average entry
        if (old_qty > Decimal::ZERO && quantity < Decimal::ZERO)
            || (old_qty < Decimal::ZERO && quantity > Decimal::ZERO)
        {
            let closed_qty = quantity.abs().min(old_qty.abs());
            let signum = if old_qty > Decimal::ZERO {
                Decimal::ONE
            } else {
                -Decimal::ONE
            };
            realized = (price - self.average_price) * closed_qty * signum * contract_multiplier;
            self.realized_profit += realized;
        }

        if (old_qty >= Decimal::ZERO && quantity > Decimal::ZERO)
            || (old_qty <= Decimal::ZERO && quantity < Decimal::ZERO)
        {
            // Increasing position
            let old_value = old_qty.abs() * self.average_price;
            let new_value = quantity.abs() * price;
            let total_qty = old_qty.abs() + quantity.abs();
            if total_qty > Decimal::ZERO {
                self.average_price = (old_value + new_value) / total_qty;
            }
        } else if new_qty.is_zero() {
            self.average_price = Decimal::ZERO;
        } else if new_qty.is_sign_negative() != old_qty.is_sign_negative() {
            // Reversed through zero: the remainder opens at the fill price
            self.average_price = price;
        }

        self.quantity = new_qty;
        if self.market_price.is_zero() {
            self.market_price = price;
        }
        realized
    }
}
