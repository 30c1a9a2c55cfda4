//! Buying power models.
//!
//! A model answers two questions for one security: can this order be
//! afforded, and how much of a proposed order can be afforded. Models are
//! plain trait objects attached to each security.

use std::fmt;

use rust_decimal::Decimal;

use super::{Security, round_to_lot};

/// Portfolio figures a buying power model needs, all in account currency.
#[derive(Debug, Clone, Copy)]
pub struct BuyingPowerContext<'a> {
    /// Security the order is for.
    pub security: &'a Security,
    /// Quote currency to account currency rate.
    pub quote_conversion_rate: Decimal,
    /// Total portfolio value.
    pub total_portfolio_value: Decimal,
    /// Margin not used by current holdings.
    pub margin_remaining: Decimal,
}

impl BuyingPowerContext<'_> {
    /// Account-currency value of one unit of quantity at the current price.
    #[must_use]
    pub fn unit_value(&self) -> Decimal {
        self.security.price()
            * self.security.properties().contract_multiplier
            * self.quote_conversion_rate
    }

    /// Split a signed order quantity into the part that reduces the current
    /// position and the part that opens new exposure, both unsigned.
    #[must_use]
    pub fn split_quantity(&self, quantity: Decimal) -> (Decimal, Decimal) {
        let holdings = self.security.holdings().quantity();
        let reducing = if holdings * quantity < Decimal::ZERO {
            quantity.abs().min(holdings.abs())
        } else {
            Decimal::ZERO
        };
        (reducing, quantity.abs() - reducing)
    }
}

/// Outcome of a buying power check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyingPowerResult {
    /// Whether the order can be afforded.
    pub is_sufficient: bool,
    /// Explanation when insufficient.
    pub reason: String,
}

impl BuyingPowerResult {
    /// Sufficient buying power.
    #[must_use]
    pub const fn sufficient() -> Self {
        Self {
            is_sufficient: true,
            reason: String::new(),
        }
    }

    /// Insufficient buying power.
    #[must_use]
    pub fn insufficient(reason: impl Into<String>) -> Self {
        Self {
            is_sufficient: false,
            reason: reason.into(),
        }
    }
}

/// Capability interface for margin and buying power.
pub trait BuyingPowerModel: fmt::Debug + Send + Sync {
    /// Leverage allowed on the security.
    fn leverage(&self) -> Decimal;

    /// Margin currently reserved by the holding, in account currency.
    fn maintenance_margin(&self, security: &Security, quote_conversion_rate: Decimal) -> Decimal {
        let leverage = self.leverage();
        if leverage <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        security.holdings_value().abs() * quote_conversion_rate / leverage
    }

    /// Whether a signed order quantity can be afforded.
    fn has_sufficient_buying_power(
        &self,
        context: &BuyingPowerContext<'_>,
        quantity: Decimal,
    ) -> BuyingPowerResult;

    /// Largest lot-aligned part of a proposed signed quantity that can be
    /// afforded. Position-reducing quantity is always allowed.
    fn max_order_quantity(&self, context: &BuyingPowerContext<'_>, proposed: Decimal) -> Decimal;
}

/// Leverage-based margin model.
///
/// Opening exposure requires `value / leverage` of free margin; closing an
/// existing position releases the margin it held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityMarginModel {
    leverage: Decimal,
}

impl SecurityMarginModel {
    /// Model with the given leverage. Non-positive values fall back to 1.
    #[must_use]
    pub fn new(leverage: Decimal) -> Self {
        Self {
            leverage: if leverage > Decimal::ZERO {
                leverage
            } else {
                Decimal::ONE
            },
        }
    }

    /// Unleveraged cash account.
    #[must_use]
    pub fn cash() -> Self {
        Self::new(Decimal::ONE)
    }

    fn available_margin(&self, context: &BuyingPowerContext<'_>, reducing: Decimal) -> Decimal {
        let released = reducing * context.unit_value() / self.leverage;
        (context.margin_remaining + released).max(Decimal::ZERO)
    }
}

impl Default for SecurityMarginModel {
    fn default() -> Self {
        Self::cash()
    }
}

impl BuyingPowerModel for SecurityMarginModel {
    fn leverage(&self) -> Decimal {
        self.leverage
    }

    fn has_sufficient_buying_power(
        &self,
        context: &BuyingPowerContext<'_>,
        quantity: Decimal,
    ) -> BuyingPowerResult {
        let (reducing, opening) = context.split_quantity(quantity);
        if opening.is_zero() {
            return BuyingPowerResult::sufficient();
        }

        let required = opening * context.unit_value() / self.leverage;
        let available = self.available_margin(context, reducing);
        if required <= available {
            BuyingPowerResult::sufficient()
        } else {
            BuyingPowerResult::insufficient(format!(
                "Insufficient buying power to complete order, Initial Margin: {}, Free Margin: {}",
                required.round_dp(2),
                available.round_dp(2)
            ))
        }
    }

    fn max_order_quantity(&self, context: &BuyingPowerContext<'_>, proposed: Decimal) -> Decimal {
        let (reducing, opening) = context.split_quantity(proposed);
        if opening.is_zero() {
            return proposed;
        }

        let unit_value = context.unit_value();
        if unit_value <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let affordable = self.available_margin(context, reducing) * self.leverage / unit_value;
        let lot_size = context.security.properties().lot_size;
        let allowed = round_to_lot(opening.min(affordable), lot_size);

        let magnitude = reducing + allowed;
        if proposed.is_sign_negative() {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Model that never limits orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullBuyingPowerModel;

impl BuyingPowerModel for NullBuyingPowerModel {
    fn leverage(&self) -> Decimal {
        Decimal::ONE
    }

    fn maintenance_margin(&self, _security: &Security, _quote_conversion_rate: Decimal) -> Decimal {
        Decimal::ZERO
    }

    fn has_sufficient_buying_power(
        &self,
        _context: &BuyingPowerContext<'_>,
        _quantity: Decimal,
    ) -> BuyingPowerResult {
        BuyingPowerResult::sufficient()
    }

    fn max_order_quantity(&self, _context: &BuyingPowerContext<'_>, proposed: Decimal) -> Decimal {
        proposed
    }
}
