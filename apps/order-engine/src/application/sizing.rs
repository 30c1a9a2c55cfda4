//! Target resolution: percentage of portfolio value to order quantity.

use rust_decimal::Decimal;
use tracing::warn;

use super::settings::AlgorithmSettings;
use crate::domain::portfolio::Portfolio;
use crate::domain::securities::round_to_lot;
use crate::domain::shared::Symbol;

/// Signed quantity to order so holdings move to `target_percent` of the
/// unleveraged portfolio value.
///
/// The result is a delta from current holdings and from `pending_quantity`,
/// the unfilled quantity of open market and market-on-open orders. It is
/// rounded toward zero to the lot size and capped by the security's buying
/// power model. Deltas worth less than the minimum order margin resolve to
/// zero.
#[must_use]
pub fn calculate_order_quantity(
    portfolio: &Portfolio,
    settings: &AlgorithmSettings,
    symbol: &Symbol,
    target_percent: Decimal,
    pending_quantity: Decimal,
) -> Decimal {
    let Some(context) = portfolio.buying_power_context(symbol) else {
        warn!(symbol = %symbol, "Cannot size an order for a security that is not subscribed");
        return Decimal::ZERO;
    };

    let security = context.security;
    if security.price().is_zero() {
        warn!(symbol = %symbol, "The order quantity cannot be calculated: the price is zero");
        return Decimal::ZERO;
    }
    let unit_value = context.unit_value();
    if unit_value.is_zero() {
        warn!(
            symbol = %symbol,
            currency = %security.quote_currency(),
            "The order quantity cannot be calculated: the conversion rate is zero"
        );
        return Decimal::ZERO;
    }

    let total_portfolio_value = context.total_portfolio_value;
    let usable = total_portfolio_value * (Decimal::ONE - settings.free_portfolio_value_percentage());
    let target_value = target_percent * usable;

    let lot_size = security.properties().lot_size;
    let target_quantity = round_to_lot(target_value / unit_value, lot_size);
    let delta = round_to_lot(
        target_quantity - security.holdings().quantity() - pending_quantity,
        lot_size,
    );
    if delta.is_zero() {
        return Decimal::ZERO;
    }

    let quantity = security
        .buying_power_model()
        .max_order_quantity(&context, delta);

    let minimum_value = settings.minimum_order_margin_portfolio_percentage() * total_portfolio_value;
    if (quantity * unit_value).abs() < minimum_value {
        return Decimal::ZERO;
    }
    quantity
}
