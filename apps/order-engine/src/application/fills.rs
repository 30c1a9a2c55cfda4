//! Order fill simulation against price bars.
//!
//! Quantities are signed: positive buys, negative sells. Every simulation
//! returns a [`FillResult`] for the ticket's remaining quantity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::order_execution::{OrderTicket, OrderType};
use crate::domain::securities::{Bar, round_to_lot};

/// Result of order fill simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillResult {
    /// Whether any quantity filled.
    pub filled: bool,
    /// Fill price (if filled).
    pub price: Option<Decimal>,
    /// Signed filled quantity.
    pub filled_quantity: Decimal,
    /// Signed quantity still open.
    pub remaining_quantity: Decimal,
    /// Whether this was a partial fill.
    pub is_partial: bool,
    /// Fill reason/notes.
    pub reason: String,
}

impl FillResult {
    /// Create a "no fill" result.
    #[must_use]
    pub fn no_fill(remaining: Decimal, reason: &str) -> Self {
        Self {
            filled: false,
            price: None,
            filled_quantity: Decimal::ZERO,
            remaining_quantity: remaining,
            is_partial: false,
            reason: reason.to_string(),
        }
    }

    /// Create a full fill result.
    #[must_use]
    pub fn full_fill(price: Decimal, quantity: Decimal, reason: &str) -> Self {
        Self {
            filled: true,
            price: Some(price),
            filled_quantity: quantity,
            remaining_quantity: Decimal::ZERO,
            is_partial: false,
            reason: reason.to_string(),
        }
    }

    /// Create a partial fill result.
    #[must_use]
    pub fn partial_fill(
        price: Decimal,
        filled_quantity: Decimal,
        remaining_quantity: Decimal,
        reason: &str,
    ) -> Self {
        Self {
            filled: true,
            price: Some(price),
            filled_quantity,
            remaining_quantity,
            is_partial: true,
            reason: reason.to_string(),
        }
    }
}

/// Volume limits applied to every fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillLimits {
    /// Maximum fraction of bar volume per fill, `None` for unlimited.
    pub volume_fraction: Option<Decimal>,
    /// Lot size partial fills are rounded to.
    pub lot_size: Decimal,
}

impl FillLimits {
    /// Unlimited fills for a lot size.
    #[must_use]
    pub const fn unlimited(lot_size: Decimal) -> Self {
        Self {
            volume_fraction: None,
            lot_size,
        }
    }
}

/// Outcome of scanning one ticket against one bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarFill {
    /// Fill simulation result.
    pub result: FillResult,
    /// Whether the stop or trigger price was touched on this bar.
    pub triggered: bool,
}

/// Simulate a market order fill at the last traded price.
#[must_use]
pub fn simulate_market_order(
    remaining: Decimal,
    price: Decimal,
    bar: Option<&Bar>,
    limits: &FillLimits,
) -> FillResult {
    if let Some(fill) = bar.and_then(|bar| try_partial_fill(price, remaining, bar, limits)) {
        return fill;
    }
    FillResult::full_fill(price, remaining, "Market order filled at last price")
}

/// Simulate a market-on-open fill.
///
/// Fills at the open of the first bar after submission while the exchange
/// is open.
#[must_use]
pub fn simulate_market_on_open_order(
    remaining: Decimal,
    submitted_at: DateTime<Utc>,
    bar: &Bar,
    exchange_open: bool,
) -> FillResult {
    if !exchange_open || bar.time <= submitted_at {
        return FillResult::no_fill(remaining, "Waiting for the market open");
    }
    FillResult::full_fill(bar.open, remaining, "Market-on-open filled at the open")
}

/// Simulate a limit order fill.
///
/// Buys fill at the limit when the bar trades at or below it; sells when
/// the bar trades at or above it.
#[must_use]
pub fn simulate_limit_order(
    remaining: Decimal,
    limit_price: Decimal,
    bar: &Bar,
    limits: &FillLimits,
) -> FillResult {
    let reached = if remaining.is_sign_positive() {
        bar.price_went_below(limit_price)
    } else {
        bar.price_went_above(limit_price)
    };

    if !reached {
        return FillResult::no_fill(remaining, "Price did not reach limit level");
    }
    if let Some(fill) = try_partial_fill(limit_price, remaining, bar, limits) {
        return fill;
    }
    FillResult::full_fill(limit_price, remaining, "Limit order filled at limit price")
}

/// Simulate a stop-market order fill.
///
/// Buy stops trigger when price rises to the stop, sell stops when it falls
/// to the stop; the order then fills at the stop price.
#[must_use]
pub fn simulate_stop_market_order(
    remaining: Decimal,
    stop_price: Decimal,
    bar: &Bar,
    limits: &FillLimits,
) -> FillResult {
    if !stop_reached(remaining, stop_price, bar) {
        return FillResult::no_fill(remaining, "Stop price not reached");
    }
    if let Some(fill) = try_partial_fill(stop_price, remaining, bar, limits) {
        return fill;
    }
    FillResult::full_fill(stop_price, remaining, "Stop order triggered and filled")
}

/// Simulate a stop-limit order fill.
///
/// Once the stop has been reached the order behaves as a limit order, on the
/// same bar and on every later bar.
#[must_use]
pub fn simulate_stop_limit_order(
    remaining: Decimal,
    stop_price: Decimal,
    limit_price: Decimal,
    already_triggered: bool,
    bar: &Bar,
    limits: &FillLimits,
) -> BarFill {
    let triggered = already_triggered || stop_reached(remaining, stop_price, bar);
    let result = if triggered {
        simulate_limit_order(remaining, limit_price, bar, limits)
    } else {
        FillResult::no_fill(remaining, "Stop price not reached")
    };
    BarFill { result, triggered }
}

/// Simulate a limit-if-touched order fill.
///
/// Buys trigger when price falls to the trigger, sells when it rises to it;
/// after that the order behaves as a limit order.
#[must_use]
pub fn simulate_limit_if_touched_order(
    remaining: Decimal,
    trigger_price: Decimal,
    limit_price: Decimal,
    already_triggered: bool,
    bar: &Bar,
    limits: &FillLimits,
) -> BarFill {
    let touched = if remaining.is_sign_positive() {
        bar.price_went_below(trigger_price)
    } else {
        bar.price_went_above(trigger_price)
    };
    let triggered = already_triggered || touched;
    let result = if triggered {
        simulate_limit_order(remaining, limit_price, bar, limits)
    } else {
        FillResult::no_fill(remaining, "Trigger price not touched")
    };
    BarFill { result, triggered }
}

/// Simulate an open ticket against a new bar.
///
/// Market-on-close and exercise orders never fill on a bar; they are
/// handled at the close and on submission respectively.
#[must_use]
pub fn simulate_order(
    ticket: &OrderTicket,
    bar: &Bar,
    exchange_open: bool,
    limits: &FillLimits,
) -> BarFill {
    let request = ticket.request();
    let remaining = ticket.quantity_remaining();
    let untriggered = |result| BarFill {
        result,
        triggered: false,
    };

    match request.order_type() {
        OrderType::Market => {
            if exchange_open {
                untriggered(simulate_market_order(remaining, bar.close, Some(bar), limits))
            } else {
                untriggered(FillResult::no_fill(remaining, "Exchange closed"))
            }
        }
        OrderType::MarketOnOpen => untriggered(simulate_market_on_open_order(
            remaining,
            request.time(),
            bar,
            exchange_open,
        )),
        OrderType::Limit => {
            let limit = request.limit_price().unwrap_or(bar.close);
            untriggered(simulate_limit_order(remaining, limit, bar, limits))
        }
        OrderType::StopMarket => {
            let stop = request.stop_price().unwrap_or(bar.close);
            untriggered(simulate_stop_market_order(remaining, stop, bar, limits))
        }
        OrderType::StopLimit => {
            let stop = request.stop_price().unwrap_or(bar.close);
            let limit = request.limit_price().unwrap_or(stop);
            simulate_stop_limit_order(remaining, stop, limit, ticket.is_triggered(), bar, limits)
        }
        OrderType::LimitIfTouched => {
            let trigger = request.trigger_price().unwrap_or(bar.close);
            let limit = request.limit_price().unwrap_or(trigger);
            simulate_limit_if_touched_order(
                remaining,
                trigger,
                limit,
                ticket.is_triggered(),
                bar,
                limits,
            )
        }
        OrderType::MarketOnClose => {
            untriggered(FillResult::no_fill(remaining, "Fills at the market close"))
        }
        OrderType::OptionExercise => {
            untriggered(FillResult::no_fill(remaining, "Exercise is processed on submission"))
        }
    }
}

fn stop_reached(remaining: Decimal, stop_price: Decimal, bar: &Bar) -> bool {
    if remaining.is_sign_positive() {
        bar.price_went_above(stop_price)
    } else {
        bar.price_went_below(stop_price)
    }
}

/// Try to apply the volume limit.
///
/// Returns `Some` if a partial fill occurred, `None` if the full remaining
/// quantity can fill.
fn try_partial_fill(
    price: Decimal,
    remaining: Decimal,
    bar: &Bar,
    limits: &FillLimits,
) -> Option<FillResult> {
    let fraction = limits.volume_fraction?;
    let max_fillable = round_to_lot(bar.volume * fraction, limits.lot_size);
    if max_fillable <= Decimal::ZERO || remaining.abs() <= max_fillable {
        return None;
    }

    let filled = if remaining.is_sign_negative() {
        -max_fillable
    } else {
        max_fillable
    };
    Some(FillResult::partial_fill(
        price,
        filled,
        remaining - filled,
        "Volume-limited partial fill",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::domain::order_execution::SubmitOrderRequest;
    use crate::domain::shared::{OrderId, Symbol};

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap()
    }

    fn bar(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Bar {
        Bar::new(at(60), open, high, low, close, dec!(1000))
    }

    fn unlimited() -> FillLimits {
        FillLimits::unlimited(Decimal::ONE)
    }

    #[test]
    fn market_fills_at_last_price() {
        let result = simulate_market_order(dec!(10), dec!(101), None, &unlimited());
        assert!(result.filled);
        assert_eq!(result.price, Some(dec!(101)));
        assert_eq!(result.filled_quantity, dec!(10));
    }

    #[test]
    fn volume_limit_splits_market_fill() {
        let limits = FillLimits {
            volume_fraction: Some(dec!(0.01)),
            lot_size: Decimal::ONE,
        };
        let candle = bar(dec!(100), dec!(101), dec!(99), dec!(100));
        let result = simulate_market_order(dec!(-25), dec!(100), Some(&candle), &limits);
        assert!(result.is_partial);
        assert_eq!(result.filled_quantity, dec!(-10));
        assert_eq!(result.remaining_quantity, dec!(-15));
    }

    #[test]
    fn buy_limit_fills_when_low_touches() {
        let candle = bar(dec!(102), dec!(103), dec!(99), dec!(101));
        let result = simulate_limit_order(dec!(5), dec!(100), &candle, &unlimited());
        assert_eq!(result.price, Some(dec!(100)));

        let result = simulate_limit_order(dec!(5), dec!(98), &candle, &unlimited());
        assert!(!result.filled);
    }

    #[test]
    fn sell_limit_needs_high() {
        let candle = bar(dec!(100), dec!(101), dec!(99), dec!(100));
        assert!(!simulate_limit_order(dec!(-5), dec!(102), &candle, &unlimited()).filled);
        assert!(simulate_limit_order(dec!(-5), dec!(101), &candle, &unlimited()).filled);
    }

    #[test]
    fn sell_stop_triggers_on_low() {
        let candle = bar(dec!(100), dec!(101), dec!(94), dec!(95));
        let result = simulate_stop_market_order(dec!(-5), dec!(95), &candle, &unlimited());
        assert_eq!(result.price, Some(dec!(95)));
        assert_eq!(result.filled_quantity, dec!(-5));
    }

    #[test]
    fn stop_limit_stays_triggered() {
        let first = bar(dec!(100), dec!(106), dec!(104), dec!(105));
        let fill = simulate_stop_limit_order(dec!(5), dec!(105), dec!(103), false, &first, &unlimited());
        assert!(fill.triggered);
        assert!(!fill.result.filled);

        let second = bar(dec!(104), dec!(104), dec!(102), dec!(103));
        let fill = simulate_stop_limit_order(dec!(5), dec!(105), dec!(103), true, &second, &unlimited());
        assert_eq!(fill.result.price, Some(dec!(103)));
    }

    #[test]
    fn limit_if_touched_buy() {
        let candle = bar(dec!(100), dec!(100), dec!(97), dec!(98));
        let fill =
            simulate_limit_if_touched_order(dec!(1), dec!(97), dec!(99), false, &candle, &unlimited());
        assert!(fill.triggered);
        assert_eq!(fill.result.price, Some(dec!(99)));
    }

    #[test]
    fn market_on_open_waits_for_next_bar() {
        let candle = bar(dec!(100), dec!(101), dec!(99), dec!(100));
        assert!(!simulate_market_on_open_order(dec!(1), at(60), &candle, true).filled);
        assert!(!simulate_market_on_open_order(dec!(1), at(0), &candle, false).filled);
        let result = simulate_market_on_open_order(dec!(1), at(0), &candle, true);
        assert_eq!(result.price, Some(dec!(100)));
    }

    #[test]
    fn dispatch_uses_ticket_prices() {
        let request = SubmitOrderRequest::limit(Symbol::equity("SPY"), dec!(3), dec!(99.5), at(0));
        let mut ticket = OrderTicket::new(OrderId::new(1), request);
        ticket.submit().unwrap();
        let candle = bar(dec!(100), dec!(101), dec!(99), dec!(100));
        let fill = simulate_order(&ticket, &candle, true, &unlimited());
        assert_eq!(fill.result.price, Some(dec!(99.5)));
        assert_eq!(fill.result.filled_quantity, dec!(3));
    }
}
