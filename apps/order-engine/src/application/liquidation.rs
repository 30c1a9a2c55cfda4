//! Liquidation of holdings.

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::router::{OrderRouter, SubmitContext};
use crate::domain::order_execution::{
    OrderResponseErrorCode, OrderTicket, OrderType, SubmitOrderRequest,
};
use crate::domain::portfolio::Portfolio;
use crate::domain::shared::{OrderId, Symbol};

/// Close the positions in `symbols`.
///
/// For each symbol, open orders other than market and market-on-open are
/// canceled, and one closing market order is submitted for the holdings
/// not already covered by pending market orders. A lone open market order
/// that already closes the position is left alone.
///
/// Returns every closing ticket, rejected ones included. The pass ends at
/// the first `ExceededMaximumOrders` rejection. Returns nothing when
/// liquidation is disabled.
pub fn liquidate(
    router: &mut OrderRouter,
    portfolio: &mut Portfolio,
    context: &SubmitContext<'_>,
    symbols: &[Symbol],
    tag: &str,
) -> Vec<OrderTicket> {
    if !context.settings.liquidate_enabled() {
        debug!("Liquidation is disabled");
        return Vec::new();
    }

    let mut tickets = Vec::new();
    for symbol in symbols {
        let holdings = portfolio.quantity(symbol);
        let open: Vec<(OrderId, OrderType, Decimal)> = router
            .open_tickets(Some(symbol))
            .map(|ticket| (ticket.id(), ticket.order_type(), ticket.quantity_remaining()))
            .collect();

        if let [(_, OrderType::Market, remaining)] = open.as_slice() {
            if *remaining == -holdings {
                debug!(symbol = %symbol, "Closing market order already open");
                continue;
            }
        }

        let mut pending = Decimal::ZERO;
        for (id, order_type, remaining) in open {
            if order_type.is_market_like() {
                pending += remaining;
            } else {
                router.cancel(id, context.now, tag);
            }
        }

        if holdings.is_zero() {
            continue;
        }
        let quantity = -holdings - pending;
        if quantity.is_zero() {
            continue;
        }

        let ticket = router.submit(
            portfolio,
            context,
            SubmitOrderRequest::market(symbol.clone(), quantity, context.now).with_tag(tag),
        );
        info!(
            symbol = %symbol,
            order_id = %ticket.id(),
            quantity = %quantity,
            status = %ticket.status(),
            "Liquidation order submitted"
        );
        let capped =
            ticket.submit_response().error_code == OrderResponseErrorCode::ExceededMaximumOrders;
        tickets.push(ticket);
        if capped {
            break;
        }
    }
    tickets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    use crate::application::settings::AlgorithmSettings;
    use crate::domain::order_execution::{OrderFee, OrderStatus};
    use crate::domain::securities::{Bar, Resolution, Security, SymbolProperties};
    use crate::domain::shared::SecurityType;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn spy() -> Symbol {
        Symbol::equity("SPY")
    }

    fn portfolio(holdings: Decimal) -> Portfolio {
        let mut portfolio = Portfolio::new("USD", dec!(100000));
        let security = portfolio.securities_mut().add(Security::new(
            spy(),
            SymbolProperties::for_security_type(SecurityType::Equity, "USD"),
            Resolution::Minute,
        ));
        security.update(Bar::flat(now(), dec!(100), dec!(100000)));
        if !holdings.is_zero() {
            portfolio
                .apply_fill(&spy(), holdings, dec!(100), &OrderFee::zero("USD"))
                .unwrap();
        }
        portfolio
    }

    fn context(settings: &AlgorithmSettings) -> SubmitContext<'_> {
        SubmitContext {
            settings,
            is_warming_up: false,
            now: now(),
        }
    }

    #[test]
    fn flat_portfolio_returns_nothing() {
        let settings = AlgorithmSettings::default();
        let mut router = OrderRouter::new();
        let mut portfolio = portfolio(Decimal::ZERO);
        let tickets =
            liquidate(&mut router, &mut portfolio, &context(&settings), &[spy()], "Liquidate");
        assert!(tickets.is_empty());
        assert_eq!(router.orders_count(), 0);
    }

    #[test]
    fn closes_long_position() {
        let settings = AlgorithmSettings::default();
        let mut router = OrderRouter::new();
        let mut portfolio = portfolio(dec!(50));
        let tickets =
            liquidate(&mut router, &mut portfolio, &context(&settings), &[spy()], "Liquidate");
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].status(), OrderStatus::Filled);
        assert_eq!(portfolio.quantity(&spy()), Decimal::ZERO);
        assert_eq!(router.ticket(tickets[0].id()).map(OrderTicket::tag), Some("Liquidate"));
    }

    #[test]
    fn cancels_resting_orders() {
        let settings = AlgorithmSettings::default();
        let mut router = OrderRouter::new();
        let mut portfolio = portfolio(dec!(50));
        let limit = router.submit(
            &mut portfolio,
            &context(&settings),
            SubmitOrderRequest::limit(spy(), dec!(10), dec!(90), now()),
        );

        liquidate(&mut router, &mut portfolio, &context(&settings), &[spy()], "Liquidate");
        assert_eq!(
            router.ticket(limit.id()).map(OrderTicket::status),
            Some(OrderStatus::Canceled)
        );
    }

    #[test]
    fn disabled_does_nothing() {
        let mut settings = AlgorithmSettings::default();
        settings.set_liquidate_enabled(false).unwrap();
        let mut router = OrderRouter::new();
        let mut portfolio = portfolio(dec!(50));
        let tickets =
            liquidate(&mut router, &mut portfolio, &context(&settings), &[spy()], "Liquidate");
        assert!(tickets.is_empty());
        assert_eq!(portfolio.quantity(&spy()), dec!(50));
    }

    #[test]
    fn pending_market_on_open_is_netted() {
        let settings = AlgorithmSettings::default();
        let mut router = OrderRouter::new();
        let mut portfolio = portfolio(dec!(50));
        if let Some(security) = portfolio.securities_mut().get_mut(&spy()) {
            security.set_exchange_state(false, None);
        }
        router.submit(
            &mut portfolio,
            &context(&settings),
            SubmitOrderRequest::market(spy(), dec!(-20), now()),
        );
        router.submit(
            &mut portfolio,
            &context(&settings),
            SubmitOrderRequest::limit(spy(), dec!(5), dec!(90), now()),
        );

        let tickets =
            liquidate(&mut router, &mut portfolio, &context(&settings), &[spy()], "Liquidate");
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].order_type(), OrderType::MarketOnOpen);
        assert_eq!(tickets[0].status(), OrderStatus::Submitted);
        assert_eq!(router.unfilled_market_quantity(&spy()), dec!(-50));
    }

    #[test]
    fn order_cap_rejection_is_returned() {
        let mut settings = AlgorithmSettings::default();
        settings.set_max_orders(1).unwrap();
        let mut router = OrderRouter::new();
        let mut portfolio = portfolio(dec!(50));
        router.submit(
            &mut portfolio,
            &context(&settings),
            SubmitOrderRequest::limit(spy(), dec!(5), dec!(90), now()),
        );

        let tickets =
            liquidate(&mut router, &mut portfolio, &context(&settings), &[spy()], "Liquidate");
        assert_eq!(tickets.len(), 1);
        assert_eq!(
            tickets[0].submit_response().error_code,
            OrderResponseErrorCode::ExceededMaximumOrders
        );
        assert_eq!(portfolio.quantity(&spy()), dec!(50));
    }
}
