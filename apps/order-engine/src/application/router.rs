//! Order router.
//!
//! Owns every ticket accepted into the order book. Submission validates
//! the request, rounds it to the lot size, reroutes market orders to the
//! open when the exchange is closed, checks buying power and fills
//! synchronous market orders immediately. Resting orders fill when new bars
//! arrive or the exchange closes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use super::fills::{FillLimits, FillResult, simulate_market_order, simulate_order};
use super::settings::AlgorithmSettings;
use super::validator::{OrderValidator, ValidationContext};
use crate::domain::order_execution::{
    OrderFee, OrderResponse, OrderResponseErrorCode, OrderTicket, OrderType, SubmitOrderRequest,
    TimeInForce,
};
use crate::domain::portfolio::Portfolio;
use crate::domain::securities::{Resolution, round_to_lot};
use crate::domain::shared::{OptionDetails, OptionRight, OrderId, SecurityType, Symbol};
use crate::error::EngineError;

/// Per-call state the router needs from the algorithm.
#[derive(Debug, Clone, Copy)]
pub struct SubmitContext<'a> {
    /// Run settings.
    pub settings: &'a AlgorithmSettings,
    /// Whether the algorithm is warming up.
    pub is_warming_up: bool,
    /// Current simulation time.
    pub now: DateTime<Utc>,
}

/// Transaction handler owning the order book.
#[derive(Debug, Default)]
pub struct OrderRouter {
    tickets: BTreeMap<OrderId, OrderTicket>,
    last_id: u64,
    daily_market_on_open_warned: bool,
}

impl OrderRouter {
    /// Empty order book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a request and return a snapshot of its ticket.
    ///
    /// Rejected requests come back as `Invalid` tickets with an unassigned
    /// id and are not stored.
    pub fn submit(
        &mut self,
        portfolio: &mut Portfolio,
        context: &SubmitContext<'_>,
        request: SubmitOrderRequest,
    ) -> OrderTicket {
        let validation = ValidationContext {
            settings: context.settings,
            is_warming_up: context.is_warming_up,
            orders_count: self.orders_count(),
            now: context.now,
        };
        if let Err(rejection) = OrderValidator::validate(portfolio, &validation, &request) {
            warn!(
                symbol = %request.symbol(),
                order_type = %request.order_type(),
                quantity = %request.quantity(),
                code = %rejection.code,
                message = %rejection.message,
                "Order rejected"
            );
            return OrderTicket::rejected(request, rejection.into_response());
        }

        let Some(security) = portfolio.securities().get(request.symbol()) else {
            return OrderTicket::rejected(
                request,
                OrderResponse::error(
                    OrderId::UNASSIGNED,
                    OrderResponseErrorCode::MissingSecurity,
                    "Security removed during submission",
                ),
            );
        };
        let lot_size = security.properties().lot_size;
        let exchange_open = security.is_exchange_open();
        let resolution = security.resolution();

        let request = Self::round_to_lot(request, lot_size);
        let request = if request.order_type() == OrderType::Market && !exchange_open {
            self.convert_to_market_on_open(request, resolution)
        } else {
            request
        };

        self.last_id += 1;
        let id = OrderId::new(self.last_id);
        let mut ticket = OrderTicket::new(id, request);

        if let Some(reason) = Self::insufficient_buying_power(portfolio, &ticket) {
            let response = OrderResponse::error(
                id,
                OrderResponseErrorCode::InsufficientBuyingPower,
                format!("Order Error: id: {id}, {reason}"),
            );
            warn!(order_id = %id, symbol = %ticket.symbol(), reason = %reason, "Insufficient buying power");
            if let Err(err) = ticket.invalidate(response) {
                error!(order_id = %id, error = %err, "Failed to invalidate order");
            }
            self.tickets.insert(id, ticket.clone());
            return ticket;
        }

        if let Err(err) = ticket.submit() {
            error!(order_id = %id, error = %err, "Failed to submit order");
        }
        info!(
            order_id = %id,
            symbol = %ticket.symbol(),
            order_type = %ticket.order_type(),
            quantity = %ticket.quantity(),
            tag = %ticket.tag(),
            "Order submitted"
        );

        match ticket.order_type() {
            OrderType::Market if !ticket.request().is_asynchronous() => {
                Self::fill_market(portfolio, &mut ticket, context.settings, context.now);
            }
            OrderType::OptionExercise => Self::exercise(portfolio, &mut ticket, context.now),
            _ => {}
        }

        self.tickets.insert(id, ticket.clone());
        ticket
    }

    /// Cancel an open ticket.
    pub fn cancel(&mut self, id: OrderId, now: DateTime<Utc>, tag: &str) -> OrderResponse {
        let Some(ticket) = self.tickets.get_mut(&id) else {
            warn!(order_id = %id, "Cancel requested for unknown order");
            return OrderResponse::error(
                id,
                OrderResponseErrorCode::UnableToFindOrder,
                format!("Unable to locate order with id {id}"),
            );
        };

        match ticket.cancel(now, tag) {
            Ok(_) => {
                info!(order_id = %id, symbol = %ticket.symbol(), tag = %tag, "Order canceled");
                OrderResponse::success(id)
            }
            Err(err) => {
                warn!(order_id = %id, status = %ticket.status(), error = %err, "Cancel rejected");
                OrderResponse::error(
                    id,
                    OrderResponseErrorCode::InvalidOrderStatus,
                    format!(
                        "Unable to cancel order with id {id} and status {}",
                        ticket.status()
                    ),
                )
            }
        }
    }

    /// Fill open tickets for `symbol` against its latest bar.
    pub fn scan(
        &mut self,
        portfolio: &mut Portfolio,
        settings: &AlgorithmSettings,
        symbol: &Symbol,
        now: DateTime<Utc>,
    ) {
        let Some(security) = portfolio.securities().get(symbol) else {
            return;
        };
        let Some(bar) = security.last_bar().cloned() else {
            return;
        };
        let exchange_open = security.is_exchange_open();
        let limits = FillLimits {
            volume_fraction: settings.partial_fill_volume_fraction(),
            lot_size: security.properties().lot_size,
        };
        let fill_time = bar.time.max(now);

        for id in self.open_ticket_ids(Some(symbol)) {
            let Some(ticket) = self.tickets.get_mut(&id) else {
                continue;
            };
            let fill = simulate_order(ticket, &bar, exchange_open, &limits);
            if fill.triggered && !ticket.is_triggered() {
                debug!(order_id = %id, "Order triggered");
                ticket.mark_triggered();
            }
            Self::apply_result(portfolio, ticket, &fill.result, fill_time);
        }
    }

    /// Fill market-on-close tickets and expire day orders for `symbol`.
    pub fn on_exchange_close(
        &mut self,
        portfolio: &mut Portfolio,
        symbol: &Symbol,
        now: DateTime<Utc>,
    ) {
        let price = portfolio
            .securities()
            .get(symbol)
            .map_or(Decimal::ZERO, |security| security.price());

        for id in self.open_ticket_ids(Some(symbol)) {
            let Some(ticket) = self.tickets.get_mut(&id) else {
                continue;
            };
            if ticket.order_type() == OrderType::MarketOnClose && !price.is_zero() {
                let result = FillResult::full_fill(
                    price,
                    ticket.quantity_remaining(),
                    "Market-on-close filled at the close",
                );
                Self::apply_result(portfolio, ticket, &result, now);
            }
            if ticket.status().is_open()
                && ticket.request().properties().time_in_force == TimeInForce::Day
            {
                match ticket.cancel(now, "Day order expired at market close") {
                    Ok(_) => info!(order_id = %id, symbol = %symbol, "Day order expired"),
                    Err(err) => error!(order_id = %id, error = %err, "Failed to expire order"),
                }
            }
        }
    }

    /// Ticket by id.
    #[must_use]
    pub fn ticket(&self, id: OrderId) -> Option<&OrderTicket> {
        self.tickets.get(&id)
    }

    /// All tickets in id order.
    pub fn tickets(&self) -> impl Iterator<Item = &OrderTicket> {
        self.tickets.values()
    }

    /// Open tickets, optionally for one symbol.
    pub fn open_tickets<'a>(
        &'a self,
        symbol: Option<&'a Symbol>,
    ) -> impl Iterator<Item = &'a OrderTicket> + 'a {
        self.tickets.values().filter(move |ticket| {
            ticket.status().is_open() && symbol.is_none_or(|symbol| ticket.symbol() == symbol)
        })
    }

    /// Ids of open tickets, optionally for one symbol.
    #[must_use]
    pub fn open_ticket_ids(&self, symbol: Option<&Symbol>) -> Vec<OrderId> {
        self.open_tickets(symbol).map(OrderTicket::id).collect()
    }

    /// Unfilled quantity of open market and market-on-open orders.
    #[must_use]
    pub fn unfilled_market_quantity(&self, symbol: &Symbol) -> Decimal {
        self.open_tickets(Some(symbol))
            .filter(|ticket| ticket.order_type().is_market_like())
            .map(OrderTicket::quantity_remaining)
            .sum()
    }

    /// Orders accepted into the book, including those invalidated for
    /// buying power.
    #[must_use]
    pub fn orders_count(&self) -> usize {
        self.tickets.len()
    }

    fn round_to_lot(request: SubmitOrderRequest, lot_size: Decimal) -> SubmitOrderRequest {
        let rounded = round_to_lot(request.quantity(), lot_size);
        if rounded == request.quantity() {
            return request;
        }
        warn!(
            symbol = %request.symbol(),
            requested = %request.quantity(),
            rounded = %rounded,
            lot_size = %lot_size,
            "Order quantity rounded to the lot size"
        );
        request.with_quantity(rounded)
    }

    fn convert_to_market_on_open(
        &mut self,
        request: SubmitOrderRequest,
        resolution: Resolution,
    ) -> SubmitOrderRequest {
        if resolution == Resolution::Daily && !self.daily_market_on_open_warned {
            self.daily_market_on_open_warned = true;
            warn!(
                symbol = %request.symbol(),
                "Market orders on daily data are submitted while the exchange is closed; \
                 they are converted to market-on-open orders"
            );
        } else {
            debug!(symbol = %request.symbol(), "Exchange closed, converting market order to market-on-open");
        }
        request.rerouted_as(OrderType::MarketOnOpen)
    }

    fn insufficient_buying_power(portfolio: &Portfolio, ticket: &OrderTicket) -> Option<String> {
        if ticket.order_type() == OrderType::OptionExercise {
            return None;
        }
        let context = portfolio.buying_power_context(ticket.symbol())?;
        let result = context
            .security
            .buying_power_model()
            .has_sufficient_buying_power(&context, ticket.quantity());
        (!result.is_sufficient).then_some(result.reason)
    }

    fn fill_market(
        portfolio: &mut Portfolio,
        ticket: &mut OrderTicket,
        settings: &AlgorithmSettings,
        now: DateTime<Utc>,
    ) {
        let Some(security) = portfolio.securities().get(ticket.symbol()) else {
            return;
        };
        let limits = FillLimits {
            volume_fraction: settings.partial_fill_volume_fraction(),
            lot_size: security.properties().lot_size,
        };
        let result = simulate_market_order(
            ticket.quantity_remaining(),
            security.price(),
            security.last_bar(),
            &limits,
        );
        Self::apply_result(portfolio, ticket, &result, now);
    }

    fn apply_result(
        portfolio: &mut Portfolio,
        ticket: &mut OrderTicket,
        result: &FillResult,
        time: DateTime<Utc>,
    ) {
        let Some(price) = result.price.filter(|_| result.filled) else {
            return;
        };
        if let Err(err) = Self::apply_fill(portfolio, ticket, result.filled_quantity, price, None, time)
        {
            error!(order_id = %ticket.id(), error = %err, "Failed to apply fill");
        }
    }

    fn apply_fill(
        portfolio: &mut Portfolio,
        ticket: &mut OrderTicket,
        quantity: Decimal,
        price: Decimal,
        fee: Option<OrderFee>,
        time: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let symbol = ticket.symbol().clone();
        let Some(security) = portfolio.securities().get_any(&symbol) else {
            return Err(EngineError::UnknownSecurity(symbol.to_string()));
        };
        let fee =
            fee.unwrap_or_else(|| security.fee_model().order_fee(security, quantity, price));

        let event = ticket.fill(quantity, price, fee.clone(), time)?;
        portfolio.apply_fill(&symbol, quantity, price, &fee)?;

        info!(
            order_id = %event.order_id,
            symbol = %symbol,
            status = %event.status,
            fill_quantity = %quantity,
            fill_price = %price,
            fee = %fee.amount,
            "Order filled"
        );
        Ok(())
    }

    fn exercise(portfolio: &mut Portfolio, ticket: &mut OrderTicket, now: DateTime<Utc>) {
        let symbol = ticket.symbol().clone();
        let quantity = ticket.quantity();
        let Some(details) = symbol.option_details().copied() else {
            error!(symbol = %symbol, "Exercise requested for a symbol without contract terms");
            if let Err(err) = ticket.cancel(now, "Exercise failed") {
                error!(order_id = %ticket.id(), error = %err, "Failed to cancel exercise");
            }
            return;
        };
        let Some(option) = portfolio.securities().get(&symbol) else {
            return;
        };
        let multiplier = option.properties().contract_multiplier;
        let option_price = option.price();
        let no_fee = OrderFee::zero(option.quote_currency());

        let underlying = symbol
            .underlying()
            .and_then(|underlying| portfolio.securities().get(underlying))
            .map(|security| (security.symbol().clone(), security.price()));

        let result = match underlying {
            Some((underlying, _)) if underlying.security_type() != SecurityType::Index => {
                let delivered = quantity.abs()
                    * multiplier
                    * match details.right {
                        OptionRight::Call => Decimal::ONE,
                        OptionRight::Put => Decimal::NEGATIVE_ONE,
                    };
                Self::apply_fill(portfolio, ticket, quantity, Decimal::ZERO, Some(no_fee.clone()), now)
                    .and_then(|()| {
                        portfolio
                            .apply_fill(&underlying, delivered, details.strike, &no_fee)
                            .map(|_realized| ())
                            .map_err(EngineError::from)
                    })
                    .map(|()| {
                        info!(
                            order_id = %ticket.id(),
                            underlying = %underlying,
                            delivered = %delivered,
                            strike = %details.strike,
                            "Option exercised with physical delivery"
                        );
                    })
            }
            underlying => {
                let settlement = underlying
                    .map(|(_, price)| price)
                    .filter(|price| !price.is_zero())
                    .map_or(option_price, |price| intrinsic_value(&details, price));
                Self::apply_fill(portfolio, ticket, quantity, settlement, Some(no_fee), now).map(
                    |()| {
                        info!(
                            order_id = %ticket.id(),
                            settlement = %settlement,
                            "Option exercised with cash settlement"
                        );
                    },
                )
            }
        };

        if let Err(err) = result {
            error!(order_id = %ticket.id(), error = %err, "Failed to exercise option");
        }
    }
}

/// Intrinsic value of one unit of an option at an underlying price.
#[must_use]
pub fn intrinsic_value(details: &OptionDetails, underlying_price: Decimal) -> Decimal {
    let value = match details.right {
        OptionRight::Call => underlying_price - details.strike,
        OptionRight::Put => details.strike - underlying_price,
    };
    value.max(Decimal::ZERO)
}
