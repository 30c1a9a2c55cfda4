//! Order ticket: the mutable handle tracking one request through its lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::errors::OrderError;
use super::request::SubmitOrderRequest;
use super::services::OrderStateMachine;
use super::value_objects::{OrderEvent, OrderFee, OrderResponse, OrderStatus, OrderType};
use crate::domain::shared::{OrderId, Symbol};

/// Ticket wrapping an immutable request.
///
/// Invariants:
/// - `quantity_filled` has the sign of the request quantity and never
///   exceeds it in magnitude
/// - `average_fill_price` is the quantity-weighted mean of all fill prices
/// - once the status is terminal no further transition is accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTicket {
    id: OrderId,
    request: SubmitOrderRequest,
    status: OrderStatus,
    quantity_filled: Decimal,
    average_fill_price: Decimal,
    events: Vec<OrderEvent>,
    submit_response: OrderResponse,
    cancel_response: Option<OrderResponse>,
    triggered: bool,
    last_update: DateTime<Utc>,
}

impl OrderTicket {
    /// New ticket for a request accepted into the order book.
    #[must_use]
    pub fn new(id: OrderId, request: SubmitOrderRequest) -> Self {
        let last_update = request.time();
        Self {
            id,
            request,
            status: OrderStatus::New,
            quantity_filled: Decimal::ZERO,
            average_fill_price: Decimal::ZERO,
            events: Vec::new(),
            submit_response: OrderResponse::success(id),
            cancel_response: None,
            triggered: false,
            last_update,
        }
    }

    /// Ticket for a request that was rejected before reaching the order book.
    #[must_use]
    pub fn rejected(request: SubmitOrderRequest, response: OrderResponse) -> Self {
        let mut ticket = Self::new(response.order_id, request);
        ticket.status = OrderStatus::Invalid;
        ticket.submit_response = response;
        ticket
    }

    /// Accept the ticket into the order book.
    ///
    /// # Errors
    ///
    /// Returns error if the ticket is not `New`.
    pub fn submit(&mut self) -> Result<(), OrderError> {
        OrderStateMachine::check(self.id, self.status, OrderStatus::Submitted)?;
        self.status = OrderStatus::Submitted;
        Ok(())
    }

    /// Mark the ticket invalid with the response explaining why.
    ///
    /// # Errors
    ///
    /// Returns error if the ticket already has fills or is terminal.
    pub fn invalidate(&mut self, response: OrderResponse) -> Result<(), OrderError> {
        OrderStateMachine::check(self.id, self.status, OrderStatus::Invalid)?;
        self.status = OrderStatus::Invalid;
        self.submit_response = response;
        Ok(())
    }

    /// Apply a fill and return the resulting event.
    ///
    /// `quantity` is signed like the request.
    ///
    /// # Errors
    ///
    /// Returns error if the ticket cannot fill or the fill exceeds the
    /// remaining quantity.
    pub fn fill(
        &mut self,
        quantity: Decimal,
        price: Decimal,
        fee: OrderFee,
        time: DateTime<Utc>,
    ) -> Result<OrderEvent, OrderError> {
        if !self.status.is_open() {
            return Err(OrderError::NotFillable {
                order_id: self.id,
                status: self.status,
            });
        }

        let remaining = self.quantity_remaining();
        if quantity.is_zero()
            || quantity.is_sign_negative() != remaining.is_sign_negative()
            || quantity.abs() > remaining.abs()
        {
            return Err(OrderError::Overfill {
                order_id: self.id,
                quantity,
                remaining,
            });
        }

        let new_filled = self.quantity_filled + quantity;
        let next = if new_filled == self.request.quantity() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        OrderStateMachine::check(self.id, self.status, next)?;

        let prior_value = self.quantity_filled.abs() * self.average_fill_price;
        self.average_fill_price = (prior_value + quantity.abs() * price) / new_filled.abs();
        self.quantity_filled = new_filled;
        self.status = next;
        self.last_update = time;

        let event = OrderEvent {
            order_id: self.id,
            symbol: self.request.symbol().value().to_string(),
            time,
            status: next,
            fill_quantity: quantity,
            fill_price: price,
            fee,
            message: String::new(),
        };
        self.events.push(event.clone());
        Ok(event)
    }

    /// Cancel the ticket.
    ///
    /// # Errors
    ///
    /// Returns error if the ticket is not open.
    pub fn cancel(&mut self, time: DateTime<Utc>, tag: &str) -> Result<OrderEvent, OrderError> {
        OrderStateMachine::check(self.id, self.status, OrderStatus::Canceled)?;
        self.status = OrderStatus::Canceled;
        self.last_update = time;
        self.cancel_response = Some(OrderResponse::success(self.id));

        let event = OrderEvent {
            order_id: self.id,
            symbol: self.request.symbol().value().to_string(),
            time,
            status: OrderStatus::Canceled,
            fill_quantity: Decimal::ZERO,
            fill_price: Decimal::ZERO,
            fee: OrderFee::zero(""),
            message: tag.to_string(),
        };
        self.events.push(event.clone());
        Ok(event)
    }

    /// Record that the stop or trigger price was touched.
    pub const fn mark_triggered(&mut self) {
        self.triggered = true;
    }

    /// Order id.
    #[must_use]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    /// Underlying request.
    #[must_use]
    pub const fn request(&self) -> &SubmitOrderRequest {
        &self.request
    }

    /// Symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        self.request.symbol()
    }

    /// Order type actually routed.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.request.order_type()
    }

    /// Requested signed quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.request.quantity()
    }

    /// Filled signed quantity.
    #[must_use]
    pub const fn quantity_filled(&self) -> Decimal {
        self.quantity_filled
    }

    /// Unfilled signed quantity.
    #[must_use]
    pub fn quantity_remaining(&self) -> Decimal {
        self.request.quantity() - self.quantity_filled
    }

    /// Average fill price.
    #[must_use]
    pub const fn average_fill_price(&self) -> Decimal {
        self.average_fill_price
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Events in the order they occurred.
    #[must_use]
    pub fn events(&self) -> &[OrderEvent] {
        &self.events
    }

    /// Response to the submit request.
    #[must_use]
    pub const fn submit_response(&self) -> &OrderResponse {
        &self.submit_response
    }

    /// Response to the cancel request, if any.
    #[must_use]
    pub const fn cancel_response(&self) -> Option<&OrderResponse> {
        self.cancel_response.as_ref()
    }

    /// Tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.request.tag()
    }

    /// Whether the stop or trigger price has been touched.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Time of the last status change.
    #[must_use]
    pub const fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }
}
