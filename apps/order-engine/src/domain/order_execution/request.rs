//! Immutable order submission request.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::value_objects::{OrderDirection, OrderProperties, OrderType};
use crate::domain::shared::Symbol;

/// A request to place an order.
///
/// Built with the typed constructors and `with_*` methods, then handed to the
/// order router. The router never mutates a request; conversions such as
/// market to market-on-open produce a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOrderRequest {
    order_type: OrderType,
    symbol: Symbol,
    quantity: Decimal,
    stop_price: Option<Decimal>,
    limit_price: Option<Decimal>,
    trigger_price: Option<Decimal>,
    tag: String,
    time: DateTime<Utc>,
    properties: OrderProperties,
    asynchronous: bool,
}

impl SubmitOrderRequest {
    /// Request of any type without price fields.
    #[must_use]
    pub fn new(order_type: OrderType, symbol: Symbol, quantity: Decimal, time: DateTime<Utc>) -> Self {
        Self {
            order_type,
            symbol,
            quantity,
            stop_price: None,
            limit_price: None,
            trigger_price: None,
            tag: String::new(),
            time,
            properties: OrderProperties::default(),
            asynchronous: false,
        }
    }

    /// Market order.
    #[must_use]
    pub fn market(symbol: Symbol, quantity: Decimal, time: DateTime<Utc>) -> Self {
        Self::new(OrderType::Market, symbol, quantity, time)
    }

    /// Market-on-open order.
    #[must_use]
    pub fn market_on_open(symbol: Symbol, quantity: Decimal, time: DateTime<Utc>) -> Self {
        Self::new(OrderType::MarketOnOpen, symbol, quantity, time)
    }

    /// Market-on-close order.
    #[must_use]
    pub fn market_on_close(symbol: Symbol, quantity: Decimal, time: DateTime<Utc>) -> Self {
        Self::new(OrderType::MarketOnClose, symbol, quantity, time)
    }

    /// Limit order.
    #[must_use]
    pub fn limit(symbol: Symbol, quantity: Decimal, limit_price: Decimal, time: DateTime<Utc>) -> Self {
        Self {
            limit_price: Some(limit_price),
            ..Self::new(OrderType::Limit, symbol, quantity, time)
        }
    }

    /// Stop-market order.
    #[must_use]
    pub fn stop_market(symbol: Symbol, quantity: Decimal, stop_price: Decimal, time: DateTime<Utc>) -> Self {
        Self {
            stop_price: Some(stop_price),
            ..Self::new(OrderType::StopMarket, symbol, quantity, time)
        }
    }

    /// Stop-limit order.
    #[must_use]
    pub fn stop_limit(
        symbol: Symbol,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            stop_price: Some(stop_price),
            limit_price: Some(limit_price),
            ..Self::new(OrderType::StopLimit, symbol, quantity, time)
        }
    }

    /// Limit-if-touched order.
    #[must_use]
    pub fn limit_if_touched(
        symbol: Symbol,
        quantity: Decimal,
        trigger_price: Decimal,
        limit_price: Decimal,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            trigger_price: Some(trigger_price),
            limit_price: Some(limit_price),
            ..Self::new(OrderType::LimitIfTouched, symbol, quantity, time)
        }
    }

    /// Option exercise request.
    ///
    /// Exercising decreases option holdings, so the quantity is always
    /// stored negative whatever sign the caller passes.
    #[must_use]
    pub fn option_exercise(symbol: Symbol, quantity: Decimal, time: DateTime<Utc>) -> Self {
        Self::new(OrderType::OptionExercise, symbol, -quantity.abs(), time)
    }

    /// Set the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set order properties.
    #[must_use]
    pub fn with_properties(mut self, properties: OrderProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Return immediately after submission instead of waiting for a fill.
    #[must_use]
    pub const fn with_asynchronous(mut self, asynchronous: bool) -> Self {
        self.asynchronous = asynchronous;
        self
    }

    /// Same request with a different quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    /// Same request rerouted as another order type.
    #[must_use]
    pub fn rerouted_as(&self, order_type: OrderType) -> Self {
        Self {
            order_type,
            ..self.clone()
        }
    }

    /// Order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Signed quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Direction implied by the quantity sign.
    #[must_use]
    pub fn direction(&self) -> OrderDirection {
        OrderDirection::from_quantity(self.quantity)
    }

    /// Stop price.
    #[must_use]
    pub const fn stop_price(&self) -> Option<Decimal> {
        self.stop_price
    }

    /// Limit price.
    #[must_use]
    pub const fn limit_price(&self) -> Option<Decimal> {
        self.limit_price
    }

    /// Trigger price.
    #[must_use]
    pub const fn trigger_price(&self) -> Option<Decimal> {
        self.trigger_price
    }

    /// Tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Creation time.
    #[must_use]
    pub const fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Order properties.
    #[must_use]
    pub const fn properties(&self) -> &OrderProperties {
        &self.properties
    }

    /// Whether the caller asked not to wait for a fill.
    #[must_use]
    pub const fn is_asynchronous(&self) -> bool {
        self.asynchronous
    }
}
