//! Submission and cancellation responses.

use serde::{Deserialize, Serialize};

use crate::domain::shared::OrderId;

/// Typed reason an order request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderResponseErrorCode {
    /// No error.
    None,

    // Pre-order checks, in evaluation order
    /// Orders are not accepted while the algorithm warms up.
    WarmingUp,
    /// Symbol is not subscribed.
    MissingSecurity,
    /// Quantity is zero.
    ZeroQuantity,
    /// Absolute quantity is below one lot.
    QuantityLessThanLotSize,
    /// Security is not tradable (e.g. delisted).
    NonTradableSecurity,
    /// Exchange is closed for an order that requires it open.
    ExchangeNotOpen,
    /// Last price is zero.
    SecurityPriceZero,
    /// Quote currency is missing from the cash book.
    QuoteCurrencyRequired,
    /// Quote currency conversion rate is zero.
    ConversionRateZero,
    /// Forex or crypto base currency is missing.
    ForexBaseAndQuoteCurrenciesRequired,
    /// Forex or crypto base currency conversion rate is zero.
    ForexConversionRateZero,
    /// Security has not received any data.
    SecurityHasNoData,
    /// Backtest order cap reached.
    ExceededMaximumOrders,
    /// Exercise requested on a non-option security.
    NonExercisableSecurity,
    /// Request not supported in the current position state.
    UnsupportedRequestType,
    /// Market-on-close submitted inside the close buffer or while closed.
    MarketOnCloseOrderTooLate,

    // Order book errors
    /// Buying power model refused the order.
    InsufficientBuyingPower,
    /// No ticket with the requested id.
    UnableToFindOrder,
    /// Ticket status does not allow the request.
    InvalidOrderStatus,
    /// Algorithm stopped accepting orders.
    AlgorithmStopped,
}

impl OrderResponseErrorCode {
    /// Error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::WarmingUp => "WARMING_UP",
            Self::MissingSecurity => "MISSING_SECURITY",
            Self::ZeroQuantity => "ZERO_QUANTITY",
            Self::QuantityLessThanLotSize => "QUANTITY_LESS_THAN_LOT_SIZE",
            Self::NonTradableSecurity => "NON_TRADABLE_SECURITY",
            Self::ExchangeNotOpen => "EXCHANGE_NOT_OPEN",
            Self::SecurityPriceZero => "SECURITY_PRICE_ZERO",
            Self::QuoteCurrencyRequired => "QUOTE_CURRENCY_REQUIRED",
            Self::ConversionRateZero => "CONVERSION_RATE_ZERO",
            Self::ForexBaseAndQuoteCurrenciesRequired => "FOREX_BASE_AND_QUOTE_CURRENCIES_REQUIRED",
            Self::ForexConversionRateZero => "FOREX_CONVERSION_RATE_ZERO",
            Self::SecurityHasNoData => "SECURITY_HAS_NO_DATA",
            Self::ExceededMaximumOrders => "EXCEEDED_MAXIMUM_ORDERS",
            Self::NonExercisableSecurity => "NON_EXERCISABLE_SECURITY",
            Self::UnsupportedRequestType => "UNSUPPORTED_REQUEST_TYPE",
            Self::MarketOnCloseOrderTooLate => "MARKET_ON_CLOSE_ORDER_TOO_LATE",
            Self::InsufficientBuyingPower => "INSUFFICIENT_BUYING_POWER",
            Self::UnableToFindOrder => "UNABLE_TO_FIND_ORDER",
            Self::InvalidOrderStatus => "INVALID_ORDER_STATUS",
            Self::AlgorithmStopped => "ALGORITHM_STOPPED",
        }
    }
}

impl std::fmt::Display for OrderResponseErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Outcome of a submit or cancel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    /// Order the response refers to.
    pub order_id: OrderId,
    /// Error code, `None` on success.
    pub error_code: OrderResponseErrorCode,
    /// Human-readable error message, empty on success.
    pub error_message: String,
}

impl OrderResponse {
    /// Successful response.
    #[must_use]
    pub const fn success(order_id: OrderId) -> Self {
        Self {
            order_id,
            error_code: OrderResponseErrorCode::None,
            error_message: String::new(),
        }
    }

    /// Error response.
    #[must_use]
    pub fn error(
        order_id: OrderId,
        error_code: OrderResponseErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            error_code,
            error_message: message.into(),
        }
    }

    /// Whether the request succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_code == OrderResponseErrorCode::None
    }

    /// Whether the request failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }
}
