//! Pre-order checks.
//!
//! Checks run in a fixed order and stop at the first failure. A rejected
//! request never reaches the order book and never receives an order id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::settings::AlgorithmSettings;
use crate::domain::order_execution::{
    OrderResponse, OrderResponseErrorCode, OrderType, SubmitOrderRequest,
};
use crate::domain::portfolio::Portfolio;
use crate::domain::securities::Security;
use crate::domain::shared::OrderId;

/// State the validator reads besides the portfolio.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Run settings.
    pub settings: &'a AlgorithmSettings,
    /// Whether the algorithm is warming up.
    pub is_warming_up: bool,
    /// Orders accepted into the book so far.
    pub orders_count: usize,
    /// Current simulation time.
    pub now: DateTime<Utc>,
}

/// A failed pre-order check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Typed reason.
    pub code: OrderResponseErrorCode,
    /// Human-readable explanation.
    pub message: String,
}

impl Rejection {
    fn new(code: OrderResponseErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Response for a request that never received an id.
    #[must_use]
    pub fn into_response(self) -> OrderResponse {
        OrderResponse::error(OrderId::UNASSIGNED, self.code, self.message)
    }
}

/// Stateless pre-order validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderValidator;

impl OrderValidator {
    /// Run every check against `request`.
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn validate(
        portfolio: &Portfolio,
        context: &ValidationContext<'_>,
        request: &SubmitOrderRequest,
    ) -> Result<(), Rejection> {
        let symbol = request.symbol();

        if context.is_warming_up {
            return Err(Rejection::new(
                OrderResponseErrorCode::WarmingUp,
                "This operation is not allowed during warm up",
            ));
        }

        let Some(security) = portfolio.securities().get(symbol) else {
            return Err(Rejection::new(
                OrderResponseErrorCode::MissingSecurity,
                format!("You haven't requested {symbol} data. Add this with add_security()"),
            ));
        };

        let quantity = request.quantity();
        if quantity.is_zero() {
            return Err(Rejection::new(
                OrderResponseErrorCode::ZeroQuantity,
                "Unable to add order for zero quantity",
            ));
        }

        let lot_size = security.properties().lot_size;
        if quantity.abs() < lot_size {
            return Err(Rejection::new(
                OrderResponseErrorCode::QuantityLessThanLotSize,
                format!(
                    "Unable to place an order for {symbol} with quantity {quantity} below the lot size of {lot_size}"
                ),
            ));
        }

        if !security.is_tradable() {
            return Err(Rejection::new(
                OrderResponseErrorCode::NonTradableSecurity,
                format!("The security with symbol '{symbol}' is marked as non-tradable"),
            ));
        }

        if request.order_type() == OrderType::OptionExercise && !security.is_exchange_open() {
            return Err(Rejection::new(
                OrderResponseErrorCode::ExchangeNotOpen,
                format!("{} order and exchange not open", request.order_type()),
            ));
        }

        if security.price().is_zero() {
            return Err(Rejection::new(
                OrderResponseErrorCode::SecurityPriceZero,
                format!("The security does not have an accurate price as it has not yet received a bar of data. Symbol: {symbol}"),
            ));
        }

        Self::check_currencies(portfolio, security)?;

        if !security.has_data() {
            return Err(Rejection::new(
                OrderResponseErrorCode::SecurityHasNoData,
                format!("There is no data for this symbol yet: {symbol}"),
            ));
        }

        let settings = context.settings;
        if !settings.live_mode() && context.orders_count >= settings.max_orders() {
            return Err(Rejection::new(
                OrderResponseErrorCode::ExceededMaximumOrders,
                format!(
                    "Order count has exceeded the maximum order count of {}",
                    settings.max_orders()
                ),
            ));
        }

        match request.order_type() {
            OrderType::OptionExercise => Self::check_exercise(security, quantity),
            OrderType::MarketOnClose => Self::check_market_on_close(security, context),
            _ => Ok(()),
        }
    }

    fn check_currencies(portfolio: &Portfolio, security: &Security) -> Result<(), Rejection> {
        let cash_book = portfolio.cash_book();
        let quote = security.quote_currency();
        let Some(quote_rate) = cash_book.conversion_rate(quote) else {
            return Err(Rejection::new(
                OrderResponseErrorCode::QuoteCurrencyRequired,
                format!("Quote currency {quote} is not in the cash book"),
            ));
        };
        if quote_rate.is_zero() {
            return Err(Rejection::new(
                OrderResponseErrorCode::ConversionRateZero,
                format!(
                    "{}: requires {quote} to have a non-zero conversion rate",
                    security.symbol()
                ),
            ));
        }

        if !security.symbol().security_type().is_currency_pair() {
            return Ok(());
        }

        let base_rate = security
            .base_currency()
            .and_then(|base| cash_book.conversion_rate(base));
        match base_rate {
            None => Err(Rejection::new(
                OrderResponseErrorCode::ForexBaseAndQuoteCurrenciesRequired,
                format!(
                    "{}: requires both base and quote currencies in the cash book",
                    security.symbol()
                ),
            )),
            Some(rate) if rate.is_zero() => Err(Rejection::new(
                OrderResponseErrorCode::ForexConversionRateZero,
                format!(
                    "{}: requires {} to have a non-zero conversion rate",
                    security.symbol(),
                    security.base_currency().unwrap_or_default()
                ),
            )),
            Some(_) => Ok(()),
        }
    }

    fn check_exercise(security: &Security, quantity: Decimal) -> Result<(), Rejection> {
        if !security.symbol().security_type().is_option() {
            return Err(Rejection::new(
                OrderResponseErrorCode::NonExercisableSecurity,
                format!("The security with symbol '{}' is not exercisable", security.symbol()),
            ));
        }

        let held = security.holdings().quantity();
        if held <= Decimal::ZERO {
            return Err(Rejection::new(
                OrderResponseErrorCode::UnsupportedRequestType,
                format!(
                    "Only long option positions are exercisable; {} holds {held}",
                    security.symbol()
                ),
            ));
        }

        if quantity.abs() > held {
            return Err(Rejection::new(
                OrderResponseErrorCode::UnsupportedRequestType,
                format!(
                    "Cannot exercise {} contracts of {}; only {held} are held",
                    quantity.abs(),
                    security.symbol()
                ),
            ));
        }

        Ok(())
    }

    fn check_market_on_close(
        security: &Security,
        context: &ValidationContext<'_>,
    ) -> Result<(), Rejection> {
        let buffer = context.settings.market_on_close_buffer();
        let too_late = || {
            Rejection::new(
                OrderResponseErrorCode::MarketOnCloseOrderTooLate,
                format!(
                    "Market-on-close orders must be placed while the market is open and at least {} minutes before the close",
                    Decimal::from(buffer.num_seconds()) / Decimal::from(60)
                ),
            )
        };

        if !security.is_exchange_open() {
            return Err(too_late());
        }
        match security.exchange().next_market_close {
            Some(close) if context.now > close - buffer => Err(too_late()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rust_decimal_macros::dec;

    use crate::domain::order_execution::OrderFee;
    use crate::domain::securities::{Bar, Resolution, SymbolProperties};
    use crate::domain::shared::{OptionRight, OptionStyle, SecurityType, Symbol};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn portfolio() -> Portfolio {
        let mut portfolio = Portfolio::new("USD", dec!(100000));
        let spy = portfolio.securities_mut().add(Security::new(
            Symbol::equity("SPY"),
            SymbolProperties::for_security_type(SecurityType::Equity, "USD"),
            Resolution::Minute,
        ));
        spy.update(Bar::flat(now(), dec!(100), dec!(1000)));
        portfolio
    }

    fn validate(portfolio: &Portfolio, request: &SubmitOrderRequest) -> Result<(), Rejection> {
        let settings = AlgorithmSettings::default();
        let context = ValidationContext {
            settings: &settings,
            is_warming_up: false,
            orders_count: 0,
            now: now(),
        };
        OrderValidator::validate(portfolio, &context, request)
    }

    fn code(result: Result<(), Rejection>) -> OrderResponseErrorCode {
        match result {
            Ok(()) => OrderResponseErrorCode::None,
            Err(rejection) => rejection.code,
        }
    }

    #[test]
    fn accepts_valid_market_order() {
        let request = SubmitOrderRequest::market(Symbol::equity("SPY"), dec!(10), now());
        assert!(validate(&portfolio(), &request).is_ok());
    }

    #[test]
    fn warm_up_is_checked_first() {
        let settings = AlgorithmSettings::default();
        let context = ValidationContext {
            settings: &settings,
            is_warming_up: true,
            orders_count: 0,
            now: now(),
        };
        let request = SubmitOrderRequest::market(Symbol::equity("QQQ"), dec!(0), now());
        let result = OrderValidator::validate(&portfolio(), &context, &request);
        assert_eq!(code(result), OrderResponseErrorCode::WarmingUp);
    }

    #[test]
    fn missing_security_before_zero_quantity() {
        let request = SubmitOrderRequest::market(Symbol::equity("QQQ"), dec!(0), now());
        assert_eq!(
            code(validate(&portfolio(), &request)),
            OrderResponseErrorCode::MissingSecurity
        );
    }

    #[test]
    fn order_cap_rejects() {
        let settings = AlgorithmSettings::default();
        let context = ValidationContext {
            settings: &settings,
            is_warming_up: false,
            orders_count: settings.max_orders(),
            now: now(),
        };
        let request = SubmitOrderRequest::market(Symbol::equity("SPY"), dec!(1), now());
        let result = OrderValidator::validate(&portfolio(), &context, &request);
        assert_eq!(code(result), OrderResponseErrorCode::ExceededMaximumOrders);
    }

    #[test]
    fn order_cap_ignored_live() {
        let mut settings = AlgorithmSettings::default();
        settings.set_live_mode(true).unwrap();
        let context = ValidationContext {
            settings: &settings,
            is_warming_up: false,
            orders_count: settings.max_orders() + 1,
            now: now(),
        };
        let request = SubmitOrderRequest::market(Symbol::equity("SPY"), dec!(1), now());
        assert!(OrderValidator::validate(&portfolio(), &context, &request).is_ok());
    }

    #[test]
    fn market_on_close_inside_buffer_is_too_late() {
        let mut portfolio = portfolio();
        let spy = Symbol::equity("SPY");
        if let Some(security) = portfolio.securities_mut().get_mut(&spy) {
            security.set_exchange_state(true, Some(now() + Duration::minutes(10)));
        }
        let request = SubmitOrderRequest::market_on_close(spy.clone(), dec!(1), now());
        assert_eq!(
            code(validate(&portfolio, &request)),
            OrderResponseErrorCode::MarketOnCloseOrderTooLate
        );

        if let Some(security) = portfolio.securities_mut().get_mut(&spy) {
            security.set_exchange_state(true, Some(now() + Duration::minutes(30)));
        }
        assert!(validate(&portfolio, &request).is_ok());
    }

    #[test]
    fn short_option_exercise_rejected() {
        let mut portfolio = portfolio();
        let contract = Symbol::option_contract(
            &Symbol::equity("SPY"),
            OptionRight::Call,
            OptionStyle::American,
            dec!(90),
            NaiveDate::from_ymd_opt(2024, 1, 19).unwrap(),
        );
        let option = portfolio.securities_mut().add(Security::new(
            contract.clone(),
            SymbolProperties::for_security_type(SecurityType::Option, "USD"),
            Resolution::Minute,
        ));
        option.update(Bar::flat(now(), dec!(11), dec!(100)));
        portfolio
            .apply_fill(&contract, dec!(-2), dec!(11), &OrderFee::zero("USD"))
            .unwrap();

        let request = SubmitOrderRequest::option_exercise(contract, dec!(1), now());
        let Err(rejection) = validate(&portfolio, &request) else {
            panic!("short exercise must be rejected");
        };
        assert_eq!(rejection.code, OrderResponseErrorCode::UnsupportedRequestType);
        assert!(rejection.message.contains("long"));
    }

    #[test]
    fn exercise_of_equity_is_rejected() {
        let request = SubmitOrderRequest::option_exercise(Symbol::equity("SPY"), dec!(1), now());
        assert_eq!(
            code(validate(&portfolio(), &request)),
            OrderResponseErrorCode::NonExercisableSecurity
        );
    }

    #[test]
    fn rejection_response_is_unassigned() {
        let response = Rejection::new(OrderResponseErrorCode::ZeroQuantity, "zero").into_response();
        assert_eq!(response.order_id, OrderId::UNASSIGNED);
        assert!(response.is_error());
    }
}
