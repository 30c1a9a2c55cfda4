//! Algorithm facade.
//!
//! The single owner of the portfolio, the order book and the settings. The
//! order methods mirror what a strategy calls; the driver methods advance
//! the simulated timeline.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use tracing::{error, info, warn};

use super::liquidation;
use super::router::{OrderRouter, SubmitContext};
use super::settings::AlgorithmSettings;
use super::sizing;
use super::strategy_orders::build_strategy_orders;
use crate::config::{Config, FeeModelKind};
use crate::domain::option_strategies::OptionStrategy;
use crate::domain::order_execution::{
    OrderProperties, OrderResponse, OrderResponseErrorCode, OrderStatus, OrderTicket,
    SubmitOrderRequest,
};
use crate::domain::portfolio::{Portfolio, PortfolioTarget};
use crate::domain::securities::{
    Bar, FeeModel, PerUnitFeeModel, Resolution, Security, SymbolProperties,
};
use crate::domain::shared::{OrderId, SecurityType, Symbol};
use crate::error::EngineError;

/// Quote currencies recognized as crypto pair suffixes, longest first.
const CRYPTO_QUOTE_CURRENCIES: [&str; 8] = ["USDT", "USDC", "BUSD", "USD", "EUR", "GBP", "BTC", "ETH"];

/// Run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlgorithmStatus {
    /// Accepting orders.
    #[default]
    Running,
    /// Stopped after reaching the order cap.
    Stopped,
    /// Stopped by a fatal error.
    RuntimeError,
}

impl std::fmt::Display for AlgorithmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Stopped => write!(f, "STOPPED"),
            Self::RuntimeError => write!(f, "RUNTIME_ERROR"),
        }
    }
}

/// Order-execution and rebalancing engine for one algorithm.
#[derive(Debug)]
pub struct Algorithm {
    portfolio: Portfolio,
    settings: AlgorithmSettings,
    router: OrderRouter,
    status: AlgorithmStatus,
    time: DateTime<Utc>,
    warming_up: bool,
    default_order_properties: OrderProperties,
    default_fee_model: Option<Arc<dyn FeeModel>>,
    pending_removals: BTreeSet<Symbol>,
}

impl Algorithm {
    /// Engine with `starting_cash` in `account_currency` and commission-free
    /// securities.
    #[must_use]
    pub fn new(
        settings: AlgorithmSettings,
        account_currency: impl Into<String>,
        starting_cash: impl Into<Decimal>,
    ) -> Self {
        Self {
            portfolio: Portfolio::new(account_currency, starting_cash.into()),
            settings,
            router: OrderRouter::new(),
            status: AlgorithmStatus::Running,
            time: DateTime::<Utc>::default(),
            warming_up: false,
            default_order_properties: OrderProperties::default(),
            default_fee_model: None,
            pending_removals: BTreeSet::new(),
        }
    }

    /// Engine built from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a configured number cannot be represented as a decimal.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let engine = &config.engine;
        let mut settings = AlgorithmSettings::default();
        settings.set_max_orders(engine.max_orders)?;
        let buffer_millis = to_decimal(
            "market_on_close_buffer_minutes",
            engine.market_on_close_buffer_minutes,
        )? * Decimal::from(60_000);
        settings.set_market_on_close_buffer(Duration::milliseconds(
            buffer_millis.round().to_i64().unwrap_or_default(),
        ))?;
        settings.set_live_mode(engine.live_mode)?;
        settings.set_liquidate_enabled(engine.liquidate_enabled)?;
        settings.set_minimum_order_margin_portfolio_percentage(to_decimal(
            "minimum_order_margin_portfolio_percentage",
            engine.minimum_order_margin_portfolio_percentage,
        )?)?;
        settings.set_free_portfolio_value_percentage(to_decimal(
            "free_portfolio_value_percentage",
            engine.free_portfolio_value_percentage,
        )?)?;
        settings.set_partial_fill_volume_fraction(
            config
                .fills
                .partial_fill_volume_fraction
                .map(|fraction| to_decimal("partial_fill_volume_fraction", fraction))
                .transpose()?,
        )?;

        let starting_cash = to_decimal("starting_cash", engine.starting_cash)?;
        let mut algorithm = Self::new(settings, engine.account_currency.clone(), starting_cash);

        if config.fees.model == FeeModelKind::PerUnit {
            let fees = &config.fees;
            algorithm.set_default_fee_model(Arc::new(PerUnitFeeModel {
                per_share: to_decimal("fees.per_share", fees.per_share)?,
                per_contract: to_decimal("fees.per_contract", fees.per_contract)?,
                minimum: to_decimal("fees.minimum", fees.minimum)?,
                sec_fee_per_dollar: to_decimal("fees.sec_fee_per_dollar", fees.sec_fee_per_dollar)?,
            }));
        }

        Ok(algorithm)
    }

    // ============================================
    // Orders
    // ============================================

    /// Buy the absolute `quantity` at market.
    pub fn buy(&mut self, symbol: &Symbol, quantity: impl Into<Decimal>) -> OrderTicket {
        self.market_order(symbol, quantity.into().abs(), false, "")
    }

    /// Sell the absolute `quantity` at market.
    pub fn sell(&mut self, symbol: &Symbol, quantity: impl Into<Decimal>) -> OrderTicket {
        self.market_order(symbol, -quantity.into().abs(), false, "")
    }

    /// Signed market order.
    pub fn order(&mut self, symbol: &Symbol, quantity: impl Into<Decimal>) -> OrderTicket {
        self.market_order(symbol, quantity, false, "")
    }

    /// Market order. Synchronous orders fill before returning when the
    /// exchange is open.
    pub fn market_order(
        &mut self,
        symbol: &Symbol,
        quantity: impl Into<Decimal>,
        asynchronous: bool,
        tag: &str,
    ) -> OrderTicket {
        let request = SubmitOrderRequest::market(symbol.clone(), quantity.into(), self.time)
            .with_asynchronous(asynchronous);
        self.submit_tagged(request, tag)
    }

    /// Market-on-open order.
    pub fn market_on_open_order(
        &mut self,
        symbol: &Symbol,
        quantity: impl Into<Decimal>,
        tag: &str,
    ) -> OrderTicket {
        let request = SubmitOrderRequest::market_on_open(symbol.clone(), quantity.into(), self.time);
        self.submit_tagged(request, tag)
    }

    /// Market-on-close order.
    pub fn market_on_close_order(
        &mut self,
        symbol: &Symbol,
        quantity: impl Into<Decimal>,
        tag: &str,
    ) -> OrderTicket {
        let request = SubmitOrderRequest::market_on_close(symbol.clone(), quantity.into(), self.time);
        self.submit_tagged(request, tag)
    }

    /// Limit order.
    pub fn limit_order(
        &mut self,
        symbol: &Symbol,
        quantity: impl Into<Decimal>,
        limit_price: impl Into<Decimal>,
        tag: &str,
    ) -> OrderTicket {
        let request = SubmitOrderRequest::limit(
            symbol.clone(),
            quantity.into(),
            limit_price.into(),
            self.time,
        );
        self.submit_tagged(request, tag)
    }

    /// Stop-market order.
    pub fn stop_market_order(
        &mut self,
        symbol: &Symbol,
        quantity: impl Into<Decimal>,
        stop_price: impl Into<Decimal>,
        tag: &str,
    ) -> OrderTicket {
        let request = SubmitOrderRequest::stop_market(
            symbol.clone(),
            quantity.into(),
            stop_price.into(),
            self.time,
        );
        self.submit_tagged(request, tag)
    }

    /// Stop-limit order.
    pub fn stop_limit_order(
        &mut self,
        symbol: &Symbol,
        quantity: impl Into<Decimal>,
        stop_price: impl Into<Decimal>,
        limit_price: impl Into<Decimal>,
        tag: &str,
    ) -> OrderTicket {
        let request = SubmitOrderRequest::stop_limit(
            symbol.clone(),
            quantity.into(),
            stop_price.into(),
            limit_price.into(),
            self.time,
        );
        self.submit_tagged(request, tag)
    }

    /// Limit-if-touched order.
    pub fn limit_if_touched_order(
        &mut self,
        symbol: &Symbol,
        quantity: impl Into<Decimal>,
        trigger_price: impl Into<Decimal>,
        limit_price: impl Into<Decimal>,
        tag: &str,
    ) -> OrderTicket {
        let request = SubmitOrderRequest::limit_if_touched(
            symbol.clone(),
            quantity.into(),
            trigger_price.into(),
            limit_price.into(),
            self.time,
        );
        self.submit_tagged(request, tag)
    }

    /// Exercise `quantity` long contracts of an option.
    pub fn exercise_option(
        &mut self,
        symbol: &Symbol,
        quantity: impl Into<Decimal>,
        tag: &str,
    ) -> OrderTicket {
        let request = SubmitOrderRequest::option_exercise(symbol.clone(), quantity.into(), self.time);
        self.submit_tagged(request, tag)
    }

    /// Submit a fully built request.
    ///
    /// Once the algorithm has stopped every request is rejected with
    /// `AlgorithmStopped`. Hitting the order cap stops the algorithm.
    pub fn submit_order_request(&mut self, request: SubmitOrderRequest) -> OrderTicket {
        if self.status != AlgorithmStatus::Running {
            warn!(symbol = %request.symbol(), status = %self.status, "Order refused: algorithm is not running");
            let response = OrderResponse::error(
                OrderId::UNASSIGNED,
                OrderResponseErrorCode::AlgorithmStopped,
                format!("Algorithm is {}; no further orders are accepted", self.status),
            );
            return OrderTicket::rejected(request, response);
        }

        let context = SubmitContext {
            settings: &self.settings,
            is_warming_up: self.warming_up,
            now: self.time,
        };
        let ticket = self.router.submit(&mut self.portfolio, &context, request);
        self.stop_if_capped(&ticket);
        ticket
    }

    fn stop_if_capped(&mut self, ticket: &OrderTicket) {
        if ticket.submit_response().error_code == OrderResponseErrorCode::ExceededMaximumOrders {
            error!(max_orders = self.settings.max_orders(), "Order cap reached, stopping algorithm");
            self.status = AlgorithmStatus::Stopped;
        }
    }

    /// Cancel an open order.
    pub fn cancel_order(&mut self, id: OrderId, tag: &str) -> OrderResponse {
        self.router.cancel(id, self.time, tag)
    }

    fn submit_tagged(&mut self, request: SubmitOrderRequest, tag: &str) -> OrderTicket {
        let request = request
            .with_tag(tag)
            .with_properties(self.default_order_properties.clone());
        self.submit_order_request(request)
    }

    // ============================================
    // Sizing and Rebalancing
    // ============================================

    /// Signed quantity moving `symbol` to `target_percent` of portfolio value,
    /// net of pending market orders.
    #[must_use]
    pub fn calculate_order_quantity(
        &self,
        symbol: &Symbol,
        target_percent: impl Into<Decimal>,
    ) -> Decimal {
        sizing::calculate_order_quantity(
            &self.portfolio,
            &self.settings,
            symbol,
            target_percent.into(),
            self.router.unfilled_market_quantity(symbol),
        )
    }

    /// Order `symbol` to `percent` of portfolio value.
    ///
    /// Returns `None` when holdings are already on target.
    pub fn set_holdings(
        &mut self,
        symbol: &Symbol,
        percent: impl Into<Decimal>,
        tag: &str,
    ) -> Option<OrderTicket> {
        let quantity = self.calculate_order_quantity(symbol, percent);
        if quantity.is_zero() {
            return None;
        }
        Some(self.market_order(symbol, quantity, false, tag))
    }

    /// Move every target to its percentage, position-reducing orders first.
    ///
    /// With `liquidate_existing`, holdings not named by any target are
    /// liquidated beforehand.
    pub fn set_holdings_targets(
        &mut self,
        targets: &[PortfolioTarget],
        liquidate_existing: bool,
        tag: &str,
    ) -> Vec<OrderTicket> {
        if liquidate_existing {
            let stale: Vec<Symbol> = self
                .portfolio
                .securities()
                .iter()
                .filter(|security| security.holdings().invested())
                .map(|security| security.symbol().clone())
                .filter(|symbol| !targets.iter().any(|target| &target.symbol == symbol))
                .collect();
            if !stale.is_empty() {
                self.liquidate_symbols(&stale, tag);
            }
        }

        let mut ordered: Vec<(bool, &PortfolioTarget)> = targets
            .iter()
            .map(|target| {
                let delta = self.calculate_order_quantity(&target.symbol, target.percent);
                let reduces = delta * self.portfolio.quantity(&target.symbol) < Decimal::ZERO;
                (reduces, target)
            })
            .collect();
        ordered.sort_by_key(|(reduces, _)| !reduces);

        ordered
            .into_iter()
            .filter_map(|(_, target)| self.set_holdings(&target.symbol, target.percent, tag))
            .collect()
    }

    /// Close the position in `symbol`, or in every subscribed security.
    ///
    /// Returns the ids of closing orders that filled.
    pub fn liquidate(&mut self, symbol: Option<&Symbol>, tag: &str) -> Vec<OrderId> {
        let symbols: Vec<Symbol> = symbol.map_or_else(
            || self.portfolio.securities().symbols().cloned().collect(),
            |symbol| vec![symbol.clone()],
        );
        self.liquidate_symbols(&symbols, tag)
    }

    fn liquidate_symbols(&mut self, symbols: &[Symbol], tag: &str) -> Vec<OrderId> {
        if self.status != AlgorithmStatus::Running {
            warn!(status = %self.status, "Liquidation skipped: algorithm is not running");
            return Vec::new();
        }
        let context = SubmitContext {
            settings: &self.settings,
            is_warming_up: self.warming_up,
            now: self.time,
        };
        let tickets =
            liquidation::liquidate(&mut self.router, &mut self.portfolio, &context, symbols, tag);
        for ticket in &tickets {
            self.stop_if_capped(ticket);
        }
        tickets
            .iter()
            .filter(|ticket| ticket.status() == OrderStatus::Filled)
            .map(OrderTicket::id)
            .collect()
    }

    // ============================================
    // Option Strategies
    // ============================================

    /// Open `quantity` units of a strategy.
    ///
    /// # Errors
    ///
    /// Returns error if a leg cannot be resolved; the algorithm status
    /// becomes `RuntimeError`.
    pub fn buy_strategy(
        &mut self,
        strategy: &OptionStrategy,
        quantity: impl Into<Decimal>,
    ) -> Result<Vec<OrderTicket>, EngineError> {
        self.order_strategy(strategy, quantity.into().abs())
    }

    /// Sell `quantity` units of a strategy.
    ///
    /// # Errors
    ///
    /// Returns error if a leg cannot be resolved; the algorithm status
    /// becomes `RuntimeError`.
    pub fn sell_strategy(
        &mut self,
        strategy: &OptionStrategy,
        quantity: impl Into<Decimal>,
    ) -> Result<Vec<OrderTicket>, EngineError> {
        self.order_strategy(strategy, -quantity.into().abs())
    }

    /// Submit one order per strategy leg, scaled by the signed `quantity`.
    ///
    /// # Errors
    ///
    /// Returns error if a leg cannot be resolved; the algorithm status
    /// becomes `RuntimeError` and no leg is submitted.
    pub fn order_strategy(
        &mut self,
        strategy: &OptionStrategy,
        quantity: impl Into<Decimal>,
    ) -> Result<Vec<OrderTicket>, EngineError> {
        let requests = match build_strategy_orders(
            &self.portfolio,
            strategy,
            quantity.into(),
            &self.default_order_properties,
            self.time,
        ) {
            Ok(requests) => requests,
            Err(err) => {
                error!(strategy = %strategy.name, error = %err, "Strategy order failed");
                self.status = AlgorithmStatus::RuntimeError;
                return Err(err);
            }
        };

        Ok(requests
            .into_iter()
            .map(|request| self.submit_order_request(request))
            .collect())
    }

    // ============================================
    // Simulation Driver
    // ============================================

    /// Subscribe a security with default properties for its type.
    ///
    /// Forex pairs quote in their last three letters, crypto pairs in a
    /// known quote suffix, option contracts in their underlying's currency
    /// and everything else in the account currency.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is invalid.
    pub fn add_security(
        &mut self,
        symbol: Symbol,
        resolution: Resolution,
    ) -> Result<&mut Security, EngineError> {
        symbol.validate()?;
        let quote = self.infer_quote_currency(&symbol);
        let properties = SymbolProperties::for_security_type(symbol.security_type(), &quote);
        self.add_security_with_properties(symbol, properties, resolution)
    }

    /// Subscribe a security with explicit properties.
    ///
    /// Missing quote and base currencies are added to the cash book with a
    /// zero conversion rate.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is invalid.
    pub fn add_security_with_properties(
        &mut self,
        symbol: Symbol,
        properties: SymbolProperties,
        resolution: Resolution,
    ) -> Result<&mut Security, EngineError> {
        symbol.validate()?;

        let mut security = Security::new(symbol, properties, resolution);
        if let Some(fee_model) = &self.default_fee_model {
            security.set_fee_model(Arc::clone(fee_model));
        }

        let cash_book = self.portfolio.cash_book_mut();
        cash_book.ensure(security.quote_currency());
        if let Some(base) = security.base_currency() {
            cash_book.ensure(base);
        }

        info!(
            symbol = %security.symbol(),
            quote_currency = %security.quote_currency(),
            resolution = ?resolution,
            "Security added"
        );
        let resumed = self.pending_removals.remove(security.symbol());
        let added = self.portfolio.securities_mut().add(security);
        if resumed {
            added.set_tradable(true);
        }
        Ok(added)
    }

    /// Unsubscribe a security.
    ///
    /// Open orders are canceled and the position is liquidated. When the
    /// closing order cannot fill yet (exchange closed), the security stays
    /// subscribed as non-tradable and leaves once that order is done.
    /// Returns false if the symbol was not subscribed.
    pub fn remove_security(&mut self, symbol: &Symbol) -> bool {
        if !self.portfolio.securities().contains(symbol) {
            return false;
        }
        for id in self.router.open_ticket_ids(Some(symbol)) {
            self.router.cancel(id, self.time, "Security removed");
        }
        if self.portfolio.quantity(symbol) != Decimal::ZERO {
            self.liquidate_symbols(std::slice::from_ref(symbol), "Security removed");
        }
        if self.router.open_ticket_ids(Some(symbol)).is_empty() {
            self.pending_removals.remove(symbol);
            return self.portfolio.securities_mut().remove(symbol);
        }

        if let Some(security) = self.portfolio.securities_mut().get_mut(symbol) {
            security.set_tradable(false);
        }
        self.pending_removals.insert(symbol.clone());
        info!(%symbol, "Security removal waits for its closing order");
        true
    }

    /// Whether `symbol` is waiting on a closing order before it is removed.
    #[must_use]
    pub fn is_pending_removal(&self, symbol: &Symbol) -> bool {
        self.pending_removals.contains(symbol)
    }

    fn finish_pending_removal(&mut self, symbol: &Symbol) {
        if self.pending_removals.contains(symbol)
            && self.router.open_ticket_ids(Some(symbol)).is_empty()
        {
            self.pending_removals.remove(symbol);
            self.portfolio.securities_mut().remove(symbol);
            info!(%symbol, "Security removed");
        }
    }

    /// Advance the clock. Settings lock on the first call.
    pub fn set_time(&mut self, time: DateTime<Utc>) {
        if time < self.time {
            warn!(from = %self.time, to = %time, "Clock moved backwards");
        }
        self.settings.lock();
        self.time = time;
    }

    /// Enter or leave warm-up.
    pub const fn set_warm_up(&mut self, warming_up: bool) {
        self.warming_up = warming_up;
    }

    /// Update the exchange state of a security. Closing the exchange fills
    /// market-on-close orders and expires day orders.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is not subscribed.
    pub fn set_exchange_open(
        &mut self,
        symbol: &Symbol,
        is_open: bool,
        next_market_close: Option<DateTime<Utc>>,
    ) -> Result<(), EngineError> {
        let security = self
            .portfolio
            .securities_mut()
            .get_mut(symbol)
            .ok_or_else(|| EngineError::UnknownSecurity(symbol.to_string()))?;
        let was_open = security.is_exchange_open();
        security.set_exchange_state(is_open, next_market_close);

        if was_open && !is_open {
            self.router
                .on_exchange_close(&mut self.portfolio, symbol, self.time);
        }
        self.finish_pending_removal(symbol);
        Ok(())
    }

    /// Feed a bar to a security and fill its resting orders against it.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is not subscribed.
    pub fn update_bar(&mut self, symbol: &Symbol, bar: Bar) -> Result<(), EngineError> {
        self.portfolio
            .securities_mut()
            .get_mut(symbol)
            .ok_or_else(|| EngineError::UnknownSecurity(symbol.to_string()))?
            .update(bar);
        self.router
            .scan(&mut self.portfolio, &self.settings, symbol, self.time);
        self.finish_pending_removal(symbol);
        Ok(())
    }

    /// Set the conversion rate of a currency into account currency.
    pub fn set_conversion_rate(&mut self, currency: &str, rate: impl Into<Decimal>) {
        self.portfolio
            .cash_book_mut()
            .set_conversion_rate(currency, rate.into());
    }

    /// Set the balance held in a currency.
    pub fn set_cash(&mut self, currency: &str, amount: impl Into<Decimal>) {
        self.portfolio.cash_book_mut().set_amount(currency, amount.into());
    }

    /// Fee model applied to securities added from now on.
    pub fn set_default_fee_model(&mut self, fee_model: Arc<dyn FeeModel>) {
        self.default_fee_model = Some(fee_model);
    }

    /// Properties attached to orders placed through the order methods.
    pub fn set_default_order_properties(&mut self, properties: OrderProperties) {
        self.default_order_properties = properties;
    }

    fn infer_quote_currency(&self, symbol: &Symbol) -> String {
        let account = self.portfolio.account_currency();
        let value = symbol.value();
        match symbol.security_type() {
            SecurityType::Forex if value.len() == 6 => value
                .get(3..)
                .map_or_else(|| account.to_string(), str::to_string),
            SecurityType::Crypto => CRYPTO_QUOTE_CURRENCIES
                .iter()
                .find(|quote| value.len() > quote.len() && value.ends_with(*quote))
                .map_or_else(|| account.to_string(), |quote| (*quote).to_string()),
            SecurityType::Option | SecurityType::IndexOption => symbol
                .underlying()
                .and_then(|underlying| self.portfolio.securities().get(underlying))
                .map_or_else(
                    || account.to_string(),
                    |security| security.quote_currency().to_string(),
                ),
            _ => account.to_string(),
        }
    }

    // ============================================
    // Accessors
    // ============================================

    /// Portfolio.
    #[must_use]
    pub const fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Mutable portfolio, for direct security configuration.
    pub const fn portfolio_mut(&mut self) -> &mut Portfolio {
        &mut self.portfolio
    }

    /// Settings.
    #[must_use]
    pub const fn settings(&self) -> &AlgorithmSettings {
        &self.settings
    }

    /// Mutable settings. Mutators fail once the clock has started.
    pub const fn settings_mut(&mut self) -> &mut AlgorithmSettings {
        &mut self.settings
    }

    /// Run status.
    #[must_use]
    pub const fn status(&self) -> AlgorithmStatus {
        self.status
    }

    /// Current simulation time.
    #[must_use]
    pub const fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Whether the algorithm is warming up.
    #[must_use]
    pub const fn is_warming_up(&self) -> bool {
        self.warming_up
    }

    /// Ticket by id.
    #[must_use]
    pub fn ticket(&self, id: OrderId) -> Option<&OrderTicket> {
        self.router.ticket(id)
    }

    /// All tickets in id order.
    pub fn tickets(&self) -> impl Iterator<Item = &OrderTicket> {
        self.router.tickets()
    }

    /// Open tickets, optionally for one symbol.
    pub fn open_tickets<'a>(
        &'a self,
        symbol: Option<&'a Symbol>,
    ) -> impl Iterator<Item = &'a OrderTicket> + 'a {
        self.router.open_tickets(symbol)
    }

    /// Orders accepted into the book.
    #[must_use]
    pub fn orders_count(&self) -> usize {
        self.router.orders_count()
    }
}

fn to_decimal(setting: &'static str, value: f64) -> Result<Decimal, EngineError> {
    Decimal::from_f64(value).ok_or(EngineError::InvalidSetting { setting, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::domain::option_strategies::factory;
    use crate::domain::order_execution::OrderType;
    use crate::domain::shared::{OptionRight, OptionStyle};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
            .and_utc()
    }

    fn with_spy(price: Decimal) -> (Algorithm, Symbol) {
        let mut algorithm = Algorithm::new(AlgorithmSettings::default(), "USD", dec!(100000));
        let spy = Symbol::equity("SPY");
        algorithm.add_security(spy.clone(), Resolution::Minute).unwrap();
        algorithm.set_time(at(15, 0));
        algorithm
            .update_bar(&spy, Bar::flat(at(15, 0), price, dec!(1000000)))
            .unwrap();
        (algorithm, spy)
    }

    #[test]
    fn buy_and_sell_use_absolute_quantity() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        let ticket = algorithm.buy(&spy, -10);
        assert_eq!(ticket.quantity(), dec!(10));
        assert_eq!(ticket.status(), OrderStatus::Filled);

        let ticket = algorithm.sell(&spy, 4);
        assert_eq!(ticket.quantity(), dec!(-4));
        assert_eq!(algorithm.portfolio().quantity(&spy), dec!(6));
    }

    #[test]
    fn order_cap_stops_algorithm() {
        let mut settings = AlgorithmSettings::default();
        settings.set_max_orders(1).unwrap();
        let mut algorithm = Algorithm::new(settings, "USD", dec!(100000));
        let spy = Symbol::equity("SPY");
        algorithm.add_security(spy.clone(), Resolution::Minute).unwrap();
        algorithm.set_time(at(15, 0));
        algorithm
            .update_bar(&spy, Bar::flat(at(15, 0), dec!(10), dec!(1000)))
            .unwrap();

        assert_eq!(algorithm.order(&spy, 1).status(), OrderStatus::Filled);
        let capped = algorithm.order(&spy, 1);
        assert_eq!(
            capped.submit_response().error_code,
            OrderResponseErrorCode::ExceededMaximumOrders
        );
        assert_eq!(algorithm.status(), AlgorithmStatus::Stopped);

        let refused = algorithm.order(&spy, 1);
        assert_eq!(
            refused.submit_response().error_code,
            OrderResponseErrorCode::AlgorithmStopped
        );
    }

    #[test]
    fn settings_lock_when_clock_starts() {
        let (mut algorithm, _) = with_spy(dec!(100));
        assert!(algorithm.settings().is_locked());
        let result = algorithm.settings_mut().set_max_orders(5);
        assert!(matches!(result, Err(EngineError::SettingsLocked { .. })));
    }

    #[test]
    fn set_holdings_orders_delta() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        let Some(ticket) = algorithm.set_holdings(&spy, dec!(0.5), "half") else {
            panic!("expected an order");
        };
        assert_eq!(ticket.tag(), "half");
        assert_eq!(algorithm.portfolio().quantity(&spy), dec!(498));
        assert!(algorithm.set_holdings(&spy, dec!(0.5), "again").is_none());
    }

    #[test]
    fn targets_reduce_before_increasing() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        let ibm = Symbol::equity("IBM");
        algorithm.add_security(ibm.clone(), Resolution::Minute).unwrap();
        algorithm
            .update_bar(&ibm, Bar::flat(at(15, 0), dec!(50), dec!(1000000)))
            .unwrap();
        algorithm.set_holdings(&spy, dec!(0.9), "");

        let tickets = algorithm.set_holdings_targets(
            &[
                PortfolioTarget::new(ibm.clone(), dec!(0.5)),
                PortfolioTarget::new(spy.clone(), dec!(0.4)),
            ],
            false,
            "rebalance",
        );
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].symbol(), &spy);
        assert!(tickets[0].quantity() < Decimal::ZERO);
        assert_eq!(tickets[1].symbol(), &ibm);
        assert_eq!(tickets[1].status(), OrderStatus::Filled);
    }

    #[test]
    fn targets_can_liquidate_others() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        let ibm = Symbol::equity("IBM");
        algorithm.add_security(ibm.clone(), Resolution::Minute).unwrap();
        algorithm
            .update_bar(&ibm, Bar::flat(at(15, 0), dec!(50), dec!(1000000)))
            .unwrap();
        algorithm.buy(&spy, 10);

        algorithm.set_holdings_targets(&[PortfolioTarget::new(ibm.clone(), dec!(0.1))], true, "");
        assert_eq!(algorithm.portfolio().quantity(&spy), Decimal::ZERO);
        assert!(algorithm.portfolio().quantity(&ibm) > Decimal::ZERO);
    }

    #[test]
    fn liquidate_all_returns_filled_ids() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        algorithm.buy(&spy, 10);
        let ids = algorithm.liquidate(None, "Liquidated");
        assert_eq!(ids.len(), 1);
        assert_eq!(algorithm.portfolio().quantity(&spy), Decimal::ZERO);
        assert!(algorithm.liquidate(None, "Liquidated").is_empty());
    }

    #[test]
    fn liquidation_hitting_order_cap_stops_algorithm() {
        let mut settings = AlgorithmSettings::default();
        settings.set_max_orders(1).unwrap();
        let mut algorithm = Algorithm::new(settings, "USD", dec!(100000));
        let spy = Symbol::equity("SPY");
        algorithm.add_security(spy.clone(), Resolution::Minute).unwrap();
        algorithm.set_time(at(15, 0));
        algorithm
            .update_bar(&spy, Bar::flat(at(15, 0), dec!(100), dec!(1000000)))
            .unwrap();
        algorithm.buy(&spy, 10);

        assert!(algorithm.liquidate(None, "Liquidated").is_empty());
        assert_eq!(algorithm.status(), AlgorithmStatus::Stopped);
        assert_eq!(algorithm.portfolio().quantity(&spy), dec!(10));
    }

    #[test]
    fn missing_strategy_contract_is_fatal() {
        let (mut algorithm, _) = with_spy(dec!(100));
        let canonical = Symbol::canonical_option(&Symbol::equity("SPY"));
        let strategy = factory::straddle(
            &canonical,
            dec!(100),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        )
        .unwrap();

        let result = algorithm.buy_strategy(&strategy, 1);
        assert!(matches!(result, Err(EngineError::StrategyContractNotFound { .. })));
        assert_eq!(algorithm.status(), AlgorithmStatus::RuntimeError);
        assert_eq!(algorithm.orders_count(), 0);
    }

    #[test]
    fn strategy_submits_every_leg() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        let expiry = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        for right in [OptionRight::Call, OptionRight::Put] {
            let contract =
                Symbol::option_contract(&spy, right, OptionStyle::American, dec!(100), expiry);
            algorithm.add_security(contract.clone(), Resolution::Minute).unwrap();
            algorithm
                .update_bar(&contract, Bar::flat(at(15, 0), dec!(2), dec!(1000)))
                .unwrap();
        }
        let canonical = Symbol::canonical_option(&spy);
        let strategy = factory::straddle(&canonical, dec!(100), expiry).unwrap();

        let tickets = algorithm.sell_strategy(&strategy, 2).unwrap();
        assert_eq!(tickets.len(), 2);
        assert!(tickets.iter().all(|ticket| ticket.quantity() == dec!(-2)));
        assert!(tickets.iter().all(|ticket| ticket.tag() == "Straddle (-2)"));
    }

    #[test]
    fn closed_exchange_reroutes_then_close_fills_moc() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        algorithm
            .set_exchange_open(&spy, true, Some(at(16, 0)))
            .unwrap();
        let moc = algorithm.market_on_close_order(&spy, 5, "");
        assert_eq!(moc.status(), OrderStatus::Submitted);

        algorithm.set_time(at(16, 0));
        algorithm.set_exchange_open(&spy, false, None).unwrap();
        assert_eq!(
            algorithm.ticket(moc.id()).map(OrderTicket::status),
            Some(OrderStatus::Filled)
        );

        let ticket = algorithm.order(&spy, 3);
        assert_eq!(ticket.order_type(), OrderType::MarketOnOpen);
        assert_eq!(ticket.status(), OrderStatus::Submitted);
    }

    fn ticket_status(algorithm: &Algorithm, id: OrderId) -> Option<OrderStatus> {
        algorithm.ticket(id).map(OrderTicket::status)
    }

    #[test]
    fn stop_market_fills_at_stop_once_reached() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        let stop = algorithm.stop_market_order(&spy, 10, dec!(105), "breakout");
        assert_eq!(stop.order_type(), OrderType::StopMarket);
        assert_eq!(stop.status(), OrderStatus::Submitted);

        algorithm.set_time(at(15, 1));
        algorithm
            .update_bar(&spy, Bar::flat(at(15, 1), dec!(103), dec!(1000000)))
            .unwrap();
        assert_eq!(ticket_status(&algorithm, stop.id()), Some(OrderStatus::Submitted));

        algorithm.set_time(at(15, 2));
        let bar = Bar::new(at(15, 2), dec!(103), dec!(106), dec!(102), dec!(105), dec!(1000000));
        algorithm.update_bar(&spy, bar).unwrap();
        let filled = algorithm.ticket(stop.id()).unwrap();
        assert_eq!(filled.status(), OrderStatus::Filled);
        assert_eq!(filled.average_fill_price(), dec!(105));
        assert_eq!(filled.tag(), "breakout");
        assert_eq!(algorithm.portfolio().quantity(&spy), dec!(10));
    }

    #[test]
    fn stop_limit_sell_triggers_then_fills_at_limit() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        algorithm.buy(&spy, 10);
        let stop = algorithm.stop_limit_order(&spy, -5, dec!(95), dec!(96), "");
        assert_eq!(stop.order_type(), OrderType::StopLimit);

        algorithm.set_time(at(15, 1));
        let bar = Bar::new(at(15, 1), dec!(96), dec!(97), dec!(94), dec!(95), dec!(1000000));
        algorithm.update_bar(&spy, bar).unwrap();

        let filled = algorithm.ticket(stop.id()).unwrap();
        assert!(filled.is_triggered());
        assert_eq!(filled.status(), OrderStatus::Filled);
        assert_eq!(filled.average_fill_price(), dec!(96));
        assert_eq!(algorithm.portfolio().quantity(&spy), dec!(5));
    }

    #[test]
    fn limit_if_touched_waits_for_limit_after_trigger() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        let lit = algorithm.limit_if_touched_order(&spy, 10, dec!(98), dec!(97), "");
        assert_eq!(lit.order_type(), OrderType::LimitIfTouched);

        algorithm.set_time(at(15, 1));
        algorithm
            .update_bar(&spy, Bar::flat(at(15, 1), dec!(98), dec!(1000000)))
            .unwrap();
        let touched = algorithm.ticket(lit.id()).unwrap();
        assert!(touched.is_triggered());
        assert_eq!(touched.status(), OrderStatus::Submitted);

        algorithm.set_time(at(15, 2));
        algorithm
            .update_bar(&spy, Bar::flat(at(15, 2), dec!(97), dec!(1000000)))
            .unwrap();
        assert_eq!(ticket_status(&algorithm, lit.id()), Some(OrderStatus::Filled));
        assert_eq!(algorithm.portfolio().quantity(&spy), dec!(10));
    }

    #[test]
    fn market_on_open_fills_at_next_open() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        let moo = algorithm.market_on_open_order(&spy, 5, "open");
        assert_eq!(moo.order_type(), OrderType::MarketOnOpen);
        assert_eq!(moo.status(), OrderStatus::Submitted);

        algorithm.set_time(at(16, 0));
        algorithm.set_exchange_open(&spy, false, None).unwrap();
        assert_eq!(ticket_status(&algorithm, moo.id()), Some(OrderStatus::Submitted));

        let open = at(9, 30) + Duration::days(1);
        algorithm.set_time(open);
        algorithm.set_exchange_open(&spy, true, None).unwrap();
        let bar = Bar::new(open, dec!(102), dec!(103), dec!(101), dec!(101), dec!(1000000));
        algorithm.update_bar(&spy, bar).unwrap();

        let filled = algorithm.ticket(moo.id()).unwrap();
        assert_eq!(filled.status(), OrderStatus::Filled);
        assert_eq!(filled.average_fill_price(), dec!(102));
    }

    #[test]
    fn cancel_order_closes_resting_order_once() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        let limit = algorithm.limit_order(&spy, 10, dec!(90), "");

        assert!(algorithm.cancel_order(limit.id(), "changed my mind").is_success());
        assert_eq!(ticket_status(&algorithm, limit.id()), Some(OrderStatus::Canceled));
        assert_eq!(algorithm.open_tickets(Some(&spy)).count(), 0);

        let again = algorithm.cancel_order(limit.id(), "");
        assert_eq!(again.error_code, OrderResponseErrorCode::InvalidOrderStatus);
        let unknown = algorithm.cancel_order(OrderId::new(99), "");
        assert_eq!(unknown.error_code, OrderResponseErrorCode::UnableToFindOrder);

        algorithm.set_time(at(15, 1));
        algorithm
            .update_bar(&spy, Bar::flat(at(15, 1), dec!(85), dec!(1000000)))
            .unwrap();
        assert_eq!(algorithm.portfolio().quantity(&spy), Decimal::ZERO);
    }

    #[test]
    fn infers_quote_currencies() {
        let mut algorithm = Algorithm::new(AlgorithmSettings::default(), "USD", dec!(0));
        let eurgbp = algorithm
            .add_security(Symbol::forex("EURGBP"), Resolution::Minute)
            .unwrap();
        assert_eq!(eurgbp.quote_currency(), "GBP");
        assert_eq!(eurgbp.base_currency(), Some("EUR"));

        let btcusdt = algorithm
            .add_security(Symbol::crypto("BTCUSDT"), Resolution::Minute)
            .unwrap();
        assert_eq!(btcusdt.quote_currency(), "USDT");

        assert_eq!(algorithm.portfolio().cash_book().conversion_rate("GBP"), Some(Decimal::ZERO));
        assert!(algorithm.portfolio().cash_book().contains("BTC"));
    }

    #[test]
    fn non_ascii_forex_pair_is_rejected() {
        let mut algorithm = Algorithm::new(AlgorithmSettings::default(), "USD", dec!(0));
        let result = algorithm.add_security(Symbol::forex("abÉcd"), Resolution::Minute);
        assert!(matches!(result, Err(EngineError::Domain(_))));
        assert!(algorithm.portfolio().securities().is_empty());
    }

    #[test]
    fn unknown_symbol_driver_calls_fail() {
        let mut algorithm = Algorithm::new(AlgorithmSettings::default(), "USD", dec!(0));
        let result = algorithm.update_bar(
            &Symbol::equity("QQQ"),
            Bar::flat(at(10, 0), dec!(1), dec!(1)),
        );
        assert!(matches!(result, Err(EngineError::UnknownSecurity(_))));
        assert!(!algorithm.remove_security(&Symbol::equity("QQQ")));
    }

    #[test]
    fn removal_while_closed_waits_for_market_on_open_close() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        algorithm.buy(&spy, 10);
        algorithm.set_time(at(16, 0));
        algorithm.set_exchange_open(&spy, false, None).unwrap();

        assert!(algorithm.remove_security(&spy));
        assert!(algorithm.is_pending_removal(&spy));
        assert!(algorithm.portfolio().securities().contains(&spy));
        let closing: Vec<_> = algorithm.open_tickets(Some(&spy)).collect();
        assert_eq!(closing.len(), 1);
        assert_eq!(closing[0].order_type(), OrderType::MarketOnOpen);
        assert_eq!(
            algorithm.buy(&spy, 1).submit_response().error_code,
            OrderResponseErrorCode::NonTradableSecurity
        );

        let open = at(9, 31) + Duration::days(1);
        algorithm.set_time(open);
        algorithm.set_exchange_open(&spy, true, None).unwrap();
        algorithm
            .update_bar(&spy, Bar::flat(open, dec!(101), dec!(1000000)))
            .unwrap();

        assert_eq!(algorithm.portfolio().quantity(&spy), Decimal::ZERO);
        assert!(!algorithm.is_pending_removal(&spy));
        assert!(!algorithm.portfolio().securities().contains(&spy));
        assert_eq!(algorithm.open_tickets(Some(&spy)).count(), 0);
    }

    #[test]
    fn re_adding_pending_removal_makes_it_tradable() {
        let (mut algorithm, spy) = with_spy(dec!(100));
        algorithm.buy(&spy, 10);
        algorithm.set_exchange_open(&spy, false, None).unwrap();
        assert!(algorithm.remove_security(&spy));

        let security = algorithm
            .add_security(spy.clone(), Resolution::Minute)
            .unwrap();
        assert!(security.is_tradable());
        assert!(!algorithm.is_pending_removal(&spy));
    }

    #[test]
    fn from_config_applies_engine_section() {
        let mut config = Config::default();
        config.engine.max_orders = 7;
        config.engine.starting_cash = 2500.0;
        config.fills.partial_fill_volume_fraction = Some(0.25);
        let algorithm = Algorithm::from_config(&config).unwrap();
        assert_eq!(algorithm.settings().max_orders(), 7);
        assert_eq!(
            algorithm.settings().market_on_close_buffer(),
            Duration::seconds(930)
        );
        assert_eq!(algorithm.settings().partial_fill_volume_fraction(), Some(dec!(0.25)));
        assert_eq!(algorithm.portfolio().cash(), dec!(2500));
    }

    #[test]
    fn from_config_rejects_nan() {
        let mut config = Config::default();
        config.engine.starting_cash = f64::NAN;
        let result = Algorithm::from_config(&config);
        assert!(matches!(result, Err(EngineError::InvalidSetting { setting: "starting_cash", .. })));
    }
}
