//! Runtime state of a tradable instrument.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{
    Bar, BuyingPowerModel, ConstantFeeModel, ExchangeState, FeeModel, Resolution, SecurityCache,
    SecurityHolding, SecurityMarginModel, SymbolProperties,
};
use crate::domain::shared::Symbol;

/// A subscribed security.
///
/// Currencies are referenced by code and resolved through the portfolio's
/// cash book; the security never holds a reference to a `Cash` entry.
#[derive(Debug, Clone)]
pub struct Security {
    symbol: Symbol,
    properties: SymbolProperties,
    base_currency: Option<String>,
    resolution: Resolution,
    exchange: ExchangeState,
    tradable: bool,
    holdings: SecurityHolding,
    cache: SecurityCache,
    buying_power_model: Arc<dyn BuyingPowerModel>,
    fee_model: Arc<dyn FeeModel>,
}

impl Security {
    /// New security with a cash margin model and no fees.
    #[must_use]
    pub fn new(symbol: Symbol, properties: SymbolProperties, resolution: Resolution) -> Self {
        let base_currency = symbol
            .currency_pair(&properties.quote_currency)
            .map(|(base, _)| base);
        let fee_model = Arc::new(ConstantFeeModel::zero(properties.quote_currency.clone()));
        Self {
            symbol,
            properties,
            base_currency,
            resolution,
            exchange: ExchangeState::default(),
            tradable: true,
            holdings: SecurityHolding::default(),
            cache: SecurityCache::default(),
            buying_power_model: Arc::new(SecurityMarginModel::cash()),
            fee_model,
        }
    }

    /// Symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Symbol properties.
    #[must_use]
    pub const fn properties(&self) -> &SymbolProperties {
        &self.properties
    }

    /// Quote currency code.
    #[must_use]
    pub fn quote_currency(&self) -> &str {
        &self.properties.quote_currency
    }

    /// Base currency code of a Forex or Crypto pair.
    #[must_use]
    pub fn base_currency(&self) -> Option<&str> {
        self.base_currency.as_deref()
    }

    /// Data resolution.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Exchange state.
    #[must_use]
    pub const fn exchange(&self) -> &ExchangeState {
        &self.exchange
    }

    /// Whether the exchange is open.
    #[must_use]
    pub const fn is_exchange_open(&self) -> bool {
        self.exchange.is_open
    }

    /// Update the exchange state.
    pub const fn set_exchange_state(&mut self, is_open: bool, next_market_close: Option<DateTime<Utc>>) {
        self.exchange = ExchangeState {
            is_open,
            next_market_close,
        };
    }

    /// Whether orders may be placed.
    #[must_use]
    pub const fn is_tradable(&self) -> bool {
        self.tradable
    }

    /// Mark the security tradable or not (e.g. after delisting).
    pub const fn set_tradable(&mut self, tradable: bool) {
        self.tradable = tradable;
    }

    /// Holdings.
    #[must_use]
    pub const fn holdings(&self) -> &SecurityHolding {
        &self.holdings
    }

    /// Mutable holdings.
    pub const fn holdings_mut(&mut self) -> &mut SecurityHolding {
        &mut self.holdings
    }

    /// Signed holdings value in quote currency.
    #[must_use]
    pub fn holdings_value(&self) -> Decimal {
        self.holdings.holdings_value(self.properties.contract_multiplier)
    }

    /// Cached market data and derived values.
    #[must_use]
    pub const fn cache(&self) -> &SecurityCache {
        &self.cache
    }

    /// Mutable cache.
    pub const fn cache_mut(&mut self) -> &mut SecurityCache {
        &mut self.cache
    }

    /// Last price, zero if unknown.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.cache.price()
    }

    /// Whether data has been received.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.cache.has_data()
    }

    /// Last bar received.
    #[must_use]
    pub const fn last_bar(&self) -> Option<&Bar> {
        self.cache.last_bar()
    }

    /// Store a new bar and mark holdings to its close.
    pub fn update(&mut self, bar: Bar) {
        self.holdings.update_market_price(bar.close);
        self.cache.update(bar);
    }

    /// Seed a price without data, e.g. when restoring holdings.
    pub const fn set_market_price(&mut self, price: Decimal) {
        self.holdings.update_market_price(price);
        self.cache.set_price(price);
    }

    /// Buying power model.
    #[must_use]
    pub fn buying_power_model(&self) -> Arc<dyn BuyingPowerModel> {
        Arc::clone(&self.buying_power_model)
    }

    /// Replace the buying power model.
    pub fn set_buying_power_model(&mut self, model: Arc<dyn BuyingPowerModel>) {
        self.buying_power_model = model;
    }

    /// Use a margin model with the given leverage.
    pub fn set_leverage(&mut self, leverage: Decimal) {
        self.buying_power_model = Arc::new(SecurityMarginModel::new(leverage));
    }

    /// Fee model.
    #[must_use]
    pub fn fee_model(&self) -> Arc<dyn FeeModel> {
        Arc::clone(&self.fee_model)
    }

    /// Replace the fee model.
    pub fn set_fee_model(&mut self, model: Arc<dyn FeeModel>) {
        self.fee_model = model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::domain::shared::SecurityType;

    #[test]
    fn forex_base_currency_from_symbol() {
        let eurusd = Security::new(
            Symbol::forex("EURUSD"),
            SymbolProperties::for_security_type(SecurityType::Forex, "USD"),
            Resolution::Minute,
        );
        assert_eq!(eurusd.base_currency(), Some("EUR"));
        assert_eq!(eurusd.quote_currency(), "USD");
    }

    #[test]
    fn update_marks_holdings() {
        let mut spy = Security::new(
            Symbol::equity("SPY"),
            SymbolProperties::for_security_type(SecurityType::Equity, "USD"),
            Resolution::Minute,
        );
        spy.holdings_mut().apply_fill(dec!(10), dec!(100), Decimal::ONE);
        spy.update(Bar::flat(Utc::now(), dec!(110), dec!(1)));
        assert_eq!(spy.price(), dec!(110));
        assert_eq!(spy.holdings_value(), dec!(1100));
        assert!(spy.has_data());
    }

    #[test]
    fn seeded_price_is_not_data() {
        let mut spy = Security::new(
            Symbol::equity("SPY"),
            SymbolProperties::for_security_type(SecurityType::Equity, "USD"),
            Resolution::Daily,
        );
        spy.set_market_price(dec!(99));
        assert_eq!(spy.price(), dec!(99));
        assert!(!spy.has_data());
    }
}
