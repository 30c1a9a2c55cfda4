//! Symbol value object for instrument identifiers.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::shared::DomainError;

/// Market identifier for US equities and their options.
pub const MARKET_USA: &str = "usa";
/// Market identifier for forex pairs.
pub const MARKET_OANDA: &str = "oanda";
/// Market identifier for crypto pairs.
pub const MARKET_COINBASE: &str = "coinbase";

/// Asset class of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityType {
    /// Common stock or ETF.
    Equity,
    /// Equity option contract.
    Option,
    /// Option on an index.
    IndexOption,
    /// Futures contract.
    Future,
    /// Foreign exchange pair.
    Forex,
    /// Crypto pair.
    Crypto,
    /// Contract for difference.
    Cfd,
    /// Cash index (not directly tradable in most markets).
    Index,
}

impl SecurityType {
    /// Option-like types that can be exercised.
    #[must_use]
    pub const fn is_option(self) -> bool {
        matches!(self, Self::Option | Self::IndexOption)
    }

    /// Types whose symbol encodes a base and a quote currency.
    #[must_use]
    pub const fn is_currency_pair(self) -> bool {
        matches!(self, Self::Forex | Self::Crypto)
    }
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equity => "Equity",
            Self::Option => "Option",
            Self::IndexOption => "IndexOption",
            Self::Future => "Future",
            Self::Forex => "Forex",
            Self::Crypto => "Crypto",
            Self::Cfd => "Cfd",
            Self::Index => "Index",
        };
        write!(f, "{s}")
    }
}

/// Option right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionRight {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl OptionRight {
    /// OCC contract code.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Call => 'C',
            Self::Put => 'P',
        }
    }
}

/// Exercise style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionStyle {
    /// Exercisable any time before expiry.
    American,
    /// Exercisable only at expiry.
    European,
}

/// Contract terms of a concrete option symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionDetails {
    /// Call or put.
    pub right: OptionRight,
    /// Exercise style.
    pub style: OptionStyle,
    /// Strike price.
    pub strike: Decimal,
    /// Expiration date.
    pub expiry: NaiveDate,
}

/// An immutable instrument identifier.
///
/// Equality covers ticker, market, type, contract terms and underlying, so
/// an American and a European contract with the same strike are distinct keys.
///
/// Examples:
/// - Equity: "SPY"
/// - Canonical option: "?SPY"
/// - Option contract: "SPY240119C00450000" (OCC format)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    value: String,
    market: String,
    security_type: SecurityType,
    option: Option<OptionDetails>,
    underlying: Option<Arc<Self>>,
}

impl Symbol {
    /// Create a non-derivative symbol.
    ///
    /// The ticker is normalized to uppercase.
    #[must_use]
    pub fn create(
        ticker: impl Into<String>,
        security_type: SecurityType,
        market: impl Into<String>,
    ) -> Self {
        Self {
            value: ticker.into().to_uppercase(),
            market: market.into(),
            security_type,
            option: None,
            underlying: None,
        }
    }

    /// US equity symbol.
    #[must_use]
    pub fn equity(ticker: impl Into<String>) -> Self {
        Self::create(ticker, SecurityType::Equity, MARKET_USA)
    }

    /// US index symbol.
    #[must_use]
    pub fn index(ticker: impl Into<String>) -> Self {
        Self::create(ticker, SecurityType::Index, MARKET_USA)
    }

    /// Forex pair symbol such as "EURUSD".
    #[must_use]
    pub fn forex(pair: impl Into<String>) -> Self {
        Self::create(pair, SecurityType::Forex, MARKET_OANDA)
    }

    /// Crypto pair symbol such as "BTCUSD".
    #[must_use]
    pub fn crypto(pair: impl Into<String>) -> Self {
        Self::create(pair, SecurityType::Crypto, MARKET_COINBASE)
    }

    /// Canonical option chain symbol for an underlying.
    #[must_use]
    pub fn canonical_option(underlying: &Self) -> Self {
        Self {
            value: format!("?{}", underlying.value),
            market: underlying.market.clone(),
            security_type: option_type_for(underlying),
            option: None,
            underlying: Some(Arc::new(underlying.clone())),
        }
    }

    /// Concrete option contract on an underlying.
    #[must_use]
    pub fn option_contract(
        underlying: &Self,
        right: OptionRight,
        style: OptionStyle,
        strike: Decimal,
        expiry: NaiveDate,
    ) -> Self {
        let strike_code = (strike * Decimal::ONE_THOUSAND)
            .trunc()
            .to_u64()
            .unwrap_or_default();
        Self {
            value: format!(
                "{}{}{}{strike_code:08}",
                underlying.value,
                expiry.format("%y%m%d"),
                right.code()
            ),
            market: underlying.market.clone(),
            security_type: option_type_for(underlying),
            option: Some(OptionDetails {
                right,
                style,
                strike,
                expiry,
            }),
            underlying: Some(Arc::new(underlying.clone())),
        }
    }

    /// Ticker or contract identifier.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Market the symbol trades in.
    #[must_use]
    pub fn market(&self) -> &str {
        &self.market
    }

    /// Asset class.
    #[must_use]
    pub const fn security_type(&self) -> SecurityType {
        self.security_type
    }

    /// Contract terms, present only on concrete option contracts.
    #[must_use]
    pub const fn option_details(&self) -> Option<&OptionDetails> {
        self.option.as_ref()
    }

    /// Underlying symbol of a derivative.
    #[must_use]
    pub fn underlying(&self) -> Option<&Self> {
        self.underlying.as_deref()
    }

    /// Whether this is a canonical chain symbol rather than a contract.
    #[must_use]
    pub const fn is_canonical(&self) -> bool {
        self.security_type.is_option() && self.option.is_none()
    }

    /// Canonical chain symbol shared by all contracts on the same underlying.
    ///
    /// Returns `None` for non-derivatives.
    #[must_use]
    pub fn canonical(&self) -> Option<Self> {
        if self.is_canonical() {
            return Some(self.clone());
        }
        self.underlying().map(Self::canonical_option)
    }

    /// Base and quote currency codes of a Forex or Crypto pair.
    ///
    /// Forex pairs are split in two three-letter codes; crypto pairs are
    /// split on the known quote currency suffix.
    #[must_use]
    pub fn currency_pair(&self, quote_currency: &str) -> Option<(String, String)> {
        match self.security_type {
            SecurityType::Forex if self.value.len() == 6 => Some((
                self.value.get(..3)?.to_string(),
                self.value.get(3..)?.to_string(),
            )),
            SecurityType::Crypto => {
                let base = self.value.strip_suffix(quote_currency)?;
                if base.is_empty() {
                    None
                } else {
                    Some((base.to_string(), quote_currency.to_string()))
                }
            }
            _ => None,
        }
    }

    /// Validate the symbol.
    ///
    /// # Errors
    ///
    /// Returns error if the ticker is empty, is not ASCII, or a contract has
    /// a non-positive strike.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.value.is_empty() {
            return Err(DomainError::InvalidSymbol {
                symbol: String::new(),
                reason: "symbol cannot be empty",
            });
        }

        if !self.value.is_ascii() {
            return Err(DomainError::InvalidSymbol {
                symbol: self.value.clone(),
                reason: "symbol must be ASCII",
            });
        }

        if let Some(details) = &self.option {
            if details.strike <= Decimal::ZERO {
                return Err(DomainError::InvalidSymbol {
                    symbol: self.value.clone(),
                    reason: "strike must be positive",
                });
            }
        }

        Ok(())
    }
}

fn option_type_for(underlying: &Symbol) -> SecurityType {
    if underlying.security_type == SecurityType::Index {
        SecurityType::IndexOption
    } else {
        SecurityType::Option
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
    }

    #[test]
    fn equity_is_uppercased() {
        let symbol = Symbol::equity("spy");
        assert_eq!(symbol.value(), "SPY");
        assert_eq!(symbol.market(), MARKET_USA);
        assert_eq!(symbol.security_type(), SecurityType::Equity);
        assert!(symbol.underlying().is_none());
    }

    #[test]
    fn option_contract_uses_occ_value() {
        let spy = Symbol::equity("SPY");
        let contract = Symbol::option_contract(
            &spy,
            OptionRight::Call,
            OptionStyle::American,
            dec!(450),
            expiry(),
        );
        assert_eq!(contract.value(), "SPY240119C00450000");
        assert_eq!(contract.underlying(), Some(&spy));
        assert!(!contract.is_canonical());
    }

    #[test]
    fn fractional_strike_code() {
        let spy = Symbol::equity("SPY");
        let contract =
            Symbol::option_contract(&spy, OptionRight::Put, OptionStyle::American, dec!(17.5), expiry());
        assert_eq!(contract.value(), "SPY240119P00017500");
    }

    #[test]
    fn styles_are_distinct_keys() {
        let spx = Symbol::index("SPX");
        let american =
            Symbol::option_contract(&spx, OptionRight::Call, OptionStyle::American, dec!(4700), expiry());
        let european =
            Symbol::option_contract(&spx, OptionRight::Call, OptionStyle::European, dec!(4700), expiry());
        assert_eq!(american.value(), european.value());
        assert_ne!(american, european);
        assert_eq!(american.security_type(), SecurityType::IndexOption);
    }

    #[test]
    fn canonical_of_contract_matches_chain() {
        let spy = Symbol::equity("SPY");
        let chain = Symbol::canonical_option(&spy);
        let contract =
            Symbol::option_contract(&spy, OptionRight::Call, OptionStyle::American, dec!(450), expiry());
        assert!(chain.is_canonical());
        assert_eq!(chain.value(), "?SPY");
        assert_eq!(contract.canonical(), Some(chain));
        assert_eq!(spy.canonical(), None);
    }

    #[test]
    fn forex_currency_pair() {
        let eurusd = Symbol::forex("EURUSD");
        assert_eq!(
            eurusd.currency_pair("USD"),
            Some(("EUR".to_string(), "USD".to_string()))
        );
    }

    #[test]
    fn crypto_currency_pair() {
        let btc = Symbol::crypto("BTCUSDT");
        assert_eq!(
            btc.currency_pair("USDT"),
            Some(("BTC".to_string(), "USDT".to_string()))
        );
        assert_eq!(btc.currency_pair("EUR"), None);
        assert_eq!(Symbol::equity("SPY").currency_pair("USD"), None);
    }

    #[test]
    fn validate_rejects_empty() {
        assert!(Symbol::equity("").validate().is_err());
        assert!(Symbol::equity("IBM").validate().is_ok());
    }

    #[test]
    fn non_ascii_pair_is_invalid_not_split() {
        let pair = Symbol::forex("abÉcd");
        assert_eq!(pair.value().len(), 6);
        assert_eq!(pair.currency_pair("USD"), None);
        assert!(matches!(
            pair.validate(),
            Err(DomainError::InvalidSymbol { reason: "symbol must be ASCII", .. })
        ));
    }
}
