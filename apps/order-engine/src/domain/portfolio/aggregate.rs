//! Portfolio aggregate.

use rust_decimal::Decimal;

use super::CashBook;
use crate::domain::order_execution::OrderFee;
use crate::domain::securities::{BuyingPowerContext, Security, SecurityHolding, SecurityManager};
use crate::domain::shared::{DomainError, Symbol};

/// Aggregate of cash and security holdings.
///
/// Invariant: `total_portfolio_value == cash_book total + total_holdings_value`
/// at every valuation instant, all in account currency.
#[derive(Debug, Clone)]
pub struct Portfolio {
    cash_book: CashBook,
    securities: SecurityManager,
}

impl Portfolio {
    /// Portfolio holding `starting_cash` in the account currency.
    #[must_use]
    pub fn new(account_currency: impl Into<String>, starting_cash: Decimal) -> Self {
        let mut cash_book = CashBook::new(account_currency);
        let account = cash_book.account_currency().to_string();
        cash_book.set_amount(&account, starting_cash);
        Self {
            cash_book,
            securities: SecurityManager::new(),
        }
    }

    /// Cash book.
    #[must_use]
    pub const fn cash_book(&self) -> &CashBook {
        &self.cash_book
    }

    /// Mutable cash book.
    pub const fn cash_book_mut(&mut self) -> &mut CashBook {
        &mut self.cash_book
    }

    /// Security registry.
    #[must_use]
    pub const fn securities(&self) -> &SecurityManager {
        &self.securities
    }

    /// Mutable security registry.
    pub const fn securities_mut(&mut self) -> &mut SecurityManager {
        &mut self.securities
    }

    /// Account currency code.
    #[must_use]
    pub fn account_currency(&self) -> &str {
        self.cash_book.account_currency()
    }

    /// Cash held in the account currency.
    #[must_use]
    pub fn cash(&self) -> Decimal {
        self.cash_book
            .get(self.cash_book.account_currency())
            .map_or(Decimal::ZERO, |cash| cash.amount)
    }

    /// Set the account currency balance.
    pub fn set_cash(&mut self, amount: Decimal) {
        let account = self.account_currency().to_string();
        self.cash_book.set_amount(&account, amount);
    }

    /// Rate converting the security's quote currency into account currency.
    ///
    /// Zero when the quote currency is missing from the cash book.
    #[must_use]
    pub fn quote_conversion_rate(&self, security: &Security) -> Decimal {
        self.cash_book
            .conversion_rate(security.quote_currency())
            .unwrap_or(Decimal::ZERO)
    }

    /// Signed holdings value of one security in account currency.
    #[must_use]
    pub fn holdings_value(&self, security: &Security) -> Decimal {
        security.holdings_value() * self.quote_conversion_rate(security)
    }

    /// Sum of signed holdings values in account currency.
    #[must_use]
    pub fn total_holdings_value(&self) -> Decimal {
        self.securities
            .all()
            .map(|security| self.holdings_value(security))
            .sum()
    }

    /// Sum of absolute holdings values in account currency.
    #[must_use]
    pub fn total_absolute_holdings_value(&self) -> Decimal {
        self.securities
            .all()
            .map(|security| self.holdings_value(security).abs())
            .sum()
    }

    /// Unrealized profit over all holdings in account currency.
    #[must_use]
    pub fn total_unrealized_profit(&self) -> Decimal {
        self.securities
            .all()
            .map(|security| {
                security
                    .holdings()
                    .unrealized_profit(security.properties().contract_multiplier)
                    * self.quote_conversion_rate(security)
            })
            .sum()
    }

    /// Fees paid over all holdings in account currency.
    #[must_use]
    pub fn total_fees(&self) -> Decimal {
        self.securities
            .all()
            .map(|security| security.holdings().total_fees())
            .sum()
    }

    /// Cash plus holdings value.
    #[must_use]
    pub fn total_portfolio_value(&self) -> Decimal {
        self.cash_book.total_value_in_account_currency() + self.total_holdings_value()
    }

    /// Margin reserved by all holdings.
    #[must_use]
    pub fn total_margin_used(&self) -> Decimal {
        self.securities
            .all()
            .map(|security| {
                security
                    .buying_power_model()
                    .maintenance_margin(security, self.quote_conversion_rate(security))
            })
            .sum()
    }

    /// Portfolio value not reserved as margin.
    #[must_use]
    pub fn margin_remaining(&self) -> Decimal {
        self.total_portfolio_value() - self.total_margin_used()
    }

    /// Whether any security has holdings.
    #[must_use]
    pub fn invested(&self) -> bool {
        self.securities
            .all()
            .any(|security| security.holdings().invested())
    }

    /// Holding of a symbol, including removed securities kept for valuation.
    #[must_use]
    pub fn holding(&self, symbol: &Symbol) -> Option<&SecurityHolding> {
        self.securities.get_any(symbol).map(Security::holdings)
    }

    /// Signed quantity held, zero if unknown.
    #[must_use]
    pub fn quantity(&self, symbol: &Symbol) -> Decimal {
        self.holding(symbol)
            .map_or(Decimal::ZERO, SecurityHolding::quantity)
    }

    /// Buying power inputs for an active security.
    #[must_use]
    pub fn buying_power_context(&self, symbol: &Symbol) -> Option<BuyingPowerContext<'_>> {
        let security = self.securities.get(symbol)?;
        Some(BuyingPowerContext {
            security,
            quote_conversion_rate: self.quote_conversion_rate(security),
            total_portfolio_value: self.total_portfolio_value(),
            margin_remaining: self.margin_remaining(),
        })
    }

    /// Apply a signed fill: update holdings, settle cash in the quote
    /// currency and charge the fee. Returns the realized profit in quote
    /// currency.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is unknown.
    pub fn apply_fill(
        &mut self,
        symbol: &Symbol,
        quantity: Decimal,
        price: Decimal,
        fee: &OrderFee,
    ) -> Result<Decimal, DomainError> {
        let fee_in_account = self
            .cash_book
            .convert_to_account_currency(fee.amount, &fee.currency)
            .unwrap_or(fee.amount);

        let security = self
            .securities
            .get_any_mut(symbol)
            .ok_or_else(|| DomainError::SecurityNotFound(symbol.to_string()))?;

        let multiplier = security.properties().contract_multiplier;
        let realized = security
            .holdings_mut()
            .apply_fill(quantity, price, multiplier);
        security.holdings_mut().add_fee(fee_in_account);
        let quote = security.quote_currency().to_string();

        self.cash_book
            .add_amount(&quote, -(quantity * price * multiplier));
        if !fee.amount.is_zero() {
            self.cash_book.add_amount(&fee.currency, -fee.amount);
        }
        self.securities.prune_inactive();

        Ok(realized)
    }
}
