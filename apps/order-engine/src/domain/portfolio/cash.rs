//! Cash ledger keyed by currency code.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cash {
    /// Currency code.
    pub currency: String,
    /// Amount held.
    pub amount: Decimal,
    /// Rate converting one unit into account currency.
    pub conversion_rate: Decimal,
}

impl Cash {
    /// Value in account currency.
    #[must_use]
    pub fn value_in_account_currency(&self) -> Decimal {
        self.amount * self.conversion_rate
    }
}

/// Cash balances and conversion rates.
///
/// The account currency always exists with a rate of one. Rates of other
/// currencies are set by the caller; the book only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashBook {
    account_currency: String,
    entries: BTreeMap<String, Cash>,
}

impl CashBook {
    /// Book with a zero balance in the account currency.
    #[must_use]
    pub fn new(account_currency: impl Into<String>) -> Self {
        let account_currency = account_currency.into();
        let mut entries = BTreeMap::new();
        entries.insert(
            account_currency.clone(),
            Cash {
                currency: account_currency.clone(),
                amount: Decimal::ZERO,
                conversion_rate: Decimal::ONE,
            },
        );
        Self {
            account_currency,
            entries,
        }
    }

    /// Account currency code.
    #[must_use]
    pub fn account_currency(&self) -> &str {
        &self.account_currency
    }

    /// Add or replace a currency entry.
    pub fn add(&mut self, currency: impl Into<String>, amount: Decimal, conversion_rate: Decimal) {
        let currency = currency.into();
        let conversion_rate = if currency == self.account_currency {
            Decimal::ONE
        } else {
            conversion_rate
        };
        self.entries.insert(
            currency.clone(),
            Cash {
                currency,
                amount,
                conversion_rate,
            },
        );
    }

    /// Ensure an entry exists, with zero amount and zero rate if new.
    pub fn ensure(&mut self, currency: &str) {
        if !self.entries.contains_key(currency) {
            self.add(currency, Decimal::ZERO, Decimal::ZERO);
        }
    }

    /// Entry for a currency.
    #[must_use]
    pub fn get(&self, currency: &str) -> Option<&Cash> {
        self.entries.get(currency)
    }

    /// Whether the book has a currency.
    #[must_use]
    pub fn contains(&self, currency: &str) -> bool {
        self.entries.contains_key(currency)
    }

    /// Remove a currency. The account currency cannot be removed.
    pub fn remove(&mut self, currency: &str) -> Option<Cash> {
        if currency == self.account_currency {
            return None;
        }
        self.entries.remove(currency)
    }

    /// Conversion rate of a currency.
    #[must_use]
    pub fn conversion_rate(&self, currency: &str) -> Option<Decimal> {
        self.entries.get(currency).map(|cash| cash.conversion_rate)
    }

    /// Set the conversion rate of a currency, adding it if missing.
    pub fn set_conversion_rate(&mut self, currency: &str, rate: Decimal) {
        if currency == self.account_currency {
            return;
        }
        match self.entries.get_mut(currency) {
            Some(cash) => cash.conversion_rate = rate,
            None => self.add(currency, Decimal::ZERO, rate),
        }
    }

    /// Set the amount held in a currency, adding it if missing.
    pub fn set_amount(&mut self, currency: &str, amount: Decimal) {
        self.ensure(currency);
        if let Some(cash) = self.entries.get_mut(currency) {
            cash.amount = amount;
        }
    }

    /// Add a signed delta to a currency balance.
    pub fn add_amount(&mut self, currency: &str, delta: Decimal) {
        self.ensure(currency);
        if let Some(cash) = self.entries.get_mut(currency) {
            cash.amount += delta;
        }
    }

    /// Convert an amount in `currency` into account currency.
    #[must_use]
    pub fn convert_to_account_currency(&self, amount: Decimal, currency: &str) -> Option<Decimal> {
        self.conversion_rate(currency).map(|rate| amount * rate)
    }

    /// Sum of all balances in account currency.
    #[must_use]
    pub fn total_value_in_account_currency(&self) -> Decimal {
        self.entries.values().map(Cash::value_in_account_currency).sum()
    }

    /// All entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Cash> {
        self.entries.values()
    }
}
