//! Security registry.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use super::Security;
use crate::domain::shared::Symbol;

/// Registry of subscribed securities keyed by symbol.
///
/// Removing a security resets its cache. A removed security that still has
/// holdings is kept aside for valuation and handed back, with its holdings,
/// if the symbol is added again.
#[derive(Debug, Clone, Default)]
pub struct SecurityManager {
    active: BTreeMap<Symbol, Security>,
    inactive: BTreeMap<Symbol, Security>,
}

impl SecurityManager {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a security, returning the registered instance.
    ///
    /// Adding a symbol that is already active keeps the existing security.
    /// Re-adding a removed symbol registers the new security and moves the
    /// removed one's holdings onto it.
    pub fn add(&mut self, mut security: Security) -> &mut Security {
        let symbol = security.symbol().clone();
        let security = if let Some(existing) = self.active.remove(&symbol) {
            existing
        } else if let Some(mut previous) = self.inactive.remove(&symbol) {
            debug!(symbol = %symbol, "Re-activating removed security with holdings");
            *security.holdings_mut() = std::mem::take(previous.holdings_mut());
            let mark = security.holdings().market_price();
            if !mark.is_zero() {
                security.cache_mut().set_price(mark);
            }
            security
        } else {
            security
        };
        self.active.entry(symbol).or_insert(security)
    }

    /// Remove a security from the active set.
    ///
    /// Returns false if the symbol was not active.
    pub fn remove(&mut self, symbol: &Symbol) -> bool {
        let Some(mut security) = self.active.remove(symbol) else {
            return false;
        };
        security.cache_mut().reset();
        if security.holdings().invested() {
            self.inactive.insert(symbol.clone(), security);
        }
        debug!(symbol = %symbol, "Security removed");
        true
    }

    /// Active security.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<&Security> {
        self.active.get(symbol)
    }

    /// Mutable active security.
    pub fn get_mut(&mut self, symbol: &Symbol) -> Option<&mut Security> {
        self.active.get_mut(symbol)
    }

    /// Whether the symbol is active.
    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.active.contains_key(symbol)
    }

    /// Active security or a removed one kept for its holdings.
    #[must_use]
    pub fn get_any(&self, symbol: &Symbol) -> Option<&Security> {
        self.active.get(symbol).or_else(|| self.inactive.get(symbol))
    }

    /// Mutable active or removed security.
    pub fn get_any_mut(&mut self, symbol: &Symbol) -> Option<&mut Security> {
        match self.active.get_mut(symbol) {
            Some(security) => Some(security),
            None => self.inactive.get_mut(symbol),
        }
    }

    /// Active symbols in key order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.active.keys()
    }

    /// Active securities in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Security> {
        self.active.values()
    }

    /// Mutable active securities.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Security> {
        self.active.values_mut()
    }

    /// Every security contributing to portfolio value.
    pub fn all(&self) -> impl Iterator<Item = &Security> {
        self.active.values().chain(self.inactive.values())
    }

    /// Number of active securities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no security is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop removed securities whose holdings have been closed.
    pub fn prune_inactive(&mut self) {
        self.inactive
            .retain(|_, security| security.holdings().quantity() != Decimal::ZERO);
    }
}
