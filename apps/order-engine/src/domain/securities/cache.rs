//! Per-security computed state.

use std::collections::{HashMap, VecDeque};

use rust_decimal::Decimal;

use super::Bar;

/// Default number of closes kept in the rolling window.
const DEFAULT_WINDOW_SIZE: usize = 20;

/// Cached market data and derived values for one security.
///
/// Everything here is reset when the security is removed from the registry.
#[derive(Debug, Clone)]
pub struct SecurityCache {
    last_bar: Option<Bar>,
    price: Decimal,
    window: VecDeque<Decimal>,
    window_size: usize,
    values: HashMap<String, Decimal>,
}

impl Default for SecurityCache {
    fn default() -> Self {
        Self::with_window_size(DEFAULT_WINDOW_SIZE)
    }
}

impl SecurityCache {
    /// Cache keeping `window_size` closes.
    #[must_use]
    pub fn with_window_size(window_size: usize) -> Self {
        Self {
            last_bar: None,
            price: Decimal::ZERO,
            window: VecDeque::with_capacity(window_size),
            window_size,
            values: HashMap::new(),
        }
    }

    /// Store a new bar.
    pub fn update(&mut self, bar: Bar) {
        self.price = bar.close;
        if self.window_size > 0 {
            if self.window.len() == self.window_size {
                self.window.pop_front();
            }
            self.window.push_back(bar.close);
        }
        self.last_bar = Some(bar);
    }

    /// Seed a price without marking the security as having data.
    pub const fn set_price(&mut self, price: Decimal) {
        self.price = price;
    }

    /// Last price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Last bar received.
    #[must_use]
    pub const fn last_bar(&self) -> Option<&Bar> {
        self.last_bar.as_ref()
    }

    /// Whether any bar has been received since the last reset.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.last_bar.is_some()
    }

    /// Rolling window of closes, oldest first.
    pub fn price_window(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.window.iter().copied()
    }

    /// Mean of the rolling window.
    #[must_use]
    pub fn window_mean(&self) -> Option<Decimal> {
        if self.window.is_empty() {
            return None;
        }
        let sum: Decimal = self.window.iter().sum();
        Some(sum / Decimal::from(self.window.len()))
    }

    /// Store a named value.
    pub fn store(&mut self, key: impl Into<String>, value: Decimal) {
        self.values.insert(key.into(), value);
    }

    /// Read a named value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.values.get(key).copied()
    }

    /// Drop all cached state.
    pub fn reset(&mut self) {
        self.last_bar = None;
        self.price = Decimal::ZERO;
        self.window.clear();
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn window_is_bounded() {
        let mut cache = SecurityCache::with_window_size(2);
        for close in [dec!(1), dec!(2), dec!(3)] {
            cache.update(Bar::flat(Utc::now(), close, dec!(10)));
        }
        assert_eq!(cache.price_window().collect::<Vec<_>>(), vec![dec!(2), dec!(3)]);
        assert_eq!(cache.window_mean(), Some(dec!(2.5)));
        assert_eq!(cache.price(), dec!(3));
    }

    #[test]
    fn seeded_price_has_no_data() {
        let mut cache = SecurityCache::default();
        cache.set_price(dec!(42));
        assert_eq!(cache.price(), dec!(42));
        assert!(!cache.has_data());
    }

    #[test]
    fn reset_clears_everything() {
        let mut cache = SecurityCache::default();
        cache.update(Bar::flat(Utc::now(), dec!(5), dec!(1)));
        cache.store("sma", dec!(5));
        cache.reset();
        assert!(!cache.has_data());
        assert_eq!(cache.price(), Decimal::ZERO);
        assert_eq!(cache.get("sma"), None);
        assert_eq!(cache.price_window().count(), 0);
    }
}
