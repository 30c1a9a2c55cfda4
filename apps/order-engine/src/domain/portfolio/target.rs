//! Portfolio allocation target.

use rust_decimal::Decimal;

use crate::domain::shared::Symbol;

/// Desired holding of a symbol as a fraction of portfolio value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioTarget {
    /// Symbol to hold.
    pub symbol: Symbol,
    /// Signed fraction of total portfolio value (1 = 100% long).
    pub percent: Decimal,
}

impl PortfolioTarget {
    /// Create a target.
    #[must_use]
    pub fn new(symbol: Symbol, percent: impl Into<Decimal>) -> Self {
        Self {
            symbol,
            percent: percent.into(),
        }
    }
}
