//! Domain errors for the order engine.

use std::fmt;

/// Value-object and aggregate errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Symbol failed validation.
    InvalidSymbol {
        /// Symbol value as given.
        symbol: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Strategy legs cannot be built from the given strikes or expirations.
    InvalidStrategy(String),

    /// Fill or lookup against a security the portfolio does not hold.
    SecurityNotFound(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSymbol { symbol, reason } => {
                write!(f, "Invalid symbol '{symbol}': {reason}")
            }
            Self::InvalidStrategy(message) => write!(f, "Invalid option strategy: {message}"),
            Self::SecurityNotFound(symbol) => {
                write!(f, "Security {symbol} is not in the portfolio")
            }
        }
    }
}

impl std::error::Error for DomainError {}
