//! Identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential order identifier assigned by the order router.
///
/// Id `0` is reserved for requests rejected before reaching the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Id carried by tickets whose request never reached the order book.
    pub const UNASSIGNED: Self = Self(0);

    /// Create a new order id.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Whether the id was assigned by the order book.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_is_zero() {
        assert_eq!(OrderId::UNASSIGNED.value(), 0);
        assert!(!OrderId::UNASSIGNED.is_assigned());
        assert!(OrderId::new(1).is_assigned());
    }

    #[test]
    fn ids_order_numerically() {
        assert!(OrderId::new(2) < OrderId::new(10));
        assert_eq!(OrderId::new(42).to_string(), "42");
    }
}
