//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.
//! Value objects are compared by value, not identity.

mod identifiers;
mod symbol;

pub use identifiers::OrderId;
pub use symbol::{
    MARKET_COINBASE, MARKET_OANDA, MARKET_USA, OptionDetails, OptionRight, OptionStyle,
    SecurityType, Symbol,
};
