//! Option Strategies Bounded Context
//!
//! Stateless templates of option and underlying legs relative to one
//! canonical option chain, plus factories for the common named strategies.

mod definition;
pub mod factory;

pub use definition::{OptionLegData, OptionStrategy, UnderlyingLegData};
