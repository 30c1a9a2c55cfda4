//! Securities Bounded Context
//!
//! Runtime state of tradable instruments and the registry that owns them.
//!
//! - [`Security`]: price cache, holdings, exchange state and per-security models
//! - [`SecurityManager`]: registry keyed by [`Symbol`](crate::domain::shared::Symbol)
//! - [`BuyingPowerModel`] / [`FeeModel`]: capability traits selected per security

mod bar;
mod buying_power;
mod cache;
mod fee_model;
mod holding;
mod manager;
mod properties;
mod security;

pub use bar::Bar;
pub use buying_power::{
    BuyingPowerContext, BuyingPowerModel, BuyingPowerResult, NullBuyingPowerModel,
    SecurityMarginModel,
};
pub use cache::SecurityCache;
pub use fee_model::{ConstantFeeModel, FeeModel, PerUnitFeeModel};
pub use holding::SecurityHolding;
pub use manager::SecurityManager;
pub use properties::{ExchangeState, Resolution, SymbolProperties, round_to_lot};
pub use security::Security;
