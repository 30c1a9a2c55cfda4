//! Domain Layer
//!
//! Business types with no infrastructure dependencies.
//!
//! # Bounded Contexts
//!
//! - [`order_execution`]: Order requests, tickets and the status lifecycle
//! - [`securities`]: Security state, registry, buying power and fee models
//! - [`portfolio`]: Cash book and portfolio valuation
//! - [`option_strategies`]: Multi-leg option strategy templates

pub mod option_strategies;
pub mod order_execution;
pub mod portfolio;
pub mod securities;
pub mod shared;
