//! Application Layer
//!
//! Orchestrates the domain for one algorithm run:
//!
//! - **Algorithm**: caller facade and simulation driver
//! - **Router**: pre-order validation, order book and fills
//! - **Sizing / Liquidation / Strategy orders**: request builders on top of the router

pub mod algorithm;
pub mod fills;
pub mod liquidation;
pub mod router;
pub mod settings;
pub mod sizing;
pub mod strategy_orders;
pub mod validator;

pub use algorithm::{Algorithm, AlgorithmStatus};
pub use fills::{FillLimits, FillResult};
pub use router::{OrderRouter, SubmitContext};
pub use settings::{AlgorithmSettings, DEFAULT_MAX_ORDERS};
pub use validator::{OrderValidator, Rejection, ValidationContext};
