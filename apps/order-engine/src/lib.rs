// Allow unwrap/expect and test-only patterns in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Order Engine - Rust Core Library
//!
//! Single-timeline order-execution and portfolio-rebalancing kernel with a
//! typed client for the algorithm hosting platform's REST API.
//!
//! # Architecture
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: value objects, securities, portfolio and strategy templates
//!   - `order_execution`: requests, tickets, status lifecycle, responses
//!   - `securities`: price cache, holdings, buying power and fee models
//!   - `portfolio`: cash book and valuation
//!   - `option_strategies`: multi-leg templates and named factories
//!
//! - **Application**: the engine
//!   - `validator`: ordered pre-order checks
//!   - `router`: order book, lot rounding, rerouting, fills, exercise
//!   - `sizing`, `liquidation`, `strategy_orders`: request builders
//!   - `algorithm`: caller facade and simulation driver
//!
//! - **Infrastructure**: adapters
//!   - `api`: authenticated JSON-over-HTTP platform client

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Business types with no external dependencies.
pub mod domain;

/// Application layer - Order routing, sizing and the algorithm facade.
pub mod application;

/// Infrastructure layer - Platform API client.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Fatal engine errors.
pub mod error;

/// Logging setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::{Algorithm, AlgorithmSettings, AlgorithmStatus};
pub use domain::option_strategies::{OptionLegData, OptionStrategy, UnderlyingLegData};
pub use domain::order_execution::{
    OrderResponse, OrderResponseErrorCode, OrderStatus, OrderTicket, OrderType,
    SubmitOrderRequest, TimeInForce,
};
pub use domain::portfolio::{Portfolio, PortfolioTarget};
pub use domain::securities::{Bar, Resolution, Security, SymbolProperties};
pub use domain::shared::{OptionRight, OptionStyle, OrderId, SecurityType, Symbol};
pub use error::EngineError;
