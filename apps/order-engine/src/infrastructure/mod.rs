//! Infrastructure Layer
//!
//! Adapters for systems outside the simulation timeline.
//!
//! - `api/`: typed JSON-over-HTTP client for the algorithm hosting platform

pub mod api;
