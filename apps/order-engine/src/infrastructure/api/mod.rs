//! Platform API Client
//!
//! Project, compile, backtest, live algorithm, node and organization
//! management over authenticated JSON POST requests. Every call returns an
//! [`ApiResponse`]; transport and decoding failures come back as
//! `success = false` with the error message in `errors`.

mod auth;
mod client;
mod error;
mod models;

pub use auth::{AuthHeaders, token_hash};
pub use client::ApiClient;
pub use error::ApiError;
pub use models::{
    ApiResponse, Backtest, BacktestList, BacktestResult, Compile, CompileState, Credit,
    LiveAlgorithm, LiveAlgorithmList, LiveLog, Node, NodeList, NodeResult, NoData, Organization,
    OrganizationResult, Project, ProjectFile, ProjectFileList, ProjectList,
};
