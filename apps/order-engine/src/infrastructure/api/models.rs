//! Request and response types of the platform API.
//!
//! Field names follow the API's camelCase JSON. Every payload type defaults
//! missing fields so a failed call still decodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::ApiError;

// ============================================================================
// Response Wrapper
// ============================================================================

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    #[serde(default)]
    pub success: bool,
    /// Error messages when the call failed.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Endpoint payload.
    #[serde(flatten)]
    pub data: T,
}

impl<T: Default> ApiResponse<T> {
    /// Failed response carrying `error` as its only message.
    #[must_use]
    pub fn failure(error: &ApiError) -> Self {
        Self {
            success: false,
            errors: vec![error.to_string()],
            data: T::default(),
        }
    }
}

/// Payload of endpoints that only report success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoData {}

// ============================================================================
// Projects and Files
// ============================================================================

/// Project summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    /// Project id.
    pub project_id: i64,
    /// Project name.
    pub name: String,
    /// Creation time as reported by the API.
    pub created: String,
    /// Last modification time as reported by the API.
    pub modified: String,
    /// Programming language.
    pub language: String,
    /// Description.
    pub description: String,
}

/// Payload listing projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectList {
    /// Projects.
    pub projects: Vec<Project>,
}

/// Project source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectFile {
    /// File name.
    pub name: String,
    /// File content.
    pub content: String,
    /// Last modification time as reported by the API.
    pub modified: String,
}

/// Payload listing project files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFileList {
    /// Files.
    pub files: Vec<ProjectFile>,
}

// ============================================================================
// Compile
// ============================================================================

/// Compile job state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompileState {
    /// Queued or running.
    #[default]
    InQueue,
    /// Build succeeded.
    BuildSuccess,
    /// Build failed.
    BuildError,
}

/// Compile job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Compile {
    /// Compile id.
    pub compile_id: String,
    /// State.
    pub state: CompileState,
    /// Build log lines.
    pub logs: Vec<String>,
}

// ============================================================================
// Backtests
// ============================================================================

/// Backtest summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Backtest {
    /// Backtest id.
    pub backtest_id: String,
    /// Backtest name.
    pub name: String,
    /// Note.
    pub note: String,
    /// Whether the backtest finished.
    pub completed: bool,
    /// Progress in [0, 1].
    pub progress: f64,
    /// Runtime error, if any.
    pub error: Option<String>,
    /// Summary statistics by name.
    pub statistics: BTreeMap<String, String>,
}

/// Payload carrying one backtest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestResult {
    /// Backtest.
    pub backtest: Backtest,
}

/// Payload listing backtests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestList {
    /// Backtests.
    pub backtests: Vec<Backtest>,
}

// ============================================================================
// Live Algorithms
// ============================================================================

/// Live algorithm deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveAlgorithm {
    /// Project id.
    pub project_id: i64,
    /// Deployment id.
    pub deploy_id: String,
    /// Status string as reported by the API.
    pub status: String,
    /// Launch time.
    pub launched: String,
    /// Stop time, if stopped.
    pub stopped: Option<String>,
    /// Brokerage name.
    pub brokerage: String,
}

/// Payload listing live algorithms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveAlgorithmList {
    /// Deployments.
    pub live: Vec<LiveAlgorithm>,
}

/// Payload of live log lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveLog {
    /// Log lines.
    #[serde(rename = "LiveLogs", alias = "logs")]
    pub logs: Vec<String>,
}

// ============================================================================
// Nodes and Organizations
// ============================================================================

/// Compute node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Node {
    /// Node id.
    pub id: String,
    /// Node name.
    pub name: String,
    /// Hardware SKU.
    pub sku: String,
    /// Whether the node is running a job.
    pub busy: bool,
    /// Monthly price.
    pub price: f64,
}

/// Payload carrying one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeResult {
    /// Node.
    pub node: Node,
}

/// Payload listing nodes by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeList {
    /// Backtest nodes.
    pub backtest: Vec<Node>,
    /// Research nodes.
    pub research: Vec<Node>,
    /// Live nodes.
    pub live: Vec<Node>,
}

/// Organization credit balance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credit {
    /// Balance.
    pub balance: f64,
}

/// Organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    /// Organization id.
    pub id: String,
    /// Name.
    pub name: String,
    /// Seats.
    pub seats: u32,
    /// Credit.
    pub credit: Credit,
}

/// Payload carrying an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationResult {
    /// Organization.
    pub organization: Organization,
}
