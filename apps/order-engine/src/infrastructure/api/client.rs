//! HTTP client for the platform API.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::auth::AuthHeaders;
use super::error::ApiError;
use super::models::{
    ApiResponse, BacktestList, BacktestResult, Compile, LiveAlgorithm, LiveAlgorithmList, LiveLog,
    NoData, NodeList, NodeResult, OrganizationResult, ProjectFileList, ProjectList,
};
use crate::config::ApiConfig;

/// Authenticated platform API client. Requests are never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    user_id: String,
    token: String,
}

impl ApiClient {
    /// Create a client from config.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            token: config.token.clone(),
        })
    }

    // ============================================
    // Authentication
    // ============================================

    /// Check the credentials.
    pub async fn authenticate(&self) -> ApiResponse<NoData> {
        self.post("authenticate", &json!({})).await
    }

    // ============================================
    // Projects
    // ============================================

    /// Create a project.
    pub async fn create_project(&self, name: &str, language: &str) -> ApiResponse<ProjectList> {
        self.post("projects/create", &json!({ "name": name, "language": language }))
            .await
    }

    /// Read one project.
    pub async fn read_project(&self, project_id: i64) -> ApiResponse<ProjectList> {
        self.post("projects/read", &json!({ "projectId": project_id }))
            .await
    }

    /// List every project.
    pub async fn list_projects(&self) -> ApiResponse<ProjectList> {
        self.post("projects/read", &json!({})).await
    }

    /// Rename a project and set its description.
    pub async fn update_project(
        &self,
        project_id: i64,
        name: &str,
        description: &str,
    ) -> ApiResponse<NoData> {
        self.post(
            "projects/update",
            &json!({ "projectId": project_id, "name": name, "description": description }),
        )
        .await
    }

    /// Delete a project.
    pub async fn delete_project(&self, project_id: i64) -> ApiResponse<NoData> {
        self.post("projects/delete", &json!({ "projectId": project_id }))
            .await
    }

    // ============================================
    // Files
    // ============================================

    /// Add a file to a project.
    pub async fn add_project_file(
        &self,
        project_id: i64,
        name: &str,
        content: &str,
    ) -> ApiResponse<ProjectFileList> {
        self.post(
            "files/create",
            &json!({ "projectId": project_id, "name": name, "content": content }),
        )
        .await
    }

    /// Read every file of a project.
    pub async fn read_project_files(&self, project_id: i64) -> ApiResponse<ProjectFileList> {
        self.post("files/read", &json!({ "projectId": project_id }))
            .await
    }

    /// Read one file of a project.
    pub async fn read_project_file(&self, project_id: i64, name: &str) -> ApiResponse<ProjectFileList> {
        self.post("files/read", &json!({ "projectId": project_id, "name": name }))
            .await
    }

    /// Replace the content of a file.
    pub async fn update_project_file_content(
        &self,
        project_id: i64,
        name: &str,
        content: &str,
    ) -> ApiResponse<NoData> {
        self.post(
            "files/update",
            &json!({ "projectId": project_id, "name": name, "content": content }),
        )
        .await
    }

    /// Rename a file.
    pub async fn update_project_file_name(
        &self,
        project_id: i64,
        old_name: &str,
        new_name: &str,
    ) -> ApiResponse<NoData> {
        self.post(
            "files/update",
            &json!({ "projectId": project_id, "name": old_name, "newName": new_name }),
        )
        .await
    }

    /// Delete a file.
    pub async fn delete_project_file(&self, project_id: i64, name: &str) -> ApiResponse<NoData> {
        self.post("files/delete", &json!({ "projectId": project_id, "name": name }))
            .await
    }

    // ============================================
    // Compile
    // ============================================

    /// Start a compile job.
    pub async fn create_compile(&self, project_id: i64) -> ApiResponse<Compile> {
        self.post("compile/create", &json!({ "projectId": project_id }))
            .await
    }

    /// Read a compile job.
    pub async fn read_compile(&self, project_id: i64, compile_id: &str) -> ApiResponse<Compile> {
        self.post(
            "compile/read",
            &json!({ "projectId": project_id, "compileId": compile_id }),
        )
        .await
    }

    // ============================================
    // Backtests
    // ============================================

    /// Start a backtest of a compiled project.
    pub async fn create_backtest(
        &self,
        project_id: i64,
        compile_id: &str,
        name: &str,
    ) -> ApiResponse<BacktestResult> {
        self.post(
            "backtests/create",
            &json!({ "projectId": project_id, "compileId": compile_id, "backtestName": name }),
        )
        .await
    }

    /// Read a backtest.
    pub async fn read_backtest(&self, project_id: i64, backtest_id: &str) -> ApiResponse<BacktestResult> {
        self.post(
            "backtests/read",
            &json!({ "projectId": project_id, "backtestId": backtest_id }),
        )
        .await
    }

    /// Rename a backtest and set its note.
    pub async fn update_backtest(
        &self,
        project_id: i64,
        backtest_id: &str,
        name: &str,
        note: &str,
    ) -> ApiResponse<NoData> {
        self.post(
            "backtests/update",
            &json!({
                "projectId": project_id,
                "backtestId": backtest_id,
                "name": name,
                "note": note,
            }),
        )
        .await
    }

    /// Delete a backtest.
    pub async fn delete_backtest(&self, project_id: i64, backtest_id: &str) -> ApiResponse<NoData> {
        self.post(
            "backtests/delete",
            &json!({ "projectId": project_id, "backtestId": backtest_id }),
        )
        .await
    }

    /// List the backtests of a project.
    pub async fn list_backtests(&self, project_id: i64) -> ApiResponse<BacktestList> {
        self.post("backtests/list", &json!({ "projectId": project_id }))
            .await
    }

    // ============================================
    // Live Algorithms
    // ============================================

    /// Deploy a compiled project live.
    ///
    /// `brokerage_settings` is passed through untouched.
    pub async fn create_live_algorithm(
        &self,
        project_id: i64,
        compile_id: &str,
        node_id: &str,
        brokerage_settings: Value,
    ) -> ApiResponse<LiveAlgorithm> {
        self.post(
            "live/create",
            &json!({
                "projectId": project_id,
                "compileId": compile_id,
                "nodeId": node_id,
                "brokerage": brokerage_settings,
                "versionId": "-1",
            }),
        )
        .await
    }

    /// Read a live deployment.
    pub async fn read_live_algorithm(&self, project_id: i64, deploy_id: &str) -> ApiResponse<LiveAlgorithm> {
        self.post(
            "live/read",
            &json!({ "projectId": project_id, "deployId": deploy_id }),
        )
        .await
    }

    /// List live deployments, optionally filtered by status.
    pub async fn list_live_algorithms(&self, status: Option<&str>) -> ApiResponse<LiveAlgorithmList> {
        let params = status.map_or_else(|| json!({}), |status| json!({ "status": status }));
        self.post("live/list", &params).await
    }

    /// Liquidate a live deployment.
    pub async fn liquidate_live_algorithm(&self, project_id: i64) -> ApiResponse<NoData> {
        self.post("live/update/liquidate", &json!({ "projectId": project_id }))
            .await
    }

    /// Stop a live deployment.
    pub async fn stop_live_algorithm(&self, project_id: i64) -> ApiResponse<NoData> {
        self.post("live/update/stop", &json!({ "projectId": project_id }))
            .await
    }

    /// Read live log lines between two Unix timestamps.
    pub async fn read_live_logs(
        &self,
        project_id: i64,
        algorithm_id: &str,
        start: i64,
        end: i64,
    ) -> ApiResponse<LiveLog> {
        self.post(
            "live/read/log",
            &json!({
                "format": "json",
                "projectId": project_id,
                "algorithmId": algorithm_id,
                "start": start,
                "end": end,
            }),
        )
        .await
    }

    // ============================================
    // Nodes
    // ============================================

    /// Create a node.
    pub async fn create_node(&self, name: &str, organization_id: &str, sku: &str) -> ApiResponse<NodeResult> {
        self.post(
            "nodes/create",
            &json!({ "name": name, "organizationId": organization_id, "sku": sku }),
        )
        .await
    }

    /// List the nodes of an organization.
    pub async fn read_nodes(&self, organization_id: &str) -> ApiResponse<NodeList> {
        self.post("nodes/read", &json!({ "organizationId": organization_id }))
            .await
    }

    /// Rename a node.
    pub async fn update_node(&self, node_id: &str, new_name: &str, organization_id: &str) -> ApiResponse<NoData> {
        self.post(
            "nodes/update",
            &json!({ "nodeId": node_id, "name": new_name, "organizationId": organization_id }),
        )
        .await
    }

    /// Delete a node.
    pub async fn delete_node(&self, node_id: &str, organization_id: &str) -> ApiResponse<NoData> {
        self.post(
            "nodes/delete",
            &json!({ "nodeId": node_id, "organizationId": organization_id }),
        )
        .await
    }

    /// Stop the job running on a node.
    pub async fn stop_node(&self, node_id: &str, organization_id: &str) -> ApiResponse<NoData> {
        self.post(
            "nodes/stop",
            &json!({ "nodeId": node_id, "organizationId": organization_id }),
        )
        .await
    }

    // ============================================
    // Organizations
    // ============================================

    /// Read an organization. An empty id reads the default organization.
    pub async fn read_organization(&self, organization_id: &str) -> ApiResponse<OrganizationResult> {
        let params = if organization_id.is_empty() {
            json!({})
        } else {
            json!({ "organizationId": organization_id })
        };
        self.post("organizations/read", &params).await
    }

    /// POST `params` to `endpoint` and decode the envelope.
    async fn post<T>(&self, endpoint: &str, params: &Value) -> ApiResponse<T>
    where
        T: DeserializeOwned + Default,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        let auth = AuthHeaders::new(&self.user_id, &self.token, Utc::now().timestamp());
        debug!(endpoint = %endpoint, "API request");

        let response = match self
            .client
            .post(&url)
            .header("Timestamp", &auth.timestamp)
            .basic_auth(&auth.user_id, Some(&auth.password))
            .json(params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Self::failed(endpoint, &ApiError::Network(e.to_string())),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Self::failed(endpoint, &ApiError::Network(e.to_string())),
        };

        match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(decoded) => {
                if !decoded.success {
                    warn!(endpoint = %endpoint, errors = ?decoded.errors, "API call failed");
                }
                decoded
            }
            Err(_) if !status.is_success() => Self::failed(
                endpoint,
                &ApiError::Http {
                    status: status.as_u16(),
                    body,
                },
            ),
            Err(e) => Self::failed(endpoint, &ApiError::JsonParse(e.to_string())),
        }
    }

    fn failed<T: Default>(endpoint: &str, error: &ApiError) -> ApiResponse<T> {
        warn!(endpoint = %endpoint, error = %error, "API request failed");
        ApiResponse::failure(error)
    }
}
