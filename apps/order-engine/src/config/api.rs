//! Platform API client configuration.

use serde::{Deserialize, Serialize};

/// Platform API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Numeric user id. Empty disables the API.
    #[serde(default)]
    pub user_id: String,
    /// API token.
    #[serde(default)]
    pub token: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Whether credentials are configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.user_id.is_empty() && !self.token.is_empty()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: String::new(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.quantconnect.com/api/v2".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}
