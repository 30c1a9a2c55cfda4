//! Fill simulation configuration.

use serde::{Deserialize, Serialize};

/// Fill simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillsConfig {
    /// Maximum fraction of a bar's volume one fill may take. Unset means
    /// orders always fill completely.
    #[serde(default)]
    pub partial_fill_volume_fraction: Option<f64>,
}
