//! Time in force and custom order properties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How long an order stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Open until filled or canceled.
    #[default]
    GoodTilCanceled,
    /// Canceled when the security's exchange closes.
    Day,
}

/// Optional properties attached to an order request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderProperties {
    /// Time in force.
    #[serde(default)]
    pub time_in_force: TimeInForce,
    /// Free-form key/value properties carried through to the ticket.
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

impl OrderProperties {
    /// Properties with the given time in force.
    #[must_use]
    pub fn with_time_in_force(time_in_force: TimeInForce) -> Self {
        Self {
            time_in_force,
            custom: BTreeMap::new(),
        }
    }

    /// Add a custom property.
    #[must_use]
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }
}
