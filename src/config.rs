//! Configuration for the health controller.

use serde::{Deserialize, Serialize};

use crate::error::{HealthError, Result};

/// Tunable parameters for the health controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct HealthConfig {
    /// Days before today included in the weekly step total.
    /// Default: 7 (today plus the previous seven days)
    pub week_lookback_days: u32,

    /// Label shown for exercises read for today.
    pub today_label: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            week_lookback_days: 7,
            today_label: "Today".to_string(),
        }
    }
}

impl HealthConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| HealthError::InvalidRequest {
            code: crate::error::UNKNOWN_ERROR_CODE,
            detail: format!("invalid config: {}", e),
        })
    }
}
