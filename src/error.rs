//! Unified error handling for health data queries.
//!
//! The health data SDK reports failures through a small class hierarchy
//! (resolvable, authorization, invalid request, platform internal). Here each
//! category is one variant of [`HealthError`], so callers match on the tag
//! instead of inspecting runtime types. Anything that does not fit one of the
//! SDK categories is a plain [`HealthError::DataAccess`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code used when the source did not report one.
pub const UNKNOWN_ERROR_CODE: i32 = 0;

/// Unified error type for health data operations.
///
/// The message field is named `detail` because Kotlin exceptions already
/// carry a `message` property.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HealthError {
    /// The platform can fix this itself, e.g. by prompting the user to
    /// install or update the health app.
    #[error("{detail} (code: {code})")]
    Resolvable {
        code: i32,
        detail: String,
        has_resolution: bool,
    },
    /// The user has not granted access, or the grant was revoked.
    #[error("Authorization failed: {detail} (code: {code})")]
    Authorization { code: i32, detail: String },
    /// The request itself was malformed (bad window, unknown data type).
    #[error("Invalid request: {detail} (code: {code})")]
    InvalidRequest { code: i32, detail: String },
    /// The health platform failed internally.
    #[error("Platform internal error: {detail} (code: {code})")]
    PlatformInternal { code: i32, detail: String },
    /// Any other failure to retrieve or parse the requested window.
    #[error("Data access failed: {detail} (code: {code})")]
    DataAccess { code: i32, detail: String },
}

impl HealthError {
    /// Build a generic data-access failure with no SDK error code.
    pub fn data_access(message: impl Into<String>) -> Self {
        HealthError::DataAccess {
            code: UNKNOWN_ERROR_CODE,
            detail: message.into(),
        }
    }

    /// Error code reported by the source.
    pub fn code(&self) -> i32 {
        match self {
            HealthError::Resolvable { code, .. }
            | HealthError::Authorization { code, .. }
            | HealthError::InvalidRequest { code, .. }
            | HealthError::PlatformInternal { code, .. }
            | HealthError::DataAccess { code, .. } => *code,
        }
    }

    /// Message reported by the source, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            HealthError::Resolvable { detail, .. }
            | HealthError::Authorization { detail, .. }
            | HealthError::InvalidRequest { detail, .. }
            | HealthError::PlatformInternal { detail, .. }
            | HealthError::DataAccess { detail, .. } => detail,
        }
    }

    /// Whether the host can run a recovery action for this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HealthError::Resolvable {
                has_resolution: true,
                ..
            }
        )
    }

    /// Short category name, used in log lines.
    pub fn category(&self) -> &'static str {
        match self {
            HealthError::Resolvable { .. } => "resolvable",
            HealthError::Authorization { .. } => "authorization",
            HealthError::InvalidRequest { .. } => "invalid_request",
            HealthError::PlatformInternal { .. } => "platform_internal",
            HealthError::DataAccess { .. } => "data_access",
        }
    }
}

/// Result type alias for health data operations.
pub type Result<T> = std::result::Result<T, HealthError>;
