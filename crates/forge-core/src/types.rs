//! # Core Types
//!
//! Error taxonomy and small shared helpers for the Forge pipeline.

use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Which registry a missing lookup was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    Bridge,
    Processor,
    Primitive,
}

impl std::fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Bridge => "Bridge",
            Self::Processor => "Processor",
            Self::Primitive => "Primitive",
        };
        f.write_str(name)
    }
}

/// Root error type for all Forge failures.
///
/// Validation and lookup failures never touch orchestrator state. Counters
/// already advanced before an error are not rolled back.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Missing field, out-of-range parameter or malformed construction.
    #[error("validation error: {0}")]
    Validation(String),

    /// A bridge id, processor id or primitive name absent from its registry.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: RegistryKind, id: String },

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// I/O failure (config files, listener sockets).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything unexpected.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ForgeError {
    /// Shorthand for a [`ForgeError::NotFound`].
    pub fn not_found(kind: RegistryKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type ForgeResult<T> = Result<T, ForgeError>;

// =============================================================================
// HELPERS
// =============================================================================

/// Clamp a score into `[0, 1]`, mapping non-finite values to 0.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Current UTC time as an RFC 3339 string.
#[must_use]
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
