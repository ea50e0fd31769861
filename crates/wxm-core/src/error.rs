//! # Error Types
//!
//! Construction-time failures for wxm. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! Validation findings are never represented here: a manifest that breaks
//! the rules is still a perfectly good input, and its problems are reported
//! as diagnostics by the rule engine. Only failures that prevent an engine
//! from being built at all are errors.

use thiserror::Error;

/// Top-level error type for wxm.
#[derive(Error, Debug)]
pub enum WxmError {
    /// Unknown target or an inconsistent rule table.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The document file could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path (or label) of the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The document parsed but is not a key/value mapping.
    #[error("document shape error: {0}")]
    DocumentShape(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the workspace.
pub type WxmResult<T> = Result<T, WxmError>;
