//! Error types for the refix crate.

use std::path::PathBuf;

/// Refix-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum RefixError {
    /// A regex-mode pattern failed to compile.
    #[error("invalid regex pattern `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    /// A pattern was constructed with an empty before-template.
    #[error("pattern has an empty before-template")]
    EmptyBefore,

    /// git binary not found on PATH.
    #[error("git not found on PATH — install git or mine from a patch file instead")]
    GitNotFound,

    /// Subprocess execution failed.
    #[error("subprocess failed: {command}: {reason}")]
    SubprocessFailed { command: String, reason: String },

    /// Rule file missing at the specified path.
    #[error("rule file not found: {path}")]
    RuleFileNotFound { path: PathBuf },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error with context.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type for refix operations.
pub type RefixResult<T> = Result<T, RefixError>;
