//! Unified error types for the corral workspace.
//!
//! Translation failures and validation failures share one enum so callers
//! can refuse container creation on any `Err` without matching on origin.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CorralError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The external specification is structurally unusable.
    #[error("malformed spec file: {message}")]
    MalformedSpec {
        /// Description of the offending field or value.
        message: String,
    },

    /// A named constant has no known translation.
    #[error("unsupported {kind}: {name:?}")]
    Unsupported {
        /// Category of the constant (seccomp action, rlimit, ...).
        kind: &'static str,
        /// The name as it appeared in the specification.
        name: String,
    },

    /// A cgroup path could not be interpreted under the active naming scheme.
    #[error("invalid cgroup path {path:?}: {reason}")]
    InvalidCgroupPath {
        /// The declared path.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A systemd property annotation could not be coerced.
    #[error("invalid systemd property {name:?}: {message}")]
    InvalidSystemdProperty {
        /// Property name (without the annotation prefix).
        name: String,
        /// Description of the problem.
        message: String,
    },

    /// A configuration invariant failed.
    #[error("{check} check failed: {message}")]
    Validation {
        /// Name of the failing check.
        check: &'static str,
        /// Description of the violation.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl CorralError {
    /// Shorthand for [`CorralError::MalformedSpec`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSpec {
            message: message.into(),
        }
    }

    /// Shorthand for [`CorralError::Validation`].
    pub fn validation(check: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            check,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CorralError>;
