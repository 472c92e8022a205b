//! Domain error types
//!
//! Every failure the reporter can hit maps to one of these variants. None of
//! them is allowed to reach the host application: callers convert them into
//! a state change, a dropped fragment or a skipped submission cycle.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while configuring, linking or submitting
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReporterError {
    /// I/O or parse failure on the config file or the leader marker
    #[error("Failed to load {path}: {message}")]
    ConfigLoad {
        /// File that could not be read or written
        path: PathBuf,
        /// Underlying cause
        message: String,
    },

    /// Failure resolving or invoking a sibling reporter instance
    #[error("Failed to link reporter {implementation_id}: {reason}")]
    Link {
        /// Identifier of the instance that could not be reached
        implementation_id: String,
        /// Why the call failed
        reason: String,
    },

    /// Network, TLS or I/O failure while submitting a snapshot
    #[error("Submission failed: {0}")]
    Transport(String),

    /// The snapshot could not be encoded
    #[error("Failed to serialize snapshot: {0}")]
    Serialization(String),
}

impl ReporterError {
    /// Builds a [`ReporterError::ConfigLoad`] for `path` from any error.
    pub fn config_load(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::ConfigLoad {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Builds a [`ReporterError::Link`] for `implementation_id`.
    pub fn link(implementation_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Link {
            implementation_id: implementation_id.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ReporterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
