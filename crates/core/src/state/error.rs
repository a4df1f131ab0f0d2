//! Error types for the state module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StateError {
    /// I/O error on the state file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file exists but is not valid.
    #[error("Corrupt state file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl StateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
