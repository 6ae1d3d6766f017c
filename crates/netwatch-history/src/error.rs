//! Error types for the history store.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for history store operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur while reading or writing the history file.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("corrupt history in {path}: {reason}")]
    Deserialize { path: PathBuf, reason: String },
}
