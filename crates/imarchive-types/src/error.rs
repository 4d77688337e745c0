use std::time::Duration;

use thiserror::Error;

/// Errors raised by the store accessor (used by the `ArchiveStore` port in imarchive-core).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file is missing, unreadable, corrupt, or not a Messages store.
    #[error("cannot open '{path}': {reason}")]
    Connection { path: String, reason: String },

    #[error("no database is open")]
    NotOpen,

    /// Malformed statement, parameter mismatch, or engine-level failure.
    #[error("query error: {0}")]
    Query(String),
}

/// Errors surfaced by the archive service operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("search timed out after {0:?}")]
    SearchTimeout(Duration),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The background task running a search panicked or was aborted.
    #[error("search task failed: {0}")]
    TaskFailed(String),
}
