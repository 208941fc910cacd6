//! Storage error types.

use std::io;

use thiserror::Error;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be opened.
    #[error("failed to open database: {0}")]
    Open(String),

    /// A table does not exist.
    #[error("table not found: {0:?}")]
    TableNotFound(String),

    /// A key does not exist in its table.
    #[error("key not found")]
    KeyNotFound,

    /// A table name cannot be encoded.
    #[error("invalid table name: {0:?}")]
    InvalidTableName(String),

    /// A transaction could not be started, committed or aborted.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backend reported an error that has no dedicated variant.
    #[error("internal storage error: {0}")]
    Internal(String),

    /// A write was attempted in a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// The engine has been closed.
    #[error("database is closed")]
    Closed,
}

impl StorageError {
    /// Returns true if this error reports absent data: a missing key or a
    /// missing table.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound | Self::TableNotFound(_))
    }

    /// Returns true if this error was caused by using a closed engine.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl From<redb::StorageError> for StorageError {
    fn from(err: redb::StorageError) -> Self {
        match err {
            redb::StorageError::Io(e) => Self::Io(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants() {
        assert!(StorageError::KeyNotFound.is_not_found());
        assert!(StorageError::TableNotFound("photos".into()).is_not_found());
        assert!(!StorageError::Closed.is_not_found());
        assert!(!StorageError::Internal("boom".into()).is_not_found());
        assert!(!StorageError::Io(io::Error::other("disk")).is_not_found());
    }

    #[test]
    fn redb_io_errors_stay_io() {
        let err: StorageError = redb::StorageError::Io(io::Error::other("disk")).into();
        assert!(matches!(err, StorageError::Io(_)));

        let err: StorageError = redb::StorageError::Corrupted("bad page".into()).into();
        assert!(matches!(err, StorageError::Internal(_)));
    }
}
