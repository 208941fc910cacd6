//! Error types for `blobkv`.
//!
//! This module provides the [`enum@Error`] type returned by every
//! [`BlobStore`](crate::BlobStore) operation.

use blobkv_storage::StorageError;
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using a blob store.
///
/// `KeyNotFound` and `KeyExists` are the contract-level outcomes callers are
/// expected to match on. Everything the engine reports beyond "not found"
/// is carried unchanged in [`Error::Storage`].
#[derive(Debug, Error)]
pub enum Error {
    /// The key is not present in the bucket.
    #[error("key not found: {:?}", String::from_utf8_lossy(.0))]
    KeyNotFound(Vec<u8>),

    /// A non-replacing put targeted a key that already has a value.
    #[error("key already exists: {:?}", String::from_utf8_lossy(.0))]
    KeyExists(Vec<u8>),

    /// The underlying engine failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The operation's context was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation's context passed its deadline.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The store options are invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A list visitor failed.
    #[error("list visitor failed: {0}")]
    Visitor(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Returns `true` if this is a [`Error::KeyNotFound`] error.
    #[must_use]
    pub const fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound(_))
    }

    /// Returns `true` if this is a [`Error::KeyExists`] error.
    #[must_use]
    pub const fn is_key_exists(&self) -> bool {
        matches!(self, Self::KeyExists(_))
    }

    /// Returns `true` if the operation stopped because its context was
    /// cancelled or timed out.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// The key a [`Error::KeyNotFound`] or [`Error::KeyExists`] error refers to.
    #[must_use]
    pub fn key(&self) -> Option<&[u8]> {
        match self {
            Self::KeyNotFound(key) | Self::KeyExists(key) => Some(key),
            _ => None,
        }
    }

    /// Create a config error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a caller's error so it can be returned from a list visitor.
    #[must_use]
    pub fn visitor(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Visitor(err.into())
    }
}

/// Map an engine error seen while looking up `key` into the store taxonomy.
///
/// Every not-found-like engine outcome becomes [`Error::KeyNotFound`]; all
/// other errors pass through unchanged.
pub(crate) fn classify(err: StorageError, key: &[u8]) -> Error {
    if err.is_not_found() {
        Error::KeyNotFound(key.to_vec())
    } else {
        Error::Storage(err)
    }
}
