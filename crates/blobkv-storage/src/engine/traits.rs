//! Core storage engine traits.
//!
//! This module defines the fundamental traits for storage backends:
//!
//! - [`StorageEngine`] - The main entry point for storage operations
//! - [`Transaction`] - ACID transaction support with read/write operations
//! - [`Cursor`] - Ordered iteration over the keys of a table
//!
//! Tables are logical namespaces ("buckets") identified by name. A table
//! comes into existence the first time a key is written to it.

use std::sync::Arc;

use super::{StorageError, StorageResult};

/// Result type for cursor operations that return a key.
pub type CursorResult = Result<Option<Vec<u8>>, StorageError>;

/// A storage engine that provides transactional key-value operations.
///
/// Implementations must be thread-safe (`Send + Sync`). An engine is open
/// from construction until [`StorageEngine::close`]; after that, starting a
/// transaction fails with [`StorageError::Closed`].
///
/// # Example
///
/// ```ignore
/// use blobkv_storage::{StorageEngine, Transaction};
///
/// fn example<E: StorageEngine>(engine: &E) -> Result<(), StorageError> {
///     // Read transaction
///     let tx = engine.begin_read()?;
///     let value = tx.get("my_table", b"key")?;
///
///     // Write transaction
///     let mut tx = engine.begin_write()?;
///     tx.put("my_table", b"key", b"value")?;
///     tx.commit()?;
///     Ok(())
/// }
/// ```
pub trait StorageEngine: Send + Sync {
    /// The transaction type for this engine.
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    /// Begin a read-only transaction.
    ///
    /// Read transactions provide a consistent snapshot of the database.
    /// Multiple read transactions can run concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the engine has been closed, or
    /// [`StorageError::Transaction`] if the transaction cannot be started.
    fn begin_read(&self) -> StorageResult<Self::Transaction<'_>>;

    /// Begin a read-write transaction.
    ///
    /// Write transactions are serialized: a second writer blocks until the
    /// first commits or rolls back.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the engine has been closed, or
    /// [`StorageError::Transaction`] if the transaction cannot be started.
    fn begin_write(&self) -> StorageResult<Self::Transaction<'_>>;

    /// Flush any buffered data to durable storage.
    ///
    /// The default implementation does nothing, as most backends handle
    /// durability on commit.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the flush fails.
    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Close the engine, releasing its on-disk resources.
    ///
    /// Transactions that are already running keep their snapshot until
    /// they finish.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the engine was already closed.
    fn close(&self) -> StorageResult<()>;

    /// Check whether [`StorageEngine::close`] has been called.
    fn is_closed(&self) -> bool;
}

/// A transaction that provides ACID key-value operations.
///
/// Write transactions must be explicitly committed; dropping one without
/// committing rolls its changes back.
pub trait Transaction {
    /// The cursor type for iteration.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Get a copy of the value stored under `key` in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::KeyNotFound`] if the key is absent, or
    /// [`StorageError::TableNotFound`] if nothing has ever been written to
    /// the table's storage.
    fn get(&self, table: &str, key: &[u8]) -> StorageResult<Vec<u8>>;

    /// Get the length in bytes of the value stored under `key`, without
    /// copying the value.
    ///
    /// # Errors
    ///
    /// Fails like [`Transaction::get`] when the key or table is absent.
    fn value_len(&self, table: &str, key: &[u8]) -> StorageResult<u64>;

    /// Check whether `key` exists in `table`.
    ///
    /// # Errors
    ///
    /// Not-found conditions are reported as `Ok(false)`; any other failure
    /// is returned.
    fn contains(&self, table: &str, key: &[u8]) -> StorageResult<bool> {
        match self.value_len(table, key) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Put a key-value pair into a table, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] in a read-only transaction, or an
    /// error if the write fails.
    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Delete a key from a table.
    ///
    /// Returns `Ok(true)` if the key was deleted, `Ok(false)` if it didn't
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] in a read-only transaction, or an
    /// error if the delete fails.
    fn delete(&mut self, table: &str, key: &[u8]) -> StorageResult<bool>;

    /// Create a cursor over the keys of a table in ascending byte order.
    ///
    /// The cursor starts unpositioned; call [`Cursor::seek`] or
    /// [`Cursor::next`] to move it. A table that does not exist yields an
    /// empty cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor cannot be created.
    fn cursor(&self, table: &str) -> StorageResult<Self::Cursor<'_>>;

    /// Commit the transaction, making all changes durable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the commit fails.
    fn commit(self) -> StorageResult<()>;

    /// Rollback the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the rollback fails.
    fn rollback(self) -> StorageResult<()>;

    /// Check if this is a read-only transaction.
    fn is_read_only(&self) -> bool;
}

/// A cursor for ordered iteration over the keys of a table.
///
/// # Iteration Pattern
///
/// ```ignore
/// let mut cursor = tx.cursor("my_table")?;
///
/// let mut entry = cursor.seek(b"prefix")?;
/// while let Some(key) = entry {
///     // Process key
///     entry = cursor.next()?;
/// }
/// ```
pub trait Cursor {
    /// Position the cursor at the first key greater than or equal to `key`
    /// and return it, or `None` if no such key exists.
    fn seek(&mut self, key: &[u8]) -> CursorResult;

    /// Move to the next key and return it, or `None` at the end.
    ///
    /// An unpositioned cursor moves to the first key.
    fn next(&mut self) -> CursorResult;

    /// Get the current key without advancing.
    fn current(&self) -> Option<&[u8]>;
}

// ============================================================================
// Blanket Implementations
// ============================================================================

/// Implement `StorageEngine` for `Arc<E>` so cloned store handles can share
/// one engine.
impl<E: StorageEngine> StorageEngine for Arc<E> {
    type Transaction<'a>
        = E::Transaction<'a>
    where
        Self: 'a;

    fn begin_read(&self) -> StorageResult<Self::Transaction<'_>> {
        (**self).begin_read()
    }

    fn begin_write(&self) -> StorageResult<Self::Transaction<'_>> {
        (**self).begin_write()
    }

    fn flush(&self) -> StorageResult<()> {
        (**self).flush()
    }

    fn close(&self) -> StorageResult<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

