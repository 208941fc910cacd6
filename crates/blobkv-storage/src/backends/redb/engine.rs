//! The redb-backed [`StorageEngine`].
//!
//! A [`RedbEngine`] owns one redb database file (or an in-memory database)
//! until it is closed. Write transactions commit with immediate durability.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use redb::{Database, Durability};
use tracing::debug;

use crate::engine::{StorageEngine, StorageError, StorageResult};

use super::transaction::RedbTransaction;

/// Tuning knobs for a [`RedbEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RedbConfig {
    /// Page cache size in bytes; `None` keeps redb's default.
    pub cache_size: Option<usize>,
}

impl RedbConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache size.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }
}

/// A storage engine over one redb database.
///
/// The engine owns the Redb database until [`StorageEngine::close`] is
/// called. Closing drops the database and releases its file lock; every
/// later attempt to start a transaction fails with [`StorageError::Closed`].
///
/// # Example
///
/// ```ignore
/// use blobkv_storage::backends::RedbEngine;
///
/// let engine = RedbEngine::open("blobs.redb")?;
///
/// let mut tx = engine.begin_write()?;
/// tx.put("photos", b"cat.jpg", b"...")?;
/// tx.commit()?;
///
/// engine.close()?;
/// ```
pub struct RedbEngine {
    /// The underlying Redb database, `None` once closed.
    db: RwLock<Option<Database>>,
    /// The database file, if the engine is disk-backed.
    path: Option<PathBuf>,
}

impl RedbEngine {
    /// Open the database file at `path`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file cannot be accessed, or
    /// [`StorageError::Open`] if Redb refuses to open it.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_config(path, RedbConfig::default())
    }

    /// Like [`RedbEngine::open`], with explicit tuning.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file cannot be accessed, or
    /// [`StorageError::Open`] if Redb refuses to open it.
    pub fn open_with_config(path: impl AsRef<Path>, config: RedbConfig) -> StorageResult<Self> {
        let path = path.as_ref();
        let mut builder = Database::builder();

        if let Some(cache_size) = config.cache_size {
            builder.set_cache_size(cache_size);
        }

        let db = builder.create(path).map_err(open_error)?;
        debug!(path = %path.display(), "opened redb database");

        Ok(Self { db: RwLock::new(Some(db)), path: Some(path.to_path_buf()) })
    }

    /// A database that lives only in memory and vanishes on close or drop.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be created.
    pub fn in_memory() -> StorageResult<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(open_error)?;

        Ok(Self { db: RwLock::new(Some(db)), path: None })
    }

    /// The database file, or `None` for an in-memory engine.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` against the open database.
    fn with_db<T>(&self, f: impl FnOnce(&Database) -> StorageResult<T>) -> StorageResult<T> {
        let guard = self.db.read().map_err(|_| lock_poisoned())?;
        match guard.as_ref() {
            Some(db) => f(db),
            None => Err(StorageError::Closed),
        }
    }
}

impl StorageEngine for RedbEngine {
    type Transaction<'a> = RedbTransaction;

    fn begin_read(&self) -> StorageResult<Self::Transaction<'_>> {
        self.with_db(|db| {
            let tx = db.begin_read().map_err(transaction_error)?;
            Ok(RedbTransaction::new_read(tx))
        })
    }

    fn begin_write(&self) -> StorageResult<Self::Transaction<'_>> {
        self.with_db(|db| {
            let mut tx = db.begin_write().map_err(transaction_error)?;
            tx.set_durability(Durability::Immediate);
            Ok(RedbTransaction::new_write(tx))
        })
    }

    fn close(&self) -> StorageResult<()> {
        let mut guard = self.db.write().map_err(|_| lock_poisoned())?;
        match guard.take() {
            Some(db) => {
                drop(db);
                debug!(path = ?self.path, "closed redb database");
                Ok(())
            }
            None => Err(StorageError::Closed),
        }
    }

    fn is_closed(&self) -> bool {
        self.db.read().map_or(true, |db| db.is_none())
    }
}

impl std::fmt::Debug for RedbEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbEngine")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn open_error(err: redb::DatabaseError) -> StorageError {
    match err {
        redb::DatabaseError::Storage(e) => e.into(),
        other => StorageError::Open(other.to_string()),
    }
}

fn transaction_error(err: redb::TransactionError) -> StorageError {
    match err {
        redb::TransactionError::Storage(e) => e.into(),
        other => StorageError::Transaction(other.to_string()),
    }
}

fn lock_poisoned() -> StorageError {
    StorageError::Internal("engine lock poisoned".into())
}
