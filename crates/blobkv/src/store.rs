//! The store adapter.
//!
//! [`Store`] implements [`BlobStore`] over any [`StorageEngine`]. Each
//! operation runs in exactly one engine transaction: reads in a read-only
//! snapshot, writes in a read-write transaction that either commits or is
//! rolled back. Existence checks and the writes that depend on them share
//! that transaction, so no other writer can slip in between them.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use blobkv_storage::backends::RedbEngine;
use blobkv_storage::{Cursor, StorageEngine, StorageError, Transaction};
use tracing::{debug, trace};

use crate::blob::{BlobStore, ListControl, PutOptions};
use crate::context::Context;
use crate::error::{classify, Error, Result};
use crate::options::{validate_bucket, Options};

/// Name of the database file created inside the store directory.
pub const DATA_FILE: &str = "blobs.redb";

/// A [`BlobStore`] backed by a transactional key-value engine.
///
/// A store is a handle onto one bucket of one engine. Clones share the
/// engine, so closing any clone closes them all; operations on a closed
/// store fail with [`StorageError::Closed`] wrapped in [`Error::Storage`].
pub struct Store<E: StorageEngine = RedbEngine> {
    engine: Arc<E>,
    bucket: String,
}

impl Store<RedbEngine> {
    /// Open or create a store in the directory `path`.
    ///
    /// The directory is created if missing, and the database file
    /// [`DATA_FILE`] is opened inside it. Commits are durable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid options, or the engine's
    /// error (usually [`StorageError::Io`]) if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>, options: Options) -> Result<Self> {
        let path = path.as_ref();
        options.validate()?;

        std::fs::create_dir_all(path).map_err(StorageError::from)?;
        let engine = RedbEngine::open_with_config(path.join(DATA_FILE), options.redb_config())?;

        debug!(path = %path.display(), bucket = options.bucket_name(), "opened store");
        Ok(Self { engine: Arc::new(engine), bucket: options.bucket_name().to_owned() })
    }

    /// Create a store over an in-memory database, for testing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid options, or the engine's error
    /// if the database cannot be created.
    pub fn in_memory(options: Options) -> Result<Self> {
        options.validate()?;
        let engine = RedbEngine::in_memory()?;
        Ok(Self { engine: Arc::new(engine), bucket: options.bucket_name().to_owned() })
    }
}

impl<E: StorageEngine> Store<E> {
    /// Create a store over an already-open engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the bucket name contains a NUL byte.
    pub fn with_engine(engine: Arc<E>, bucket: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        validate_bucket(&bucket)?;
        Ok(Self { engine, bucket })
    }

    /// The bucket this store reads and writes.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The underlying engine.
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Roll back a write transaction whose outcome is already decided.
    ///
    /// The caller's result does not depend on the rollback, so a failure is
    /// logged and otherwise ignored.
    fn abandon<'a>(&'a self, tx: E::Transaction<'a>) {
        if let Err(error) = tx.rollback() {
            debug!(bucket = %self.bucket, %error, "rollback failed");
        }
    }

    /// A handle onto another bucket of the same engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the bucket name contains a NUL byte.
    pub fn with_bucket(&self, bucket: impl Into<String>) -> Result<Self> {
        Self::with_engine(Arc::clone(&self.engine), bucket)
    }
}

impl<E: StorageEngine> BlobStore for Store<E> {
    fn get(&self, ctx: &Context, key: &[u8]) -> Result<Vec<u8>> {
        ctx.check()?;
        let tx = self.engine.begin_read()?;
        tx.get(&self.bucket, key).map_err(|e| classify(e, key))
    }

    fn put(&self, ctx: &Context, opts: PutOptions<'_>) -> Result<()> {
        ctx.check()?;
        let mut tx = self.engine.begin_write()?;

        if !opts.replace && tx.contains(&self.bucket, opts.key)? {
            trace!(bucket = %self.bucket, "put rejected, key exists");
            self.abandon(tx);
            return Err(Error::KeyExists(opts.key.to_vec()));
        }

        tx.put(&self.bucket, opts.key, opts.data)?;
        tx.commit()?;
        Ok(())
    }

    fn size(&self, ctx: &Context, key: &[u8]) -> Result<u64> {
        ctx.check()?;
        let tx = self.engine.begin_read()?;
        tx.value_len(&self.bucket, key).map_err(|e| classify(e, key))
    }

    fn delete(&self, ctx: &Context, key: &[u8]) -> Result<()> {
        ctx.check()?;
        let mut tx = self.engine.begin_write()?;

        if !tx.contains(&self.bucket, key)? {
            self.abandon(tx);
            return Err(Error::KeyNotFound(key.to_vec()));
        }

        tx.delete(&self.bucket, key)?;
        tx.commit()?;
        Ok(())
    }

    fn list(
        &self,
        ctx: &Context,
        start: &[u8],
        visit: &mut dyn FnMut(&[u8]) -> Result<ListControl>,
    ) -> Result<()> {
        ctx.check()?;
        let tx = self.engine.begin_read()?;
        let mut cursor = tx.cursor(&self.bucket)?;

        let mut entry = cursor.seek(start)?;
        while let Some(key) = entry {
            ctx.check()?;
            if visit(&key)? == ListControl::Stop {
                trace!(bucket = %self.bucket, "listing stopped by visitor");
                return Ok(());
            }
            entry = cursor.next()?;
        }
        Ok(())
    }

    fn close(&self, _ctx: &Context) -> Result<()> {
        match self.engine.close() {
            Ok(()) => {
                debug!(bucket = %self.bucket, "closed store");
                Ok(())
            }
            Err(e) if e.is_closed() => {
                debug!(bucket = %self.bucket, "store already closed");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<E: StorageEngine> Clone for Store<E> {
    fn clone(&self) -> Self {
        Self { engine: Arc::clone(&self.engine), bucket: self.bucket.clone() }
    }
}

impl<E: StorageEngine> fmt::Debug for Store<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("bucket", &self.bucket)
            .field("closed", &self.engine.is_closed())
            .finish_non_exhaustive()
    }
}
