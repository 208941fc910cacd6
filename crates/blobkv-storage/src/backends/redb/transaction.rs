//! Transactions and key cursors over the redb data table.
//!
//! Every bucket lookup goes through the single physical table defined in
//! [`super::tables`]. A read transaction on a database that has never been
//! written has no data table at all; point lookups report that as
//! [`StorageError::TableNotFound`] and cursors see it as an empty bucket.
//!
//! # Key cursors
//!
//! [`RedbCursor`] walks the keys of one bucket in batches (default 1000),
//! fetching the next batch only when the current one is used up. Values
//! are never read by a cursor.

use redb::{ReadTransaction, ReadableTable, WriteTransaction};

use crate::engine::{Cursor, CursorResult, StorageError, StorageResult, Transaction};

use super::tables::{decode_key, physical_key, table_end_key, DATA_TABLE};

/// Default batch size for cursor operations.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// A redb snapshot or write transaction.
///
/// Write transactions that are dropped without [`Transaction::commit`] are
/// aborted by Redb.
#[allow(clippy::large_enum_variant)]
pub enum RedbTransaction {
    /// A snapshot.
    Read(ReadTransaction),
    /// The single writer.
    Write(WriteTransaction),
}

impl RedbTransaction {
    /// Wrap a redb snapshot.
    pub const fn new_read(tx: ReadTransaction) -> Self {
        Self::Read(tx)
    }

    /// Wrap a redb write transaction.
    pub const fn new_write(tx: WriteTransaction) -> Self {
        Self::Write(tx)
    }

    /// Create a cursor that buffers at most `batch_size` keys at a time.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidTableName`] if the table name is invalid.
    pub fn cursor_with_batch_size(
        &self,
        table: &str,
        batch_size: usize,
    ) -> StorageResult<RedbCursor<'_>> {
        // Validates the name; the encoded key itself is not needed yet.
        physical_key(table, &[])?;
        Ok(RedbCursor::new(self, table.to_owned(), batch_size.max(1)))
    }

    /// Look up `key` and apply `f` to the stored value in place.
    fn with_value<R>(
        &self,
        table: &str,
        key: &[u8],
        f: impl FnOnce(&[u8]) -> R,
    ) -> StorageResult<R> {
        let encoded = physical_key(table, key)?;

        match self {
            Self::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => read_value(&t, &encoded, f),
                Err(redb::TableError::TableDoesNotExist(_)) => {
                    // Nothing has been written to any bucket yet
                    Err(StorageError::TableNotFound(table.to_owned()))
                }
                Err(e) => Err(table_error(e)),
            },
            Self::Write(tx) => {
                let t = tx.open_table(DATA_TABLE).map_err(table_error)?;
                read_value(&t, &encoded, f)
            }
        }
    }

    /// Fetch up to `batch_size` keys of `table`, starting at `from`.
    ///
    /// When `skip_from` is set, `from` itself is excluded so that a batch can
    /// continue after the last key of the previous one.
    fn fetch_batch(
        &self,
        table: &str,
        from: &[u8],
        skip_from: bool,
        batch_size: usize,
    ) -> StorageResult<Vec<Vec<u8>>> {
        match self {
            Self::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => scan_keys(&t, table, from, skip_from, batch_size),
                Err(redb::TableError::TableDoesNotExist(_)) => {
                    // Fresh database: every bucket is empty
                    Ok(Vec::new())
                }
                Err(e) => Err(table_error(e)),
            },
            Self::Write(tx) => {
                let t = tx.open_table(DATA_TABLE).map_err(table_error)?;
                scan_keys(&t, table, from, skip_from, batch_size)
            }
        }
    }
}

impl Transaction for RedbTransaction {
    type Cursor<'a>
        = RedbCursor<'a>
    where
        Self: 'a;

    fn get(&self, table: &str, key: &[u8]) -> StorageResult<Vec<u8>> {
        self.with_value(table, key, <[u8]>::to_vec)
    }

    fn value_len(&self, table: &str, key: &[u8]) -> StorageResult<u64> {
        self.with_value(table, key, |value| value.len() as u64)
    }

    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write(tx) => {
                let encoded = physical_key(table, key)?;
                let mut t = tx.open_table(DATA_TABLE).map_err(table_error)?;
                t.insert(encoded.as_slice(), value)?;
                Ok(())
            }
        }
    }

    fn delete(&mut self, table: &str, key: &[u8]) -> StorageResult<bool> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write(tx) => {
                let encoded = physical_key(table, key)?;
                let mut t = tx.open_table(DATA_TABLE).map_err(table_error)?;
                let removed = t.remove(encoded.as_slice())?.is_some();
                Ok(removed)
            }
        }
    }

    fn cursor(&self, table: &str) -> StorageResult<Self::Cursor<'_>> {
        self.cursor_with_batch_size(table, DEFAULT_BATCH_SIZE)
    }

    fn commit(self) -> StorageResult<()> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write(tx) => tx.commit().map_err(|e| match e {
                redb::CommitError::Storage(e) => e.into(),
                other => StorageError::Transaction(other.to_string()),
            }),
        }
    }

    fn rollback(self) -> StorageResult<()> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write(tx) => tx.abort().map_err(StorageError::from),
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}

fn read_value<T, R>(table: &T, encoded: &[u8], f: impl FnOnce(&[u8]) -> R) -> StorageResult<R>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    match table.get(encoded)? {
        Some(value) => Ok(f(value.value())),
        None => Err(StorageError::KeyNotFound),
    }
}

fn scan_keys<T>(
    table: &T,
    name: &str,
    from: &[u8],
    skip_from: bool,
    limit: usize,
) -> StorageResult<Vec<Vec<u8>>>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let start = physical_key(name, from)?;
    let end = table_end_key(name);

    let mut keys = Vec::with_capacity(limit.min(1024));
    for item in table.range(start.as_slice()..end.as_slice())? {
        let (k, _) = item?;
        let Some((_, key)) = decode_key(k.value()) else {
            continue;
        };
        if skip_from && key == from {
            continue;
        }
        keys.push(key.to_vec());
        if keys.len() >= limit {
            break;
        }
    }
    Ok(keys)
}

fn table_error(err: redb::TableError) -> StorageError {
    match err {
        redb::TableError::Storage(e) => e.into(),
        other => StorageError::Internal(other.to_string()),
    }
}

/// A memory-efficient forward cursor over the keys of one logical table.
///
/// At any time the cursor holds at most `batch_size` keys in memory plus
/// the current key, so iterating a table with 1M keys uses about as much
/// memory as one with 1K keys. All batches are read from the same
/// transaction and therefore from the same snapshot.
pub struct RedbCursor<'a> {
    /// Source of every batch, so all batches share one snapshot.
    tx: &'a RedbTransaction,
    /// Bucket being walked.
    table: String,
    /// Current batch of keys.
    batch: Vec<Vec<u8>>,
    /// Index of the current key in `batch`.
    batch_position: Option<usize>,
    /// Maximum keys per batch.
    batch_size: usize,
    /// Whether there may be more keys after the current batch.
    has_more_forward: bool,
    /// Set once iteration has run past the last key.
    exhausted: bool,
}

impl<'a> RedbCursor<'a> {
    fn new(tx: &'a RedbTransaction, table: String, batch_size: usize) -> Self {
        Self {
            tx,
            table,
            batch: Vec::new(),
            batch_position: None,
            batch_size,
            has_more_forward: true,
            exhausted: false,
        }
    }

    /// Load the next batch, continuing after the last key in the current batch.
    fn load_next_batch(&mut self) -> StorageResult<bool> {
        if !self.has_more_forward {
            return Ok(false);
        }
        let Some(after_key) = self.batch.last() else {
            return Ok(false);
        };

        let new_batch = self.tx.fetch_batch(&self.table, after_key, true, self.batch_size)?;
        if new_batch.is_empty() {
            self.has_more_forward = false;
            return Ok(false);
        }

        self.has_more_forward = new_batch.len() >= self.batch_size;
        self.batch = new_batch;
        self.batch_position = Some(0);
        Ok(true)
    }

    fn current_key(&self) -> Option<Vec<u8>> {
        self.current().map(<[u8]>::to_vec)
    }

    fn finish(&mut self) -> CursorResult {
        self.batch.clear();
        self.batch_position = None;
        self.exhausted = true;
        Ok(None)
    }
}

impl Cursor for RedbCursor<'_> {
    fn seek(&mut self, key: &[u8]) -> CursorResult {
        self.exhausted = false;
        self.batch = self.tx.fetch_batch(&self.table, key, false, self.batch_size)?;
        self.has_more_forward = self.batch.len() >= self.batch_size;

        if self.batch.is_empty() {
            return self.finish();
        }
        self.batch_position = Some(0);
        Ok(self.current_key())
    }

    fn next(&mut self) -> CursorResult {
        let Some(pos) = self.batch_position else {
            if self.exhausted {
                return Ok(None);
            }
            // Unpositioned cursors start at the first key
            return self.seek(&[]);
        };

        if pos + 1 < self.batch.len() {
            self.batch_position = Some(pos + 1);
            Ok(self.current_key())
        } else if self.load_next_batch()? {
            Ok(self.current_key())
        } else {
            self.finish()
        }
    }

    fn current(&self) -> Option<&[u8]> {
        self.batch_position.and_then(|pos| self.batch.get(pos)).map(Vec::as_slice)
    }
}
