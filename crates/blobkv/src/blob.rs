//! The blob storage contract.
//!
//! [`BlobStore`] is the small interface higher-level code programs against.
//! Any backend that implements it can be swapped for any other.

use crate::context::Context;
use crate::error::Result;

/// What a list visitor wants to happen after seeing a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListControl {
    /// Visit the next key.
    Continue,
    /// End the listing early. The listing still reports success.
    Stop,
}

/// Arguments to [`BlobStore::put`].
#[derive(Debug, Clone, Copy)]
pub struct PutOptions<'a> {
    /// The key to write.
    pub key: &'a [u8],
    /// The value to store.
    pub data: &'a [u8],
    /// Overwrite an existing value instead of failing with
    /// [`Error::KeyExists`](crate::Error::KeyExists).
    pub replace: bool,
}

impl<'a> PutOptions<'a> {
    /// A non-replacing put of `data` under `key`.
    #[must_use]
    pub const fn new(key: &'a [u8], data: &'a [u8]) -> Self {
        Self { key, data, replace: false }
    }

    /// Set whether an existing value may be overwritten.
    #[must_use]
    pub const fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

/// A key/value blob store.
///
/// Keys are byte strings unique within the store; values are arbitrary
/// bytes. Implementations must be safe to share between threads.
///
/// # Example
///
/// ```ignore
/// use blobkv::{BlobStore, Context, ListControl, PutOptions};
///
/// let ctx = Context::background();
/// store.put(&ctx, PutOptions::new(b"cat", b"meow"))?;
/// assert_eq!(store.get(&ctx, b"cat")?, b"meow");
///
/// store.list(&ctx, b"", &mut |key| {
///     println!("{}", String::from_utf8_lossy(key));
///     Ok(ListControl::Continue)
/// })?;
/// ```
pub trait BlobStore: Send + Sync {
    /// Fetch a copy of the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the key
    /// is absent.
    fn get(&self, ctx: &Context, key: &[u8]) -> Result<Vec<u8>>;

    /// Store a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyExists`](crate::Error::KeyExists) if `replace` is
    /// false and the key already has a value; nothing is written then.
    fn put(&self, ctx: &Context, opts: PutOptions<'_>) -> Result<()>;

    /// The length in bytes of the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the key
    /// is absent.
    fn size(&self, ctx: &Context, key: &[u8]) -> Result<u64>;

    /// Remove `key` and its value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the key
    /// is absent.
    fn delete(&self, ctx: &Context, key: &[u8]) -> Result<()>;

    /// Call `visit` with every key greater than or equal to `start`, in
    /// ascending byte order.
    ///
    /// The listing ends successfully when the keys run out or `visit`
    /// returns [`ListControl::Stop`].
    ///
    /// # Errors
    ///
    /// Returns the first error from `visit`, or
    /// [`Error::Cancelled`](crate::Error::Cancelled) /
    /// [`Error::DeadlineExceeded`](crate::Error::DeadlineExceeded) if `ctx`
    /// ends before the listing does.
    fn list(
        &self,
        ctx: &Context,
        start: &[u8],
        visit: &mut dyn FnMut(&[u8]) -> Result<ListControl>,
    ) -> Result<()>;

    /// The number of keys in the store.
    ///
    /// # Errors
    ///
    /// Fails like [`BlobStore::list`].
    fn len(&self, ctx: &Context) -> Result<u64> {
        let mut count = 0u64;
        self.list(ctx, &[], &mut |_| {
            count += 1;
            Ok(ListControl::Continue)
        })?;
        Ok(count)
    }

    /// Whether the store holds no keys.
    ///
    /// # Errors
    ///
    /// Fails like [`BlobStore::list`].
    fn is_empty(&self, ctx: &Context) -> Result<bool> {
        let mut empty = true;
        self.list(ctx, &[], &mut |_| {
            empty = false;
            Ok(ListControl::Stop)
        })?;
        Ok(empty)
    }

    /// Release the store's resources. Closing an already-closed store
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns any failure other than "already closed" from the backend.
    fn close(&self, ctx: &Context) -> Result<()>;
}
