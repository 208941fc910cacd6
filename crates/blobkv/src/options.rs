//! Options for opening a store.

use blobkv_storage::backends::RedbConfig;

use crate::error::{Error, Result};

/// Options for opening a [`Store`](crate::Store).
///
/// The default options select the empty-named bucket and Redb's default
/// cache size.
///
/// # Example
///
/// ```ignore
/// use blobkv::{Options, Store};
///
/// let store = Store::open("/var/lib/blobs", Options::new().bucket("photos"))?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Bucket to read and write. `None` selects the empty-named bucket.
    pub bucket: Option<String>,

    /// Engine cache size in bytes. `None` uses the engine's default.
    pub cache_size: Option<usize>,
}

impl Options {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the named bucket.
    #[must_use]
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Set the engine cache size.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }

    /// The bucket these options select.
    #[must_use]
    pub fn bucket_name(&self) -> &str {
        self.bucket.as_deref().unwrap_or_default()
    }

    /// Check that the options can be used to open a store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the bucket name contains a NUL byte.
    pub fn validate(&self) -> Result<()> {
        validate_bucket(self.bucket_name())
    }

    pub(crate) fn redb_config(&self) -> RedbConfig {
        let mut config = RedbConfig::new();
        if let Some(size) = self.cache_size {
            config = config.cache_size(size);
        }
        config
    }
}

pub(crate) fn validate_bucket(bucket: &str) -> Result<()> {
    if bucket.contains('\0') {
        return Err(Error::config(format!("bucket name {bucket:?} contains a NUL byte")));
    }
    Ok(())
}
