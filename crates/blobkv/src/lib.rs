//! `blobkv`
//!
//! A key/value blob store over an embedded transactional engine.
//!
//! # Overview
//!
//! [`BlobStore`] is a small storage contract (get, put, size, delete, list,
//! len, close) that callers can program against without caring which
//! backend sits underneath. [`Store`] implements it over the engine traits
//! from `blobkv_storage`, using a Redb database by default.
//!
//! Every operation runs inside a single engine transaction. Absent keys and
//! absent buckets are both reported as [`Error::KeyNotFound`]; a
//! non-replacing put onto an existing key fails with [`Error::KeyExists`];
//! any other engine failure is returned unchanged as [`Error::Storage`].
//!
//! # Example
//!
//! ```ignore
//! use blobkv::{opener, BlobStore, Context, ListControl, PutOptions};
//!
//! let store = opener("photos@/var/lib/blobs")?;
//! let ctx = Context::background();
//!
//! store.put(&ctx, PutOptions::new(b"cat.jpg", b"..."))?;
//! assert_eq!(store.size(&ctx, b"cat.jpg")?, 3);
//!
//! // List keys from "c" onwards, stopping after the first one
//! store.list(&ctx, b"c", &mut |key| {
//!     println!("{}", String::from_utf8_lossy(key));
//!     Ok(ListControl::Stop)
//! })?;
//!
//! store.close(&ctx)?;
//! ```
//!
//! # Modules
//!
//! - [`blob`] - The storage contract
//! - [`store`] - The engine-backed implementation
//! - [`context`] - Cancellation and deadlines
//! - [`opener`] - Opening stores from `[bucket@]path` addresses

pub mod blob;
pub mod context;
pub mod error;
pub mod opener;
pub mod options;
pub mod store;

pub use blob::{BlobStore, ListControl, PutOptions};
pub use context::{CancellationToken, Context};
pub use error::{Error, Result};
pub use opener::{opener, parse_addr};
pub use options::Options;
pub use store::{Store, DATA_FILE};

pub use blobkv_storage::StorageError;
