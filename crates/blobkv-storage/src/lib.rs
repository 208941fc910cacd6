//! `blobkv` Storage
//!
//! This crate provides the transactional key-value engine abstraction that
//! the `blobkv` store adapter is written against, together with a redb
//! backend.
//!
//! # Overview
//!
//! Engines expose short-lived read and write transactions over named
//! logical tables ("buckets"). Each transaction supports point lookups,
//! writes, deletes and an ordered key cursor. Lookups of absent data fail
//! with one of the not-found variants of [`StorageError`], which callers
//! can test for with [`StorageError::is_not_found`].
//!
//! # Core Traits
//!
//! - [`StorageEngine`] - Opens transactions and owns the engine lifecycle
//! - [`Transaction`] - Read/write operations that commit or roll back atomically
//! - [`Cursor`] - Ordered iteration over the keys of a table
//!
//! # Example
//!
//! ```ignore
//! use blobkv_storage::{StorageEngine, Transaction};
//! use blobkv_storage::backends::RedbEngine;
//!
//! let engine = RedbEngine::open("blobs.redb")?;
//!
//! let mut tx = engine.begin_write()?;
//! tx.put("photos", b"cat.jpg", b"...")?;
//! tx.commit()?;
//!
//! let tx = engine.begin_read()?;
//! assert_eq!(tx.get("photos", b"cat.jpg")?, b"...".to_vec());
//!
//! engine.close()?;
//! ```
//!
//! # Modules
//!
//! - [`engine`] - Storage engine traits and error types
//! - [`backends`] - Concrete storage backend implementations

pub mod backends;
pub mod engine;

pub use engine::{Cursor, CursorResult, StorageEngine, StorageError, StorageResult, Transaction};
