//! Redb storage backend.
//!
//! This module provides a storage backend implementation using Redb,
//! a pure-Rust embedded database with serializable write transactions and
//! MVCC snapshot reads.
//!
//! Buckets are stored as logical tables inside a single physical Redb table;
//! see [`tables`] for the key layout.

mod engine;
pub mod tables;
mod transaction;

pub use engine::{RedbConfig, RedbEngine};
pub use transaction::{RedbCursor, RedbTransaction, DEFAULT_BATCH_SIZE};
