//! Opening stores from address strings.
//!
//! An address has the form `[bucket@]path`. The text before the first `@`
//! names the bucket; the rest is the directory holding the database. An
//! address without `@` is a bare path and selects the empty bucket.

use crate::error::Result;
use crate::options::Options;
use crate::store::Store;

/// Split an address into open options and a path.
#[must_use]
pub fn parse_addr(addr: &str) -> (Options, &str) {
    match addr.split_once('@') {
        Some((bucket, path)) => (Options::new().bucket(bucket), path),
        None => (Options::new(), addr),
    }
}

/// Open a store from an address of the form `[bucket@]path`.
///
/// # Errors
///
/// Fails like [`Store::open`].
pub fn opener(addr: &str) -> Result<Store> {
    let (options, path) = parse_addr(addr);
    Store::open(path, options)
}
