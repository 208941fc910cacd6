//! Redb table definitions and key encoding utilities.
//!
//! Redb table handles are opened per transaction, so rather than one Redb
//! table per bucket we use a key prefixing strategy: every logical table
//! ("bucket") lives inside one physical table, and its name prefixes each
//! key. The empty string is a valid logical table name.

use redb::TableDefinition;

use crate::engine::{StorageError, StorageResult};

/// The physical table that stores all key-value pairs.
/// Logical table names are prefixed to keys.
pub const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> = TableDefinition::new("blobkv_data");

/// Separator byte between table name and key in the encoded key.
pub const KEY_SEPARATOR: u8 = 0x00;

/// Check that a logical table name can be encoded.
///
/// Names may not contain the separator byte, otherwise keys of one table
/// could decode as keys of another.
///
/// # Errors
///
/// Returns [`StorageError::InvalidTableName`] if the name contains a NUL byte.
pub fn validate_table_name(table: &str) -> StorageResult<()> {
    if table.as_bytes().contains(&KEY_SEPARATOR) {
        return Err(StorageError::InvalidTableName(table.to_owned()));
    }
    Ok(())
}

/// Encode a logical table name and key into a physical key.
///
/// The format is: `<table_name><separator><key>`
pub fn encode_key(table: &str, key: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(table.len() + 1 + key.len());
    encoded.extend_from_slice(table.as_bytes());
    encoded.push(KEY_SEPARATOR);
    encoded.extend_from_slice(key);
    encoded
}

/// Validate the table name, then encode the physical key.
///
/// # Errors
///
/// Returns [`StorageError::InvalidTableName`] if the table name is invalid.
pub fn physical_key(table: &str, key: &[u8]) -> StorageResult<Vec<u8>> {
    validate_table_name(table)?;
    Ok(encode_key(table, key))
}

/// Decode a physical key into its logical table name and original key.
///
/// Returns `None` if the key is malformed (missing separator).
pub fn decode_key(encoded: &[u8]) -> Option<(&str, &[u8])> {
    let sep_pos = encoded.iter().position(|&b| b == KEY_SEPARATOR)?;
    let table = std::str::from_utf8(&encoded[..sep_pos]).ok()?;
    let key = &encoded[sep_pos + 1..];
    Some((table, key))
}

/// Create the end key for range scans on a logical table.
/// This is the first key that would NOT belong to the table.
pub fn table_end_key(table: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(table.len() + 1);
    key.extend_from_slice(table.as_bytes());
    key.push(KEY_SEPARATOR + 1);
    key
}
