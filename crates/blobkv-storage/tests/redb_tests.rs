//! Tests for the redb backend.
//!
//! Runs the shared engine contract suite for in-memory and on-disk
//! databases, then checks behaviour specific to redb.


use std::sync::Arc;
use std::thread;

use blobkv_storage::backends::RedbEngine;
use blobkv_storage::{Cursor, StorageEngine, StorageError, StorageResult, Transaction};

use engine_tests::{run_test_suite, TestHarness};

/// In-memory redb.
struct RedbHarness;

impl TestHarness for RedbHarness {
    type Engine = RedbEngine;

    fn create_engine() -> StorageResult<Self::Engine> {
        RedbEngine::in_memory()
    }
}

/// redb on disk, in a throwaway directory.
struct RedbFileHarness;

impl TestHarness for RedbFileHarness {
    type Engine = RedbEngine;

    fn create_engine() -> StorageResult<Self::Engine> {
        // Leak the directory so it outlives the engine; the OS cleans /tmp.
        let dir = tempfile::tempdir()?.into_path();
        RedbEngine::open(dir.join("test.redb"))
    }

    fn cleanup(engine: Self::Engine) {
        if let Some(dir) = engine.path().and_then(|p| p.parent()).map(|p| p.to_path_buf()) {
            drop(engine);
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

/// Contract suite, in-memory.
#[test]
fn test_redb_compliance() {
    run_test_suite::<RedbHarness>();
}

/// Contract suite, on disk.
#[test]
fn test_redb_file_compliance() {
    run_test_suite::<RedbFileHarness>();
}

/// The same key in different buckets holds different values.
#[test]
fn test_table_isolation() {
    let engine = RedbEngine::in_memory().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("table_a", b"key", b"value_a").expect("failed to put");
        tx.put("table_b", b"key", b"value_b").expect("failed to put");
        tx.put("", b"key", b"value_default").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    let tx = engine.begin_read().expect("failed to begin read");
    assert_eq!(tx.get("table_a", b"key").expect("failed to get"), b"value_a".to_vec());
    assert_eq!(tx.get("table_b", b"key").expect("failed to get"), b"value_b".to_vec());
    assert_eq!(tx.get("", b"key").expect("failed to get"), b"value_default".to_vec());

    // Each cursor only sees its own table
    for table in ["table_a", "table_b", ""] {
        let mut cursor = tx.cursor(table).expect("failed to create cursor");
        assert_eq!(cursor.seek(b"").expect("failed to seek"), Some(b"key".to_vec()));
        assert_eq!(cursor.next().expect("failed to next"), None);
    }
}

/// Bucket names containing the key separator are rejected.
#[test]
fn test_invalid_table_name() {
    let engine = RedbEngine::in_memory().expect("failed to create engine");

    let mut tx = engine.begin_write().expect("failed to begin write");
    assert!(matches!(tx.put("bad\0name", b"k", b"v"), Err(StorageError::InvalidTableName(_))));
    assert!(matches!(tx.get("bad\0name", b"k"), Err(StorageError::InvalidTableName(_))));
    assert!(tx.cursor("bad\0name").is_err());
}

/// Explicit rollback and drop both discard writes.
#[test]
fn test_rollback_discards_changes() {
    let engine = RedbEngine::in_memory().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("blobs", b"key", b"initial").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("blobs", b"key", b"modified").expect("failed to put");
        tx.put("blobs", b"dog", b"woof").expect("failed to put");
        tx.rollback().expect("failed to rollback");
    }

    // Dropping without commit also discards
    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.delete("blobs", b"key").expect("failed to delete");
    }

    let tx = engine.begin_read().expect("failed to begin read");
    assert_eq!(tx.get("blobs", b"key").expect("failed to get"), b"initial".to_vec());
    assert!(tx.get("blobs", b"dog").is_err_and(|e| e.is_not_found()));
}

/// A writer reads its own uncommitted writes.
#[test]
fn test_read_your_writes() {
    let engine = RedbEngine::in_memory().expect("failed to create engine");

    let mut tx = engine.begin_write().expect("failed to begin write");
    assert!(tx.get("blobs", b"key").is_err_and(|e| e.is_not_found()));
    tx.put("blobs", b"key", b"value").expect("failed to put");
    assert_eq!(tx.value_len("blobs", b"key").expect("failed to get len"), 5);

    let mut cursor = tx.cursor("blobs").expect("failed to create cursor");
    assert_eq!(cursor.seek(b"").expect("failed to seek"), Some(b"key".to_vec()));
}

/// A one-megabyte value round-trips with the right length.
#[test]
fn test_large_values() {
    let engine = RedbEngine::in_memory().expect("failed to create engine");
    let large_value = vec![0x5A_u8; 1 << 20];

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("blobs", b"large", &large_value).expect("failed to put large value");
        tx.commit().expect("failed to commit");
    }

    let tx = engine.begin_read().expect("failed to begin read");
    assert_eq!(tx.value_len("blobs", b"large").expect("failed to get len"), 1024 * 1024);
    assert_eq!(tx.get("blobs", b"large").expect("failed to get"), large_value);
}

/// Cursors stream buckets larger than one batch.
#[test]
fn test_cursor_spans_batches() {
    let engine = RedbEngine::in_memory().expect("failed to create engine");

    // Larger than the default batch size (1000)
    const NUM_KEYS: usize = 3500;

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        for i in 0..NUM_KEYS {
            let key = format!("key:{i:06}");
            tx.put("blobs", key.as_bytes(), b"v").expect("failed to put");
        }
        tx.commit().expect("failed to commit");
    }

    // Forward iteration across batches
    {
        let tx = engine.begin_read().expect("failed to begin read");
        let mut cursor = tx.cursor("blobs").expect("failed to create cursor");

        let mut count = 0;
        let mut last_key: Option<Vec<u8>> = None;
        let mut entry = cursor.seek(b"").expect("failed to seek");
        while let Some(k) = entry {
            if let Some(prev) = &last_key {
                assert!(k > *prev, "keys should be in ascending order");
            }
            last_key = Some(k);
            count += 1;
            entry = cursor.next().expect("failed to next");
        }
        assert_eq!(count, NUM_KEYS);
    }

    // Seeking into the middle, then continuing across a batch boundary
    {
        let tx = engine.begin_read().expect("failed to begin read");
        let mut cursor = tx.cursor("blobs").expect("failed to create cursor");

        let seek_key = format!("key:{:06}", NUM_KEYS / 2);
        let found = cursor.seek(seek_key.as_bytes()).expect("failed to seek");
        assert_eq!(found, Some(seek_key.into_bytes()));

        let mut remaining = 0;
        while cursor.next().expect("failed to next").is_some() {
            remaining += 1;
        }
        assert_eq!(remaining, NUM_KEYS - NUM_KEYS / 2 - 1);
    }
}

/// Tiny batches put a boundary on every step.
#[test]
fn test_cursor_tiny_batches() {
    let engine = RedbEngine::in_memory().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        for i in 0..10u8 {
            tx.put("blobs", &[i], &[i]).expect("failed to put");
        }
        tx.put("blobsx", &[0], &[0]).expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    let tx = engine.begin_read().expect("failed to begin read");
    for batch_size in [1, 2, 3, 10, 11] {
        let mut cursor =
            tx.cursor_with_batch_size("blobs", batch_size).expect("failed to create cursor");

        let mut seen = Vec::new();
        let mut entry = cursor.seek(&[3]).expect("failed to seek");
        while let Some(k) = entry {
            seen.push(k[0]);
            entry = cursor.next().expect("failed to next");
        }
        assert_eq!(seen, (3..10).collect::<Vec<u8>>(), "batch size {batch_size}");
    }
}

/// Two snapshots open at once agree.
#[test]
fn test_concurrent_snapshots() {
    let engine = RedbEngine::in_memory().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("blobs", b"cat", b"meow").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    let tx1 = engine.begin_read().expect("failed to begin read 1");
    let tx2 = engine.begin_read().expect("failed to begin read 2");
    assert_eq!(
        tx1.get("blobs", b"cat").expect("failed to get"),
        tx2.get("blobs", b"cat").expect("failed to get")
    );
}

/// Writers on different threads are serialized, none lost.
#[test]
fn test_concurrent_writers_serialize() {
    let engine = Arc::new(RedbEngine::in_memory().expect("failed to create engine"));

    let handles: Vec<_> = (0..8u8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut tx = engine.begin_write().expect("failed to begin write");
                tx.put("blobs", &[i], &[i]).expect("failed to put");
                tx.commit().expect("failed to commit");
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    let tx = engine.begin_read().expect("failed to begin read");
    for i in 0..8u8 {
        assert_eq!(tx.get("blobs", &[i]).expect("failed to get"), vec![i]);
    }
}

/// Data survives closing and reopening the file.
#[test]
fn test_persistence_across_reopen() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("test.redb");

    {
        let engine = RedbEngine::open(&path).expect("failed to open");
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("photos", b"cat", b"meow").expect("failed to put");
        tx.commit().expect("failed to commit");
        engine.close().expect("failed to close");
    }

    let engine = RedbEngine::open(&path).expect("failed to reopen");
    let tx = engine.begin_read().expect("failed to begin read");
    assert_eq!(tx.get("photos", b"cat").expect("failed to get"), b"meow".to_vec());
}
