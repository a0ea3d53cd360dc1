//! Index Tests
//!
//! Tests verify:
//! - Basic lookup / upsert / remove
//! - Sorted key enumeration
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use vaultkv::index::{Index, IndexEntry};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_index_is_empty() {
    let index = Index::new();
    assert!(index.is_empty());
    assert_eq!(index.len(), 0);
    assert!(index.keys().is_empty());
}

#[test]
fn test_upsert_and_get() {
    let index = Index::new();

    let previous = index.upsert("a".to_string(), IndexEntry::new(25, 26));

    assert_eq!(previous, None);
    assert_eq!(index.get("a"), Some(IndexEntry::new(25, 26)));
    assert!(index.contains("a"));
}

#[test]
fn test_upsert_overwrites() {
    let index = Index::new();
    index.upsert("a".to_string(), IndexEntry::new(25, 26));

    let previous = index.upsert("a".to_string(), IndexEntry::new(51, 52));

    assert_eq!(previous, Some(IndexEntry::new(25, 26)));
    assert_eq!(index.get("a"), Some(IndexEntry::new(51, 52)));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_remove() {
    let index = Index::new();
    index.upsert("a".to_string(), IndexEntry::new(0, 1));

    assert_eq!(index.remove("a"), Some(IndexEntry::new(0, 1)));
    assert_eq!(index.get("a"), None);
    assert!(!index.contains("a"));
}

#[test]
fn test_remove_missing_is_noop() {
    let index = Index::new();
    index.upsert("a".to_string(), IndexEntry::new(0, 1));

    assert_eq!(index.remove("nope"), None);
    assert_eq!(index.len(), 1);
}

#[test]
fn test_keys_are_sorted() {
    let index = Index::new();
    for key in ["pear", "apple", "fig", "banana"] {
        index.upsert(key.to_string(), IndexEntry::new(0, 0));
    }

    assert_eq!(index.keys(), vec!["apple", "banana", "fig", "pear"]);
}

#[test]
fn test_clear() {
    let index = Index::new();
    index.upsert("a".to_string(), IndexEntry::new(0, 1));
    index.upsert("b".to_string(), IndexEntry::new(1, 2));

    index.clear();

    assert!(index.is_empty());
}

#[test]
fn test_entry_len() {
    let entry = IndexEntry::new(100, 108);
    assert_eq!(entry.len(), 8);
    assert!(!entry.is_empty());
    assert!(IndexEntry::new(5, 5).is_empty());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers_disjoint_keys() {
    let index = Arc::new(Index::new());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for i in 0..250u64 {
                    index.upsert(format!("t{}-{}", t, i), IndexEntry::new(i, i + 1));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(index.len(), 8 * 250);
}

#[test]
fn test_concurrent_readers_and_writer() {
    let index = Arc::new(Index::new());
    for i in 0..100u64 {
        index.upsert(format!("key{}", i), IndexEntry::new(i, i + 1));
    }

    let writer = {
        let index = Arc::clone(&index);
        thread::spawn(move || {
            for i in 0..100u64 {
                index.upsert(format!("key{}", i), IndexEntry::new(1000 + i, 1001 + i));
                index.remove(&format!("extra{}", i));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for _ in 0..50 {
                    for i in 0..100u64 {
                        // Every lookup sees either the old or the new range, never a torn one.
                        let entry = index.get(&format!("key{}", i)).unwrap();
                        assert_eq!(entry.len(), 1);
                    }
                    assert_eq!(index.keys().len(), 100);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(index.get("key7"), Some(IndexEntry::new(1007, 1008)));
}
