//! Index implementation
//!
//! BTreeMap-based index with RwLock for concurrency.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::IndexEntry;

/// Concurrent key → value-range map
///
/// Every method takes `&self`; the lock never escapes, so callers cannot hold
/// references into the map.
#[derive(Debug, Default)]
pub struct Index {
    entries: RwLock<BTreeMap<String, IndexEntry>>,
}

impl Index {
    /// Create a new empty Index
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key (read lock)
    pub fn get(&self, key: &str) -> Option<IndexEntry> {
        self.entries.read().get(key).copied()
    }

    /// Insert or overwrite a key's range (write lock).
    /// Returns the previous range, if any.
    pub fn upsert(&self, key: String, entry: IndexEntry) -> Option<IndexEntry> {
        self.entries.write().insert(key, entry)
    }

    /// Remove a key (write lock). Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Option<IndexEntry> {
        self.entries.write().remove(key)
    }

    /// Membership check (read lock)
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Snapshot of all keys in ascending order
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
