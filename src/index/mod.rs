//! Index Module
//!
//! In-memory map from key to the byte range of its latest value in the log.
//!
//! ## Responsibilities
//! - Point lookup, upsert, delete and key enumeration
//! - Safe concurrent access (many readers, one writer at a time)
//! - Holds no value bytes; the log is the single source of truth
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in a RwLock:
//! - Sorted keys give a stable `KEYS` listing
//! - Rebuilt from the WAL on every start, never persisted

mod table;

pub use table::Index;

/// Location of a key's current value inside the log file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Offset of the first value byte
    pub start: u64,

    /// Offset just past the last value byte
    pub end: u64,
}

impl IndexEntry {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "index range {}..{} is inverted", start, end);
        Self { start, end }
    }

    /// Length of the value in bytes
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
