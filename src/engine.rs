//! Engine Module
//!
//! The storage engine that owns the log file and the index.
//!
//! ## Responsibilities
//! - Rebuild the index from the WAL before serving anything
//! - Append every mutation to the log before it becomes visible
//! - Serve reads by seeking into the log at the indexed range
//! - Route validated commands to the matching operation

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::index::{Index, IndexEntry};
use crate::protocol::{
    tokenize, Command, CommandKind, FALSE_REPLY, KEYS_SEPARATOR, NIL_REPLY, OK_REPLY, TRUE_REPLY,
};
use crate::wal::{
    check_lengths, read_range, RecoveryResult, TailKind, WalRecord, WalRecovery, WalWriter,
};

/// The main storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (set/del): Serialized by the `wal` mutex
///   - The lock is held from the append until the index is updated, so the
///     index applies writes in the same order as the log
///   - The index is touched only after the append succeeded
///
/// - **Reads** (get/exists/keys): Never take the `wal` mutex
///   - Index uses an internal RwLock (many concurrent readers)
///   - Every indexed range is already fully written, so a GET can open its
///     own handle and read while appends continue at the tail
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// The log file (single source of truth)
    log_path: PathBuf,

    /// Append handle (exclusive access needed)
    wal: Mutex<WalWriter>,

    /// key → value range in the log (internal RwLock)
    index: Index,

    /// What the startup replay found
    recovery: RecoveryResult,

    /// Where a damaged tail was copied before it was cut off
    preserved_tail: Option<PathBuf>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Replay the log into a fresh index (missing file = empty store)
    /// 2. Open the log for appending
    /// 3. Cut off the untrusted tail so new records follow the last good one.
    ///    A torn final append is simply dropped; damaged framing with more
    ///    data behind it is first copied to `<log>.corrupt-<offset>`
    ///
    /// Fails if the log exists but cannot be read.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let log_path = config.log_path.clone();

        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        tracing::info!("Building index from {}", log_path.display());
        let index = Index::new();
        let recovery = WalRecovery::recover(&log_path, &index)?;

        let mut wal = WalWriter::open(&log_path, config.wal_sync_strategy)?;
        wal.seed_timestamp(recovery.max_timestamp);

        let mut preserved_tail = None;
        if recovery.was_truncated && wal.position() > recovery.valid_len {
            if recovery.tail == TailKind::Corrupt {
                let sidecar = WalRecovery::preserve_tail(&log_path, recovery.valid_len)?;
                tracing::warn!(
                    "Log damaged at offset {}; {} bytes after it saved to {}",
                    recovery.valid_len,
                    wal.position() - recovery.valid_len,
                    sidecar.display()
                );
                preserved_tail = Some(sidecar);
            }
            tracing::warn!(
                "Truncating log tail: {} -> {} bytes",
                wal.position(),
                recovery.valid_len
            );
            wal.truncate_to(recovery.valid_len)?;
        }

        tracing::info!(
            "Index built: {} keys, {} records replayed ({} tombstones, {} corrupt)",
            index.len(),
            recovery.records_recovered,
            recovery.tombstones,
            recovery.records_corrupted
        );

        Ok(Self {
            config,
            log_path,
            wal: Mutex::new(wal),
            index,
            recovery,
            preserved_tail,
        })
    }

    /// Open with a log path (convenience method)
    ///
    /// Uses default config with the specified log file
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().log_path(path).build();
        Self::open(config)
    }

    /// Validate and run a command given as kind + argument strings
    pub fn execute(&self, kind: CommandKind, args: &[String]) -> Result<String> {
        let command = Command::from_parts(kind, args)?;
        self.apply(command)
    }

    /// Tokenize, validate and run one request line
    pub fn execute_line(&self, line: &str) -> Result<String> {
        let tokens = tokenize(line);
        let command = Command::from_tokens(&tokens)?;
        self.apply(command)
    }

    /// Run an already validated command and render its textual result
    pub fn apply(&self, command: Command) -> Result<String> {
        tracing::trace!("Executing {:?}", command);

        match command {
            Command::Get { key } => Ok(self.get(&key)?.unwrap_or_else(|| NIL_REPLY.to_string())),
            Command::Set { key, value } => {
                self.set(&key, &value)?;
                Ok(OK_REPLY.to_string())
            }
            Command::Del { key } => {
                let reply = if self.del(&key)? { OK_REPLY } else { NIL_REPLY };
                Ok(reply.to_string())
            }
            Command::Exists { key } => {
                let reply = if self.exists(&key) { TRUE_REPLY } else { FALSE_REPLY };
                Ok(reply.to_string())
            }
            Command::Keys => {
                let keys = self.keys();
                if keys.is_empty() {
                    Ok(NIL_REPLY.to_string())
                } else {
                    Ok(keys.join(KEYS_SEPARATOR))
                }
            }
        }
    }

    /// Get a value by key
    ///
    /// Looks up the range in the index and reads exactly those bytes from
    /// the log. Read failures are errors, not misses.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = match self.index.get(key) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let bytes = read_range(&self.log_path, entry.start, entry.end)?;
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| VaultError::InvalidUtf8)
    }

    /// Set a key-value pair
    ///
    /// Steps:
    /// 1. Reject oversized input before any I/O
    /// 2. Acquire the write lock
    /// 3. Append the record (synced per strategy)
    /// 4. Point the index at the new value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        check_lengths(key.as_bytes(), value.as_bytes())?;

        let mut wal = self.wal.lock();
        let record = WalRecord::put(key, value, wal.next_timestamp());
        let appended = wal.append(&record)?;

        let (start, end) = appended.value_range(record.value_len());
        self.index.upsert(key.to_string(), IndexEntry::new(start, end));

        Ok(())
    }

    /// Delete a key
    ///
    /// Returns `false` without writing anything when the key is absent.
    /// Otherwise appends a tombstone, then drops the index entry.
    pub fn del(&self, key: &str) -> Result<bool> {
        check_lengths(key.as_bytes(), NIL_REPLY.as_bytes())?;

        let mut wal = self.wal.lock();
        if !self.index.contains(key) {
            return Ok(false);
        }

        let record = WalRecord::tombstone(key, NIL_REPLY, wal.next_timestamp());
        wal.append(&record)?;
        self.index.remove(key);

        Ok(true)
    }

    /// Index membership check, no I/O
    pub fn exists(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    /// All live keys in ascending order
    pub fn keys(&self) -> Vec<String> {
        self.index.keys()
    }

    /// Force an fsync of the log
    pub fn sync(&self) -> Result<()> {
        self.wal.lock().sync()
    }

    /// Close the engine gracefully
    ///
    /// Waits for any in-flight write (it holds the same lock) and syncs the
    /// log to disk.
    pub fn close(self) -> Result<()> {
        let mut wal = self.wal.lock();
        wal.sync()?;
        tracing::info!("Engine closed, log synced at {} bytes", wal.position());
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the log file path
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current end of the log
    pub fn log_size(&self) -> u64 {
        self.wal.lock().position()
    }

    /// Indexed range of a key
    pub fn index_entry(&self, key: &str) -> Option<IndexEntry> {
        self.index.get(key)
    }

    /// Statistics from the startup replay
    pub fn recovery_result(&self) -> &RecoveryResult {
        &self.recovery
    }

    /// Sidecar holding bytes cut off a damaged log at open, if any
    pub fn preserved_tail(&self) -> Option<&Path> {
        self.preserved_tail.as_deref()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
