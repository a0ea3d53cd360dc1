//! WAL Writer
//!
//! Owns the append cursor of the log file. Records are written whole with a
//! single `write_all`; the tracked end position only moves once a record is
//! fully written and synced according to the configured strategy.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::WalSyncStrategy;
use crate::error::Result;
use super::WalRecord;

/// Byte range a record occupies in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendResult {
    /// Offset of the record's first byte
    pub start: u64,
    /// Offset just past the record (the file size after the append)
    pub end: u64,
}

impl AppendResult {
    /// Where the record's value lives, given its length
    pub fn value_range(&self, value_len: u64) -> (u64, u64) {
        (self.end - value_len, self.end)
    }
}

/// Appends records to the WAL file
pub struct WalWriter {
    file: File,
    path: PathBuf,
    position: u64,
    sync_strategy: WalSyncStrategy,
    unsynced: usize,
    last_timestamp: u64,
}

impl WalWriter {
    /// Open or create a WAL file positioned at its end
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let position = file.metadata()?.len();

        Ok(Self {
            file,
            path: path.to_path_buf(),
            position,
            sync_strategy,
            unsynced: 0,
            last_timestamp: 0,
        })
    }

    /// Append a record and return the byte range it now occupies.
    ///
    /// On failure the file is cut back to its previous length (best effort)
    /// and the position does not move.
    pub fn append(&mut self, record: &WalRecord) -> Result<AppendResult> {
        let bytes = record.encode()?;

        if let Err(e) = self.write_and_sync(&bytes) {
            self.rollback();
            return Err(e);
        }

        let start = self.position;
        self.position += bytes.len() as u64;

        Ok(AppendResult {
            start,
            end: self.position,
        })
    }

    fn write_and_sync(&mut self, bytes: &[u8]) -> Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()?;

        self.unsynced += 1;
        match self.sync_strategy {
            WalSyncStrategy::EveryWrite => self.sync()?,
            WalSyncStrategy::EveryNEntries { count } if self.unsynced >= count => self.sync()?,
            _ => {}
        }
        Ok(())
    }

    fn rollback(&mut self) {
        if let Err(e) = self.file.set_len(self.position) {
            tracing::error!(
                "Failed to roll back partial WAL append at offset {}: {}",
                self.position,
                e
            );
        }
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Cut the file to `len` bytes (used to drop a torn tail after recovery)
    pub fn truncate_to(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        self.file.sync_all()?;
        self.position = len;
        self.unsynced = 0;
        Ok(())
    }

    /// Timestamp for the next record: seconds since the epoch, never lower
    /// than any timestamp this writer handed out before.
    pub fn next_timestamp(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.last_timestamp = self.last_timestamp.max(now);
        self.last_timestamp
    }

    /// Never hand out a timestamp below `timestamp` (the newest one already
    /// in the log)
    pub fn seed_timestamp(&mut self, timestamp: u64) {
        self.last_timestamp = self.last_timestamp.max(timestamp);
    }

    /// Current end of the log
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Records written since the last fsync
    pub fn unsynced(&self) -> usize {
        self.unsynced
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wrap an already opened handle. Tests use this to inject a handle that
    /// refuses writes.
    #[cfg(test)]
    pub(crate) fn from_file(file: File, path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let position = file.metadata()?.len();
        Ok(Self {
            file,
            path: path.to_path_buf(),
            position,
            sync_strategy,
            unsynced: 0,
            last_timestamp: 0,
        })
    }
}
