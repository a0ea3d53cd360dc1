//! WAL Recovery
//!
//! Rebuilds the index by replaying the log in a single forward pass.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::index::{Index, IndexEntry};
use super::reader::{ScanStep, TailKind, WalReader};

/// Handles index rebuild after a restart or crash
pub struct WalRecovery;

/// Result of a recovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Records replayed (live writes and tombstones)
    pub records_recovered: u64,

    /// Of those, how many were tombstones
    pub tombstones: u64,

    /// Well-framed records skipped because their payload failed verification
    pub records_corrupted: u64,

    /// Offset just past the last trusted record
    pub valid_len: u64,

    /// Size of the log when it was read
    pub file_len: u64,

    /// Whether untrusted bytes follow `valid_len`
    pub was_truncated: bool,

    /// What those bytes look like: a torn final append, or damage that may
    /// hide committed records
    pub tail: TailKind,

    /// Highest timestamp among replayed records
    pub max_timestamp: u64,
}

impl WalRecovery {
    /// Replay the log at `path` into `index`.
    ///
    /// A missing file is an empty store. Any other read failure is returned;
    /// the caller must not start with an empty index in that case.
    pub fn recover(path: &Path, index: &Index) -> Result<RecoveryResult> {
        match fs::read(path) {
            Ok(bytes) => Ok(Self::replay(&bytes, index)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("No log file found at {}, starting empty", path.display());
                Ok(RecoveryResult::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replay raw log bytes into `index`, in file order.
    ///
    /// Later records always win; timestamps are not compared.
    pub fn replay(bytes: &[u8], index: &Index) -> RecoveryResult {
        Self::scan(bytes, Some(index))
    }

    /// Scan the log at `path` and report what recovery would see, without
    /// building anything.
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        match fs::read(path) {
            Ok(bytes) => Ok(Self::scan(&bytes, None)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(RecoveryResult::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Copy every byte from `offset` to the end of the log into a sidecar
    /// file next to it (`<log>.corrupt-<offset>`, with a numeric suffix if
    /// that name is taken). Returns the sidecar path.
    pub fn preserve_tail(path: &Path, offset: u64) -> Result<PathBuf> {
        let mut source = File::open(path)?;
        source.seek(SeekFrom::Start(offset))?;
        let mut tail = Vec::new();
        source.read_to_end(&mut tail)?;

        let base = {
            let mut name = path.as_os_str().to_owned();
            name.push(format!(".corrupt-{}", offset));
            PathBuf::from(name)
        };

        let mut attempt = 0u32;
        loop {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                let mut name = base.as_os_str().to_owned();
                name.push(format!(".{}", attempt));
                PathBuf::from(name)
            };

            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(mut file) => {
                    file.write_all(&tail)?;
                    file.sync_all()?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn scan(bytes: &[u8], index: Option<&Index>) -> RecoveryResult {
        let mut result = RecoveryResult {
            file_len: bytes.len() as u64,
            ..Default::default()
        };
        let mut reader = WalReader::new(bytes);

        for step in reader.by_ref() {
            match step {
                ScanStep::Record { record, start, end } => {
                    result.max_timestamp = result.max_timestamp.max(record.timestamp);
                    let deleted = record.is_deleted();
                    let value_len = record.value_len();

                    let key = match String::from_utf8(record.key) {
                        Ok(key) => key,
                        Err(_) => {
                            tracing::warn!(
                                "Skipping record at offset {}: key is not valid UTF-8",
                                start
                            );
                            result.records_corrupted += 1;
                            continue;
                        }
                    };

                    result.records_recovered += 1;
                    if deleted {
                        result.tombstones += 1;
                        if let Some(index) = index {
                            index.remove(&key);
                        }
                    } else if let Some(index) = index {
                        index.upsert(key, IndexEntry::new(end - value_len, end));
                    }
                }
                ScanStep::Corrupt { start, end, error } => {
                    tracing::warn!("Skipping corrupt record at {}..{}: {}", start, end, error);
                    result.records_corrupted += 1;
                }
            }
        }

        result.valid_len = reader.valid_len();
        result.was_truncated = result.valid_len < result.file_len;
        result.tail = reader.tail();

        if let Some(error) = reader.stop_error() {
            tracing::warn!(
                "Discarding {} trailing bytes after offset {}: {}",
                result.file_len - result.valid_len,
                result.valid_len,
                error
            );
        }

        result
    }
}
