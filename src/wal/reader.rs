//! WAL Reader
//!
//! Sequential scanning of log bytes, plus positional reads of value ranges
//! referenced by the index.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Result, VaultError};
use super::record::{peek_total_len, HEADER_SIZE, LENGTH_PREFIX_SIZE};
use super::WalRecord;

/// One step of a scan
#[derive(Debug)]
pub enum ScanStep {
    /// A record that decoded cleanly, with its byte range in the log
    Record {
        record: WalRecord,
        start: u64,
        end: u64,
    },

    /// A well-framed record whose payload failed verification. The scan
    /// skipped it and continues at `end`.
    Corrupt {
        start: u64,
        end: u64,
        error: VaultError,
    },
}

/// What follows the last trusted record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TailKind {
    /// The scan consumed every byte
    #[default]
    Clean,

    /// The leftover bytes are the start of a single record that never
    /// finished writing: fewer than 4 bytes, or a plausible length prefix
    /// that runs past the end of the file
    Torn,

    /// The scan stopped on damaged framing with bytes after it that may
    /// still hold committed records
    Corrupt,
}

/// Forward-only scanner over the bytes of a log file
///
/// Yields records in file order and stops at the first position where a
/// record boundary can no longer be trusted: fewer than 4 bytes left, a
/// length prefix that is too small or runs past the buffer, or field
/// lengths that disagree with the prefix.
pub struct WalReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    stop: Option<VaultError>,
    tail: TailKind,
    done: bool,
}

impl<'a> WalReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            stop: None,
            tail: TailKind::Clean,
            done: false,
        }
    }

    /// Read the next step, or `None` once the scan has stopped
    pub fn next_step(&mut self) -> Option<ScanStep> {
        if self.done {
            return None;
        }

        let remaining = &self.bytes[self.offset..];
        if remaining.len() < LENGTH_PREFIX_SIZE {
            if !remaining.is_empty() {
                self.halt(VaultError::InsufficientData, TailKind::Torn);
            }
            self.done = true;
            return None;
        }

        let total = peek_total_len(remaining).unwrap_or(0) as usize;
        if total < HEADER_SIZE || total > remaining.len() {
            let tail = if total >= HEADER_SIZE && header_is_consistent(remaining, total) {
                TailKind::Torn
            } else {
                TailKind::Corrupt
            };
            self.halt(
                VaultError::LengthMismatch {
                    declared: total as u32,
                    actual: remaining.len(),
                },
                tail,
            );
            return None;
        }

        let start = self.offset as u64;
        let end = start + total as u64;

        match WalRecord::decode(&remaining[..total]) {
            Ok(record) => {
                self.offset += total;
                Some(ScanStep::Record { record, start, end })
            }
            Err(error @ VaultError::ChecksumMismatch { .. }) => {
                self.offset += total;
                Some(ScanStep::Corrupt { start, end, error })
            }
            Err(error) => {
                self.halt(error, TailKind::Corrupt);
                None
            }
        }
    }

    fn halt(&mut self, error: VaultError, tail: TailKind) {
        self.stop = Some(error);
        self.tail = tail;
        self.done = true;
    }

    /// Offset just past the last record the scan accepted or skipped.
    /// Everything beyond it is an untrusted tail.
    pub fn valid_len(&self) -> u64 {
        self.offset as u64
    }

    /// Why the scan stopped early, if it did
    pub fn stop_error(&self) -> Option<&VaultError> {
        self.stop.as_ref()
    }

    /// Classification of the bytes after `valid_len`
    pub fn tail(&self) -> TailKind {
        self.tail
    }
}

/// For a record cut short by a crash, whatever part of the header made it
/// to disk agrees with the length prefix. A damaged prefix usually does not.
fn header_is_consistent(bytes: &[u8], total: usize) -> bool {
    if bytes.len() < HEADER_SIZE {
        return true;
    }
    let key_len = u16::from_be_bytes([bytes[18], bytes[19]]) as usize;
    let value_len = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]) as usize;
    HEADER_SIZE + key_len + value_len == total
}

impl<'a> Iterator for WalReader<'a> {
    type Item = ScanStep;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_step()
    }
}

/// Read exactly `end - start` bytes at `start` from the log file.
///
/// A short read is an error, never an empty value.
pub fn read_range(path: &Path, start: u64, end: u64) -> Result<Vec<u8>> {
    let len = end.checked_sub(start).ok_or_else(|| {
        VaultError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid value range {}..{}", start, end),
        ))
    })?;

    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(start))?;

    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf)?;
    Ok(buf)
}
