//! WAL record codec
//!
//! One record is the atomic append unit of the log. All integers are
//! big-endian:
//!
//! ```text
//! ┌────────────┬─────────┬───────┬─────────┬───────────┬─────────┬───────────┬─────┬───────┐
//! │ total (4)  │ ver (1) │ flags │ crc (4) │ ts (8)    │ klen(2) │ vlen (4)  │ key │ value │
//! └────────────┴─────────┴───────┴─────────┴───────────┴─────────┴───────────┴─────┴───────┘
//! ```
//!
//! `total` counts the whole record including itself, so
//! `total == 24 + klen + vlen`. The CRC covers `key || value`.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::crc::key_value_crc;
use crate::error::{Result, VaultError};

/// Size of the length prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Fixed header size: total(4) + version(1) + flags(1) + crc(4) + ts(8) + klen(2) + vlen(4)
pub const HEADER_SIZE: usize = 4 + 1 + 1 + 4 + 8 + 2 + 4;

/// Longest key a record can carry
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

/// Longest value a record can carry
pub const MAX_VALUE_LEN: usize = u32::MAX as usize;

/// Record format version written by this crate
pub const RECORD_VERSION: u8 = 1;

/// Flag byte of a record
///
/// Bit 0 marks a tombstone, bit 1 is reserved for compression, bit 2 marks a
/// checkpoint. Bits 3-7 are reserved and carried through decode untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordFlags(u8);

impl RecordFlags {
    pub const DELETED: u8 = 0b0000_0001;
    pub const COMPRESSED: u8 = 0b0000_0010;
    pub const CHECKPOINT: u8 = 0b0000_0100;
    pub const RESERVED_MASK: u8 = 0b1111_1000;

    pub fn new(deleted: bool, checkpoint: bool) -> Self {
        let mut bits = 0;
        if deleted {
            bits |= Self::DELETED;
        }
        if checkpoint {
            bits |= Self::CHECKPOINT;
        }
        Self(bits)
    }

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_deleted(self) -> bool {
        self.0 & Self::DELETED != 0
    }

    pub fn is_compressed(self) -> bool {
        self.0 & Self::COMPRESSED != 0
    }

    pub fn is_checkpoint(self) -> bool {
        self.0 & Self::CHECKPOINT != 0
    }

    pub fn reserved(self) -> u8 {
        self.0 & Self::RESERVED_MASK
    }
}

/// A decoded (or to-be-encoded) log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalRecord {
    pub version: u8,
    pub flags: RecordFlags,
    /// Seconds since the Unix epoch when the record was written
    pub timestamp: u64,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl WalRecord {
    /// A live key/value record
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>, timestamp: u64) -> Self {
        Self {
            version: RECORD_VERSION,
            flags: RecordFlags::new(false, false),
            timestamp,
            key: key.into(),
            value: value.into(),
        }
    }

    /// A tombstone for `key`. The payload is kept only so the record stays
    /// self-describing; replay ignores it.
    pub fn tombstone(key: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>, timestamp: u64) -> Self {
        Self {
            version: RECORD_VERSION,
            flags: RecordFlags::new(true, false),
            timestamp,
            key: key.into(),
            value: payload.into(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.flags.is_deleted()
    }

    /// Encoded size of this record in bytes
    pub fn total_len(&self) -> u64 {
        (HEADER_SIZE + self.key.len() + self.value.len()) as u64
    }

    pub fn value_len(&self) -> u64 {
        self.value.len() as u64
    }

    /// Serialize to the on-disk layout.
    ///
    /// Oversized keys and values are rejected, never truncated.
    pub fn encode(&self) -> Result<Bytes> {
        check_lengths(&self.key, &self.value)?;

        let total = HEADER_SIZE + self.key.len() + self.value.len();
        let mut buf = BytesMut::with_capacity(total);
        buf.put_u32(total as u32);
        buf.put_u8(self.version);
        buf.put_u8(self.flags.bits());
        buf.put_u32(key_value_crc(&self.key, &self.value));
        buf.put_u64(self.timestamp);
        buf.put_u16(self.key.len() as u16);
        buf.put_u32(self.value.len() as u32);
        buf.put_slice(&self.key);
        buf.put_slice(&self.value);

        debug_assert_eq!(buf.len(), total);
        Ok(buf.freeze())
    }

    /// Parse exactly one record. `bytes` must hold that record and nothing else.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LENGTH_PREFIX_SIZE {
            return Err(VaultError::InsufficientData);
        }

        let mut buf = bytes;
        let declared = buf.get_u32();
        if declared as usize != bytes.len() {
            return Err(VaultError::LengthMismatch {
                declared,
                actual: bytes.len(),
            });
        }
        if bytes.len() < HEADER_SIZE {
            return Err(VaultError::FieldLengthMismatch {
                expected: HEADER_SIZE as u64,
                declared,
            });
        }

        let version = buf.get_u8();
        let flags = RecordFlags::from_bits(buf.get_u8());
        let stored_crc = buf.get_u32();
        let timestamp = buf.get_u64();
        let key_len = buf.get_u16() as usize;
        let value_len = buf.get_u32() as usize;

        let expected = HEADER_SIZE as u64 + key_len as u64 + value_len as u64;
        if expected != declared as u64 {
            return Err(VaultError::FieldLengthMismatch { expected, declared });
        }

        let (key, value) = buf.split_at(key_len);
        let computed = key_value_crc(key, value);
        if computed != stored_crc {
            return Err(VaultError::ChecksumMismatch {
                stored: stored_crc,
                computed,
            });
        }

        Ok(Self {
            version,
            flags,
            timestamp,
            key: key.to_vec(),
            value: value.to_vec(),
        })
    }
}

/// Encode a record from its parts. Returns the bytes and their length.
pub fn encode(
    version: u8,
    deleted: bool,
    timestamp: u64,
    checkpoint: bool,
    key: &[u8],
    value: &[u8],
) -> Result<(Bytes, u32)> {
    let record = WalRecord {
        version,
        flags: RecordFlags::new(deleted, checkpoint),
        timestamp,
        key: key.to_vec(),
        value: value.to_vec(),
    };
    let bytes = record.encode()?;
    let total = bytes.len() as u32;
    Ok((bytes, total))
}

/// Decode exactly one record.
pub fn decode(bytes: &[u8]) -> Result<WalRecord> {
    WalRecord::decode(bytes)
}

/// Read the length prefix at the front of `bytes`, if there is one.
pub fn peek_total_len(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < LENGTH_PREFIX_SIZE {
        return None;
    }
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Reject keys and values that do not fit their length fields.
pub fn check_lengths(key: &[u8], value: &[u8]) -> Result<()> {
    if key.len() > MAX_KEY_LEN {
        return Err(VaultError::KeyTooLong { len: key.len() });
    }
    // total_length is a u32 as well, so the header and key eat into the value budget
    if value.len() > MAX_VALUE_LEN - HEADER_SIZE - key.len() {
        return Err(VaultError::ValueTooLong { len: value.len() });
    }
    Ok(())
}
