//! Write-Ahead Log (WAL) Module
//!
//! The log file is the single source of truth. Every mutation is appended as
//! a self-describing record; records are never rewritten in place.
//!
//! ## Responsibilities
//! - Byte-exact record encoding/decoding
//! - CRC-32/BZIP2 over key + value for corruption detection
//! - Serialized appends with configurable fsync
//! - Index rebuild by replay, tolerating a torn final record
//!
//! ## File Format
//! No header, footer or magic number; just records back to back:
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Record 1                                                     │
//! │ ┌───────┬─────┬───────┬─────┬──────┬──────┬──────┬─────┬───┐ │
//! │ │Len (4)│Ver 1│Flags 1│CRC 4│TS (8)│KLen 2│VLen 4│ Key │Val│ │
//! │ └───────┴─────┴───────┴─────┴──────┴──────┴──────┴─────┴───┘ │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Record 2 ...                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod crc;
mod record;
mod writer;
mod reader;
mod recovery;

pub use crc::{crc32, key_value_crc};
pub use record::{
    check_lengths, decode, encode, peek_total_len, RecordFlags, WalRecord, HEADER_SIZE,
    LENGTH_PREFIX_SIZE, MAX_KEY_LEN, MAX_VALUE_LEN, RECORD_VERSION,
};
pub use writer::{AppendResult, WalWriter};
pub use reader::{read_range, ScanStep, TailKind, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
