//! CRC-32/BZIP2 checksum
//!
//! Non-reflected CRC-32: polynomial `0x04C11DB7`, bytes fed MSB-first,
//! initial value and final XOR `0xFFFFFFFF`. The record format fixes this
//! variant, so the common reflected CRC-32 cannot be substituted.

use crc_fast::{checksum, CrcAlgorithm, Digest};

const ALGORITHM: CrcAlgorithm = CrcAlgorithm::Crc32Bzip2;

/// Checksum of a single buffer
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    checksum(ALGORITHM, data) as u32
}

/// Checksum over `key || value` without concatenating them
pub fn key_value_crc(key: &[u8], value: &[u8]) -> u32 {
    let mut digest = Digest::new(ALGORITHM);
    digest.update(key);
    digest.update(value);
    digest.finalize() as u32
}
