//! Error types for VaultKV
//!
//! Provides a unified error type for all operations. The `Display` text of
//! each variant is what clients see across the network boundary.

use thiserror::Error;

/// Result type alias using VaultError
pub type Result<T> = std::result::Result<T, VaultError>;

/// Unified error type for VaultKV operations
#[derive(Debug, Error)]
pub enum VaultError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Record Errors
    // -------------------------------------------------------------------------
    #[error("insufficient data: need at least 4 bytes to read record length")]
    InsufficientData,

    #[error("record length mismatch: header declares {declared} bytes, {actual} supplied")]
    LengthMismatch { declared: u32, actual: usize },

    #[error("mismatched key/value lengths: fields imply {expected} bytes, header declares {declared}")]
    FieldLengthMismatch { expected: u64, declared: u32 },

    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("key too long: {len} bytes (max 65535)")]
    KeyTooLong { len: usize },

    #[error("value too long: {len} bytes (max 4294967295)")]
    ValueTooLong { len: usize },

    #[error("stored data is not valid UTF-8")]
    InvalidUtf8,

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("wrong number of arguments for '{command}' command")]
    WrongArgumentCount { command: String },

    #[error("invalid token '{0}': expected a value")]
    InvalidToken(String),

    #[error("invalid command '{0}'")]
    InvalidCommand(String),

    #[error("no command given")]
    EmptyCommand,

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VaultError {
    /// True for framing failures of a WAL record (short buffer, bad length
    /// prefix, inconsistent field lengths).
    pub fn is_malformed_record(&self) -> bool {
        matches!(
            self,
            VaultError::InsufficientData
                | VaultError::LengthMismatch { .. }
                | VaultError::FieldLengthMismatch { .. }
        )
    }

    /// True for caller mistakes that are reported verbatim and never retried.
    pub fn is_command_error(&self) -> bool {
        matches!(
            self,
            VaultError::WrongArgumentCount { .. }
                | VaultError::InvalidToken(_)
                | VaultError::InvalidCommand(_)
                | VaultError::EmptyCommand
                | VaultError::KeyTooLong { .. }
                | VaultError::ValueTooLong { .. }
        )
    }
}
