//! # VaultKV
//!
//! A single-node key-value store with:
//! - An append-only write-ahead log (WAL) as the only persistent state
//! - An in-memory index of value offsets, rebuilt from the log on start
//! - Crash recovery that tolerates a torn final record
//! - Single-writer/multi-reader concurrency model
//! - A line-oriented TCP client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  "SET k v\n"
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Tokenizer + Command Validation                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │            (Single Writer / Multi Reader)                    │
//! └──────────┬─────────────────────────────────┬────────────────┘
//!            │ append                          │ upsert / lookup
//!            ▼                                 ▼
//!     ┌─────────────┐   value ranges    ┌─────────────┐
//!     │     WAL     │ ◄──────────────── │    Index    │
//!     │  (Append)   │    (seek+read)    │  (RwLock)   │
//!     └─────────────┘                   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod index;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, VaultError};
pub use config::{Config, WalSyncStrategy};
pub use engine::Engine;
pub use protocol::{Command, CommandKind};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of VaultKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
