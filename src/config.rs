//! Configuration for VaultKV
//!
//! Centralized configuration with sensible defaults. A config can be built in
//! code with [`Config::builder`] or loaded from a TOML file:
//!
//! ```toml
//! log_path = "./vaultic.log"
//! listen_addr = "127.0.0.1:5381"
//! max_connections = 100
//!
//! [wal_sync_strategy]
//! mode = "every_n_entries"
//! count = 100
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, VaultError};

/// Main configuration for a VaultKV instance
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// The write-ahead log file. It is the only persistent state; the index
    /// is rebuilt from it on every start.
    pub log_path: PathBuf,

    /// Sync strategy: how often to fsync the log
    pub wal_sync_strategy: WalSyncStrategy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Longest accepted request line (bytes)
    pub max_message_size: usize,

    // -------------------------------------------------------------------------
    // Logging Configuration
    // -------------------------------------------------------------------------
    /// Default tracing filter, used when `RUST_LOG` is not set
    pub log_level: String,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced records (balanced durability/performance)
    EveryNEntries { count: usize },

    /// Never fsync explicitly; records reach the OS page cache before the
    /// write is acknowledged
    OsBuffered,
}

impl Default for WalSyncStrategy {
    fn default() -> Self {
        WalSyncStrategy::EveryWrite
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("./vaultic.log"),
            wal_sync_strategy: WalSyncStrategy::EveryWrite,
            listen_addr: "127.0.0.1:5381".to_string(),
            max_connections: 100,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            max_message_size: 1024 * 1024, // 1 MB
            log_level: "info,vaultkv=debug".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse a config from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| VaultError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VaultError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject values the engine or server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.log_path.as_os_str().is_empty() {
            return Err(VaultError::Config("log_path must not be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(VaultError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.max_message_size == 0 {
            return Err(VaultError::Config(
                "max_message_size must be at least 1".to_string(),
            ));
        }
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(VaultError::Config(
                "every_n_entries sync needs a count of at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from an existing config (e.g. one loaded from a file)
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the write-ahead log file path
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the longest accepted request line (in bytes)
    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.config.max_message_size = bytes;
        self
    }

    /// Set the default tracing filter
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
