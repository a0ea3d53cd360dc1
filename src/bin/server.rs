//! VaultKV Server Binary
//!
//! Rebuilds the index from the log, then serves the line protocol over TCP.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use vaultkv::config::ConfigBuilder;
use vaultkv::network::Server;
use vaultkv::{Config, Engine};

/// VaultKV Server
#[derive(Parser, Debug)]
#[command(name = "vaultkv-server")]
#[command(about = "Single-node key-value store backed by a write-ahead log")]
#[command(version)]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write-ahead log file
    #[arg(short = 'p', long)]
    log_path: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(short, long)]
    listen: Option<String>,

    /// Maximum concurrent connections
    #[arg(short, long)]
    max_connections: Option<usize>,
}

fn load_config(args: &Args) -> vaultkv::Result<Config> {
    let base = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let mut builder = ConfigBuilder::from_config(base);
    if let Some(path) = &args.log_path {
        builder = builder.log_path(path);
    }
    if let Some(addr) = &args.listen {
        builder = builder.listen_addr(addr);
    }
    if let Some(count) = args.max_connections {
        builder = builder.max_connections(count);
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}

fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("vaultkv-server: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    tracing::info!("VaultKV Server v{}", vaultkv::VERSION);
    tracing::info!("Log file: {}", config.log_path.display());
    tracing::info!("Listen address: {}", config.listen_addr);

    // Never serve from an empty index when the log exists but is unreadable
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let server = match Server::bind(config, Arc::clone(&engine)) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    drop(server);
    match Arc::try_unwrap(engine) {
        Ok(engine) => {
            if let Err(e) = engine.close() {
                tracing::error!("Failed to close engine: {}", e);
            }
        }
        Err(engine) => {
            if let Err(e) = engine.sync() {
                tracing::error!("Failed to sync log: {}", e);
            }
        }
    }

    tracing::info!("Server stopped");
}
