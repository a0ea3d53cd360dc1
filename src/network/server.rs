//! TCP Server
//!
//! Accepts connections and runs each on its own thread.

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::sync::WaitGroup;
use parking_lot::Mutex;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::Response;
use super::Connection;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Sent to a client that arrives while every slot is taken
pub const SERVER_BUSY_MESSAGE: &str = "server busy, please try again later";

type ConnectionTable = Arc<Mutex<HashMap<u64, TcpStream>>>;

/// TCP server for VaultKV
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    connections: ConnectionTable,
    next_connection_id: AtomicU64,
}

/// Stops a running [`Server`] from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Removes a connection from the table when its thread ends, even on panic
struct ConnectionSlot {
    id: u64,
    connections: ConnectionTable,
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.connections.lock().remove(&self.id);
    }
}

impl Server {
    /// Bind the listener. The engine must already be open (index rebuilt).
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            connections: Arc::new(Mutex::new(HashMap::new())),
            next_connection_id: AtomicU64::new(1),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Number of connected clients
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Start the server (blocking)
    ///
    /// Returns after shutdown has been signalled and every connection thread
    /// has finished its current command.
    pub fn run(&self) -> Result<()> {
        let wait_group = WaitGroup::new();

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = self.admit(stream, addr, wait_group.clone()) {
                        tracing::warn!("Failed to set up connection from {}: {}", addr, e);
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                }
            }
        }

        tracing::info!("Shutting down server");
        self.close_connections();
        wait_group.wait();
        tracing::info!("All connections closed");

        Ok(())
    }

    fn admit(&self, stream: TcpStream, addr: SocketAddr, wait_group: WaitGroup) -> Result<()> {
        // Some platforms hand out accepted sockets in non-blocking mode.
        stream.set_nonblocking(false)?;

        let count = self.connection_count();
        if count >= self.config.max_connections {
            tracing::warn!(
                "Connection limit reached ({}/{}), rejecting {}",
                count,
                self.config.max_connections,
                addr
            );
            let mut stream = stream;
            let busy = Response::error(SERVER_BUSY_MESSAGE);
            let _ = writeln!(stream, "{}", busy.to_line());
            return Ok(());
        }

        let id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        self.connections.lock().insert(id, stream.try_clone()?);
        let slot = ConnectionSlot {
            id,
            connections: Arc::clone(&self.connections),
        };

        let mut connection = Connection::new(stream, Arc::clone(&self.engine), &self.config)?;

        tracing::info!(
            "New client connected: {} ({} active)",
            addr,
            self.connection_count()
        );

        thread::Builder::new()
            .name(format!("vaultkv-conn-{}", id))
            .spawn(move || {
                let _slot = slot;
                let _wait_group = wait_group;
                if let Err(e) = connection.handle() {
                    tracing::warn!("Client {} handling error: {}", connection.peer_addr(), e);
                }
                tracing::info!("Client disconnected: {}", connection.peer_addr());
            })?;

        Ok(())
    }

    /// Shut down every client socket so blocked reads return
    fn close_connections(&self) {
        for stream in self.connections.lock().values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}
