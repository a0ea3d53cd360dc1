//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor loop (non-blocking, polls a shutdown flag)
//! - One thread per connection, capped at `max_connections`
//! - Every request line goes through `Engine::execute_line`

mod server;
mod connection;

pub use server::{Server, ShutdownHandle, SERVER_BUSY_MESSAGE};
pub use connection::Connection;
