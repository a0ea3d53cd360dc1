//! Protocol Module
//!
//! Text line protocol between clients and the server.
//!
//! ## Commands
//! - `GET key`          → value or `(nil)`
//! - `SET key value`    → `OK`
//! - `DEL key`          → `OK` or `(nil)`
//! - `EXISTS key`       → `true` / `false`
//! - `KEYS`             → `k1, k2, ...` or `(nil)`
//!
//! Keywords are case-insensitive. Errors come back as `(error) <message>`.

mod command;
mod token;
mod response;
mod codec;

pub use command::{Command, CommandKind};
pub use token::{tokenize, Token, TokenKind};
pub use response::{Response, ERROR_PREFIX};
pub use codec::{read_line, read_request, read_response, write_request, write_response};

/// Reply to a successful write
pub const OK_REPLY: &str = "OK";

/// Reply for a missing key or an empty listing
pub const NIL_REPLY: &str = "(nil)";

pub const TRUE_REPLY: &str = "true";
pub const FALSE_REPLY: &str = "false";

/// Separator between keys in a `KEYS` reply
pub const KEYS_SEPARATOR: &str = ", ";
