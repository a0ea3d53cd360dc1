//! Response definitions
//!
//! Every reply is one text line. Failures carry an `(error) ` prefix so a
//! client can tell them apart from values.

use crate::error::Result;

/// Prefix marking an error reply
pub const ERROR_PREFIX: &str = "(error) ";

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Result string of a successful command
    Value(String),

    /// Error message
    Error(String),
}

impl Response {
    pub fn value(text: impl Into<String>) -> Self {
        Response::Value(text.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    /// Reply line without the trailing newline
    pub fn to_line(&self) -> String {
        match self {
            Response::Value(text) => text.clone(),
            Response::Error(message) => format!("{}{}", ERROR_PREFIX, message),
        }
    }

    /// Parse a reply line (client side)
    pub fn from_line(line: &str) -> Self {
        match line.strip_prefix(ERROR_PREFIX) {
            Some(message) => Response::Error(message.to_string()),
            None => Response::Value(line.to_string()),
        }
    }
}

impl From<Result<String>> for Response {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => Response::Value(text),
            Err(e) => Response::Error(e.to_string()),
        }
    }
}
