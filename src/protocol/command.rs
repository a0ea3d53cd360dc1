//! Command definitions
//!
//! The closed set of client commands, their fixed arities, and the
//! validation that turns raw tokens into a typed [`Command`].

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VaultError};
use super::token::{Token, TokenKind};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Get,
    Set,
    Del,
    Exists,
    Keys,
}

impl CommandKind {
    pub const ALL: [CommandKind; 5] = [
        CommandKind::Get,
        CommandKind::Set,
        CommandKind::Del,
        CommandKind::Exists,
        CommandKind::Keys,
    ];

    /// Keyword as written on the wire
    pub fn keyword(self) -> &'static str {
        match self {
            CommandKind::Get => "GET",
            CommandKind::Set => "SET",
            CommandKind::Del => "DEL",
            CommandKind::Exists => "EXISTS",
            CommandKind::Keys => "KEYS",
        }
    }

    /// Number of arguments the command takes
    pub fn arity(self) -> usize {
        match self {
            CommandKind::Get | CommandKind::Del | CommandKind::Exists => 1,
            CommandKind::Set => 2,
            CommandKind::Keys => 0,
        }
    }

    /// Match a keyword, ignoring ASCII case
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for CommandKind {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_keyword(s).ok_or_else(|| VaultError::InvalidCommand(s.to_string()))
    }
}

/// A validated command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: String },

    /// Set a key-value pair
    Set { key: String, value: String },

    /// Delete a key
    Del { key: String },

    /// Check whether a key exists
    Exists { key: String },

    /// List all keys
    Keys,
}

impl Command {
    /// Get the command type
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Get { .. } => CommandKind::Get,
            Command::Set { .. } => CommandKind::Set,
            Command::Del { .. } => CommandKind::Del,
            Command::Exists { .. } => CommandKind::Exists,
            Command::Keys => CommandKind::Keys,
        }
    }

    /// Build a command from its kind and argument strings.
    ///
    /// Fails with `WrongArgumentCount` when the arity is off and with
    /// `InvalidToken` when an argument is itself a command keyword.
    pub fn from_parts(kind: CommandKind, args: &[String]) -> Result<Self> {
        if args.len() != kind.arity() {
            return Err(VaultError::WrongArgumentCount {
                command: kind.keyword().to_string(),
            });
        }
        if let Some(arg) = args.iter().find(|arg| CommandKind::from_keyword(arg).is_some()) {
            return Err(VaultError::InvalidToken(arg.clone()));
        }

        Ok(Self::bind(kind, args.to_vec()))
    }

    /// Build a command from a tokenized line.
    ///
    /// The first token must be a command keyword (`InvalidCommand`
    /// otherwise); the rest must be plain values.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self> {
        let (first, rest) = tokens.split_first().ok_or(VaultError::EmptyCommand)?;

        let kind = match first.kind {
            TokenKind::Command(kind) => kind,
            TokenKind::Value => return Err(VaultError::InvalidCommand(first.value.clone())),
        };

        if rest.len() != kind.arity() {
            return Err(VaultError::WrongArgumentCount {
                command: first.value.clone(),
            });
        }
        if let Some(tok) = rest.iter().find(|tok| tok.kind != TokenKind::Value) {
            return Err(VaultError::InvalidToken(tok.value.clone()));
        }

        Ok(Self::bind(
            kind,
            rest.iter().map(|tok| tok.value.clone()).collect(),
        ))
    }

    /// Arity has already been checked.
    fn bind(kind: CommandKind, args: Vec<String>) -> Self {
        let mut args = args.into_iter();
        let mut next = || args.next().unwrap_or_default();
        match kind {
            CommandKind::Get => Command::Get { key: next() },
            CommandKind::Set => {
                let key = next();
                let value = next();
                Command::Set { key, value }
            }
            CommandKind::Del => Command::Del { key: next() },
            CommandKind::Exists => Command::Exists { key: next() },
            CommandKind::Keys => Command::Keys,
        }
    }

    /// Render the command as a request line (without the newline)
    pub fn to_line(&self) -> String {
        match self {
            Command::Get { key } => format!("GET {}", key),
            Command::Set { key, value } => format!("SET {} {}", key, value),
            Command::Del { key } => format!("DEL {}", key),
            Command::Exists { key } => format!("EXISTS {}", key),
            Command::Keys => "KEYS".to_string(),
        }
    }
}
