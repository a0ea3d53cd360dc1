//! Tokenizer for the line protocol
//!
//! A request is one line of whitespace-separated words. Words matching a
//! command keyword (any case) become keyword tokens; everything else is a
//! plain value.

use super::CommandKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Command(CommandKind),
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Value, value)
    }
}

/// Split a request line into tokens
pub fn tokenize(line: &str) -> Vec<Token> {
    line.split_whitespace()
        .map(|word| match CommandKind::from_keyword(word) {
            Some(kind) => Token::new(TokenKind::Command(kind), word),
            None => Token::value(word),
        })
        .collect()
}
