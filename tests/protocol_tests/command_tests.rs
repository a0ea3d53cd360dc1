//! Protocol Tests
//!
//! Tests verify:
//! - Tokenizing request lines
//! - Command validation (keyword, arity, argument kinds)
//! - Response lines and line framing

use std::io::Cursor;

use vaultkv::protocol::{
    read_line, read_response, tokenize, write_request, write_response, Command, CommandKind,
    Response, Token, TokenKind,
};
use vaultkv::VaultError;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Tokenizer Tests
// =============================================================================

#[test]
fn test_tokenize_set() {
    let tokens = tokenize("SET name alice\n");

    assert_eq!(
        tokens,
        vec![
            Token::new(TokenKind::Command(CommandKind::Set), "SET"),
            Token::value("name"),
            Token::value("alice"),
        ]
    );
}

#[test]
fn test_tokenize_is_case_insensitive_for_keywords() {
    let tokens = tokenize("get Foo");
    assert_eq!(tokens[0].kind, TokenKind::Command(CommandKind::Get));
    assert_eq!(tokens[1].kind, TokenKind::Value);
    assert_eq!(tokens[1].value, "Foo");

    assert_eq!(tokenize("eXiStS k")[0].kind, TokenKind::Command(CommandKind::Exists));
}

#[test]
fn test_tokenize_collapses_whitespace() {
    let tokens = tokenize("  SET \t a    b  \r\n");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[2].value, "b");
}

#[test]
fn test_tokenize_empty_line() {
    assert!(tokenize("   \n").is_empty());
}

// =============================================================================
// Command Kind Tests
// =============================================================================

#[test]
fn test_arities() {
    assert_eq!(CommandKind::Get.arity(), 1);
    assert_eq!(CommandKind::Set.arity(), 2);
    assert_eq!(CommandKind::Del.arity(), 1);
    assert_eq!(CommandKind::Exists.arity(), 1);
    assert_eq!(CommandKind::Keys.arity(), 0);
}

#[test]
fn test_parse_keyword() {
    assert_eq!("del".parse::<CommandKind>().unwrap(), CommandKind::Del);
    assert_eq!("KEYS".parse::<CommandKind>().unwrap(), CommandKind::Keys);
    assert!(matches!(
        "FLUSHALL".parse::<CommandKind>(),
        Err(VaultError::InvalidCommand(ref w)) if w == "FLUSHALL"
    ));
}

// =============================================================================
// Validation From Parts
// =============================================================================

#[test]
fn test_from_parts_valid() {
    assert_eq!(
        Command::from_parts(CommandKind::Set, &args(&["a", "b"])).unwrap(),
        Command::Set {
            key: "a".to_string(),
            value: "b".to_string()
        }
    );
    assert_eq!(Command::from_parts(CommandKind::Keys, &[]).unwrap(), Command::Keys);
}

#[test]
fn test_from_parts_wrong_argument_count() {
    let cases: [(CommandKind, &[&str]); 5] = [
        (CommandKind::Get, &[]),
        (CommandKind::Get, &["a", "b"]),
        (CommandKind::Set, &["a"]),
        (CommandKind::Del, &[]),
        (CommandKind::Keys, &["a"]),
    ];
    for (kind, values) in cases {
        let result = Command::from_parts(kind, &args(values));
        assert!(
            matches!(result, Err(VaultError::WrongArgumentCount { .. })),
            "{:?} {:?}",
            kind,
            values
        );
    }
}

#[test]
fn test_from_parts_keyword_argument_is_invalid_token() {
    let result = Command::from_parts(CommandKind::Set, &args(&["key", "get"]));
    assert!(matches!(result, Err(VaultError::InvalidToken(ref t)) if t == "get"));
}

// =============================================================================
// Validation From Tokens
// =============================================================================

#[test]
fn test_from_tokens_valid() {
    let command = Command::from_tokens(&tokenize("exists user:1")).unwrap();
    assert_eq!(
        command,
        Command::Exists {
            key: "user:1".to_string()
        }
    );
    assert_eq!(command.kind(), CommandKind::Exists);
}

#[test]
fn test_from_tokens_unknown_command() {
    let result = Command::from_tokens(&tokenize("PUT a b"));
    assert!(matches!(result, Err(VaultError::InvalidCommand(ref c)) if c == "PUT"));
}

#[test]
fn test_from_tokens_empty() {
    assert!(matches!(
        Command::from_tokens(&[]),
        Err(VaultError::EmptyCommand)
    ));
}

#[test]
fn test_from_tokens_wrong_count_names_command() {
    let err = Command::from_tokens(&tokenize("get")).unwrap_err();
    assert!(matches!(err, VaultError::WrongArgumentCount { .. }));
    assert_eq!(err.to_string(), "wrong number of arguments for 'get' command");
}

#[test]
fn test_from_tokens_keyword_as_argument() {
    let result = Command::from_tokens(&tokenize("GET keys"));
    assert!(matches!(result, Err(VaultError::InvalidToken(ref t)) if t == "keys"));
}

#[test]
fn test_arity_checked_before_token_kinds() {
    let result = Command::from_tokens(&tokenize("GET set del"));
    assert!(matches!(result, Err(VaultError::WrongArgumentCount { .. })));
}

#[test]
fn test_to_line_round_trips_through_tokenizer() {
    let command = Command::Set {
        key: "a".to_string(),
        value: "b".to_string(),
    };
    assert_eq!(command.to_line(), "SET a b");
    assert_eq!(Command::from_tokens(&tokenize(&command.to_line())).unwrap(), command);
}

// =============================================================================
// Response and Framing Tests
// =============================================================================

#[test]
fn test_response_lines() {
    assert_eq!(Response::value("OK").to_line(), "OK");
    assert_eq!(Response::error("boom").to_line(), "(error) boom");
    assert_eq!(Response::from_line("(error) boom"), Response::error("boom"));
    assert_eq!(Response::from_line("(nil)"), Response::value("(nil)"));
}

#[test]
fn test_response_from_result() {
    let ok: vaultkv::Result<String> = Ok("true".to_string());
    assert_eq!(Response::from(ok), Response::value("true"));

    let err: vaultkv::Result<String> = Err(VaultError::InvalidCommand("X".to_string()));
    assert_eq!(Response::from(err), Response::error("invalid command 'X'"));
}

#[test]
fn test_read_lines() {
    let mut input = Cursor::new(b"SET a b\r\nGET a\nKEYS".to_vec());

    assert_eq!(read_line(&mut input, 64).unwrap().as_deref(), Some("SET a b"));
    assert_eq!(read_line(&mut input, 64).unwrap().as_deref(), Some("GET a"));
    assert_eq!(read_line(&mut input, 64).unwrap().as_deref(), Some("KEYS"));
    assert_eq!(read_line(&mut input, 64).unwrap(), None);
}

#[test]
fn test_read_line_too_long() {
    let mut input = Cursor::new(format!("SET k {}\n", "x".repeat(100)).into_bytes());
    assert!(matches!(
        read_line(&mut input, 16),
        Err(VaultError::Protocol(_))
    ));
}

#[test]
fn test_read_line_exactly_at_limit() {
    let mut input = Cursor::new(b"GET abcd\n".to_vec());
    assert_eq!(read_line(&mut input, 8).unwrap().as_deref(), Some("GET abcd"));
}

#[test]
fn test_read_line_limit_ignores_terminator() {
    let mut crlf = Cursor::new(b"GET abcd\r\nGET abcd\n".to_vec());
    assert_eq!(read_line(&mut crlf, 8).unwrap().as_deref(), Some("GET abcd"));
    assert_eq!(read_line(&mut crlf, 8).unwrap().as_deref(), Some("GET abcd"));

    let mut over = Cursor::new(b"GET abcde\r\n".to_vec());
    assert!(matches!(read_line(&mut over, 8), Err(VaultError::Protocol(_))));

    let mut unterminated = Cursor::new(b"GET abcde".to_vec());
    assert!(matches!(
        read_line(&mut unterminated, 8),
        Err(VaultError::Protocol(_))
    ));
}

#[test]
fn test_write_and_read_back() {
    let mut wire = Vec::new();
    write_request(&mut wire, "GET a").unwrap();
    assert_eq!(wire, b"GET a\n");

    let mut wire = Vec::new();
    write_response(&mut wire, &Response::error("nope")).unwrap();
    write_response(&mut wire, &Response::value("x")).unwrap();

    let mut reader = Cursor::new(wire);
    assert_eq!(read_response(&mut reader, 64).unwrap(), Some(Response::error("nope")));
    assert_eq!(read_response(&mut reader, 64).unwrap(), Some(Response::value("x")));
}
