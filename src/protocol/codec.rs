//! Protocol codec
//!
//! Newline-delimited framing for requests and responses.
//!
//! ```text
//! request:  <KEYWORD> [arg ...]\n
//! response: <result>\n | (error) <message>\n
//! ```

use std::io::{BufRead, Read, Write};

use crate::error::{Result, VaultError};
use super::Response;

/// Read one line, without its terminator.
///
/// Returns `None` at end of stream. Lines whose content (terminator
/// excluded, `\n` or `\r\n`) exceeds `max_len` bytes are a protocol error;
/// a final line without a newline is still returned.
pub fn read_line<R: BufRead>(reader: &mut R, max_len: usize) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let limit = (max_len as u64).saturating_add(2);
    let n = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;

    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    if buf.len() > max_len {
        return Err(VaultError::Protocol(format!(
            "message too large (max {} bytes)",
            max_len
        )));
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| VaultError::Protocol("request is not valid UTF-8".to_string()))
}

/// Read a request line from a stream
pub fn read_request<R: BufRead>(reader: &mut R, max_len: usize) -> Result<Option<String>> {
    read_line(reader, max_len)
}

/// Write a request line to a stream
pub fn write_request<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a response line from a stream
pub fn read_response<R: BufRead>(reader: &mut R, max_len: usize) -> Result<Option<Response>> {
    Ok(read_line(reader, max_len)?.map(|line| Response::from_line(&line)))
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(response.to_line().as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
