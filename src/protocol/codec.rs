//! Protocol codec
//!
//! Encoding of command lines and decoding of response lines.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! name [arg]* [key[=value]]*\n
//! ```
//!
//! ### Response
//! ```text
//! key=value key=value|key=value flag\n\r      (zero or more data lines)
//! error id=0 msg=ok\n\r                       (exactly one status line)
//! ```
//!
//! Records are separated by `|`, fields by ` `, keys from values by the
//! first `=`. Separators only count when they are not part of an escape
//! pair, so scanning steps over `\x` pairs as a unit.

use crate::error::DecodeError;
use crate::mapping::from_record;
use super::escape::unescape;
use super::{Command, Record, RecordSet, StatusLine};

/// First token of the status line
pub const STATUS_PREFIX: &str = "error";

const RECORD_SEPARATOR: u8 = b'|';
const FIELD_SEPARATOR: u8 = b' ';
const KEY_VALUE_SEPARATOR: u8 = b'=';

// =============================================================================
// Encoding
// =============================================================================

/// Encode a command as a terminated wire line
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut line = command.encode().into_bytes();
    line.push(b'\n');
    line
}

// =============================================================================
// Decoding
// =============================================================================

/// Split `s` on every `sep` that is not the second half of an escape pair
fn split_unescaped(s: &str, sep: u8) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == sep {
            parts.push(&s[start..i]);
            start = i + 1;
        }
        i += 1;
    }

    parts.push(&s[start.min(s.len())..]);
    parts
}

/// Split `s` at the first unescaped `sep`
fn split_once_unescaped(s: &str, sep: u8) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == sep {
            return Some((&s[..i], &s[i + 1..]));
        }
        i += 1;
    }
    None
}

/// Decode one record segment (no `|` inside)
pub fn decode_record(segment: &str) -> Record {
    let mut record = Record::new();

    for field in split_unescaped(segment, FIELD_SEPARATOR) {
        if field.is_empty() {
            continue;
        }
        match split_once_unescaped(field, KEY_VALUE_SEPARATOR) {
            Some((key, value)) => record.push(unescape(key), Some(value.to_string())),
            None => record.push(unescape(field), None),
        }
    }

    record
}

/// Decode a data line into its records.
///
/// Never fails: malformed fields just end up as odd keys. An empty line
/// yields a single empty record.
pub fn decode_line(line: &str) -> RecordSet {
    split_unescaped(line, RECORD_SEPARATOR)
        .into_iter()
        .map(decode_record)
        .collect::<Vec<_>>()
        .into()
}

/// Whether `line` is the response terminator
pub fn is_status_line(line: &str) -> bool {
    match line.strip_prefix(STATUS_PREFIX) {
        Some(rest) => rest.is_empty() || rest.starts_with(' '),
        None => false,
    }
}

/// Parse the status line, or `None` if `line` is a data line
pub fn decode_status(line: &str) -> Result<Option<StatusLine>, DecodeError> {
    if !is_status_line(line) {
        return Ok(None);
    }
    let record = decode_record(line);
    from_record::<StatusLine>(&record).map(Some)
}
