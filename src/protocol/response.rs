//! Response definitions
//!
//! Decoded records and the status line that terminates every response.

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use serde::Deserialize;

use crate::error::{ProtocolError, ERR_OK};
use super::escape::{escape, unescape};

/// One decoded entity: ordered `key[=value]` fields.
///
/// Keys are stored unescaped, values exactly as received (still escaped).
/// A value of `None` is a flag field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field; `value` must already be escaped
    pub fn push(&mut self, key: impl Into<String>, value: Option<String>) {
        self.fields.push((key.into(), value));
    }

    /// Unescaped value of `key`. Flag fields yield an empty string.
    pub fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        self.raw(key).map(unescape)
    }

    /// Value of `key` as received on the wire
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Fields in wire order as (key, escaped value)
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&escape(key))?;
            if let Some(value) = value {
                write!(f, "={}", value)?;
            }
        }
        Ok(())
    }
}

/// All data records of one response, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.records
    }
}

impl Deref for RecordSet {
    type Target = [Record];

    fn deref(&self) -> &[Record] {
        &self.records
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl Extend<Record> for RecordSet {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

/// `error id=<n> msg=<text>` terminating a response.
///
/// `id` is required; a terminator without it is malformed, not a success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusLine {
    pub id: u32,

    #[serde(rename = "msg", default)]
    pub message: String,

    #[serde(rename = "extra_msg")]
    pub extra_message: Option<String>,

    #[serde(rename = "failed_permid")]
    pub failed_permission: Option<u32>,
}

impl StatusLine {
    pub fn is_ok(&self) -> bool {
        self.id == ERR_OK
    }

    /// `Ok(())` on success, the protocol error otherwise
    pub fn into_result(self) -> std::result::Result<(), ProtocolError> {
        if self.is_ok() {
            return Ok(());
        }
        Err(ProtocolError {
            id: self.id,
            message: self.message,
            extra_message: self.extra_message,
            failed_permission: self.failed_permission,
        })
    }
}
