//! Error types for ts3query
//!
//! Provides a unified error type for all operations.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using QueryError
pub type Result<T> = std::result::Result<T, QueryError>;

/// Status id the server reports on success
pub const ERR_OK: u32 = 0;

/// Status id the server reports for an unknown command
pub const ERR_COMMAND_NOT_FOUND: u32 = 256;

/// Unified error type for ts3query operations
#[derive(Debug, Error)]
pub enum QueryError {
    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(io::Error),

    #[error("Connection closed")]
    Closed,

    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    // -------------------------------------------------------------------------
    // Connect Errors
    // -------------------------------------------------------------------------
    #[error("Handshake failed: expected header {expected:?}, received {received:?}")]
    Handshake { expected: String, received: String },

    #[error("SSH transport error: {0}")]
    Ssh(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Query error: {0}")]
    Query(#[from] ProtocolError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueryError {
    /// Status id of a protocol error, if this is one
    pub fn query_id(&self) -> Option<u32> {
        match self {
            QueryError::Query(err) => Some(err.id),
            _ => None,
        }
    }
}

impl From<io::Error> for QueryError {
    fn from(err: io::Error) -> Self {
        match err.get_ref().and_then(|inner| inner.downcast_ref::<ChannelError>()) {
            Some(channel) => QueryError::Ssh(channel.0.clone()),
            None => QueryError::Io(err),
        }
    }
}

/// Failure reported by the server in a nonzero status line.
///
/// Never tears the connection down; the caller decides what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (id {id})")]
pub struct ProtocolError {
    pub id: u32,
    pub message: String,
    /// `extra_msg` sent alongside some errors
    pub extra_message: Option<String>,
    /// `failed_permid` sent with permission errors
    pub failed_permission: Option<u32>,
}

impl ProtocolError {
    pub fn new(id: u32, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
            extra_message: None,
            failed_permission: None,
        }
    }

    pub fn is_command_not_found(&self) -> bool {
        self.id == ERR_COMMAND_NOT_FOUND
    }
}

/// A field present on the wire could not be mapped onto its declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// Wire key of the offending field, when known
    pub key: Option<String>,
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            key: None,
            message: message.into(),
        }
    }

    pub(crate) fn invalid(key: &str, text: &str, expected: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            message: format!("invalid value {:?}, expected {}", text, expected),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "field {}: {}", key, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DecodeError {}

impl serde::de::Error for DecodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DecodeError::new(msg.to_string())
    }
}

/// Marker carried inside `io::Error` by the SSH channel so it surfaces as
/// [`QueryError::Ssh`] instead of a plain network error.
#[derive(Debug)]
pub(crate) struct ChannelError(pub String);

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ChannelError {}
