//! Mapping Module
//!
//! Projects decoded records onto typed result structs.
//!
//! Result shapes are declared, not hand-parsed: a struct lists its fields
//! with their wire names and types, and one generic routine fills it in.
//!
//! ```
//! use serde::Deserialize;
//! use ts3query::mapping::from_record;
//! use ts3query::protocol::decode_line;
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct Channel {
//!     #[serde(rename = "cid")]
//!     id: i64,
//!     #[serde(rename = "channel_name")]
//!     name: String,
//!     #[serde(rename = "channel_topic")]
//!     topic: Option<String>,
//! }
//!
//! let records = decode_line("cid=4 channel_name=Lobby\\sA");
//! let channel: Channel = from_record(&records[0]).unwrap();
//! assert_eq!(channel.id, 4);
//! assert_eq!(channel.name, "Lobby A");
//! assert_eq!(channel.topic, None);
//! ```
//!
//! ## Rules
//! - absent key: zero value, or `None` for `Option` fields
//! - present key, unparsable text: [`DecodeError`]
//! - unknown keys: ignored
//!
//! Structs should carry `#[serde(default)]` since the server leaves out
//! fields depending on the flags a command was sent with.

mod de;
mod types;

use serde::Deserialize;

use crate::error::DecodeError;
use crate::protocol::{Record, RecordSet};

pub use types::{Escaped, Timestamp};

/// Map one record onto `T`
pub fn from_record<'de, T: Deserialize<'de>>(record: &'de Record) -> Result<T, DecodeError> {
    T::deserialize(de::RecordDeserializer::new(record))
}

/// Map every record of a response onto `T`
pub fn from_records<'de, T: Deserialize<'de>>(
    records: &'de RecordSet,
) -> Result<Vec<T>, DecodeError> {
    records.iter().map(|record| from_record(record)).collect()
}
