//! Wire types with no direct Rust primitive

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::{Deserializer, Error as _, Visitor};
use serde::Deserialize;

use crate::protocol::unescape;

/// Newtype name the record deserializer recognizes to hand out raw text
pub(crate) const ESCAPED_TOKEN: &str = "$ts3query::private::Escaped";

/// Seconds since the Unix epoch, as an absolute time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(SystemTime);

impl Timestamp {
    /// `None` when the time can't be represented on this platform.
    ///
    /// `i64::MIN` is always rejected so [`unix_seconds`](Self::unix_seconds)
    /// can negate the offset.
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        if secs == i64::MIN {
            return None;
        }
        let offset = Duration::from_secs(secs.unsigned_abs());
        let time = if secs >= 0 {
            UNIX_EPOCH.checked_add(offset)
        } else {
            UNIX_EPOCH.checked_sub(offset)
        };
        time.map(Self)
    }

    pub fn unix_seconds(&self) -> i64 {
        match self.0.duration_since(UNIX_EPOCH) {
            Ok(after) => after.as_secs() as i64,
            Err(before) => -(before.duration().as_secs() as i64),
        }
    }

    pub fn as_system_time(&self) -> SystemTime {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self(UNIX_EPOCH)
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        Timestamp::from_unix_seconds(secs)
            .ok_or_else(|| D::Error::custom(format!("timestamp {} out of range", secs)))
    }
}

/// Field text kept exactly as sent, escapes included.
///
/// For opaque payloads that are handed back to the server verbatim, such as
/// snapshot data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Escaped(pub String);

impl Escaped {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decoded text
    pub fn unescape(&self) -> String {
        unescape(&self.0).into_owned()
    }
}

impl fmt::Display for Escaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Escaped {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EscapedVisitor;

        impl<'de> Visitor<'de> for EscapedVisitor {
            type Value = Escaped;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("escaped text")
            }

            fn visit_newtype_struct<D: Deserializer<'de>>(
                self,
                deserializer: D,
            ) -> Result<Escaped, D::Error> {
                String::deserialize(deserializer).map(Escaped)
            }

            fn visit_str<E: serde::de::Error>(self, text: &str) -> Result<Escaped, E> {
                Ok(Escaped(text.to_string()))
            }
        }

        deserializer.deserialize_newtype_struct(ESCAPED_TOKEN, EscapedVisitor)
    }
}
