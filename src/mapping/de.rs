//! serde `Deserializer` over a [`Record`].
//!
//! A record deserializes as a map of wire key to field value. Each value
//! parses itself according to what the destination asks for:
//!
//! | destination            | wire text                           |
//! |------------------------|-------------------------------------|
//! | integers / floats      | decimal text, empty = 0             |
//! | `bool`                 | `0` / `1`, empty = false            |
//! | `String`               | unescaped text                      |
//! | `Option<T>`            | `Some` whenever the key is present  |
//! | `Vec<T>`               | comma separated elements            |
//! | [`Escaped`]            | raw text, not unescaped             |
//! | unit enum              | variant name                        |
//!
//! Keys without a destination field are skipped.
//!
//! [`Escaped`]: super::Escaped

use serde::de::value::{BorrowedStrDeserializer, StringDeserializer};
use serde::de::{self, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use serde::forward_to_deserialize_any;

use crate::error::DecodeError;
use crate::protocol::{unescape, Record};
use super::types::ESCAPED_TOKEN;

/// Deserializes a whole record as a struct or map
pub(crate) struct RecordDeserializer<'de> {
    record: &'de Record,
}

impl<'de> RecordDeserializer<'de> {
    pub(crate) fn new(record: &'de Record) -> Self {
        Self { record }
    }
}

impl<'de> de::Deserializer<'de> for RecordDeserializer<'de> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_map(FieldAccess {
            fields: Box::new(self.record.iter()),
            pending: None,
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct FieldAccess<'de> {
    fields: Box<dyn Iterator<Item = (&'de str, Option<&'de str>)> + 'de>,
    pending: Option<(&'de str, &'de str)>,
}

impl<'de> MapAccess<'de> for FieldAccess<'de> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        match self.fields.next() {
            Some((key, value)) => {
                self.pending = Some((key, value.unwrap_or("")));
                seed.deserialize(BorrowedStrDeserializer::<DecodeError>::new(key))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, DecodeError> {
        let (key, raw) = self
            .pending
            .take()
            .ok_or_else(|| DecodeError::new("value requested before key"))?;
        seed.deserialize(ValueDeserializer { key, raw }).map_err(|mut e| {
            e.key.get_or_insert_with(|| key.to_string());
            e
        })
    }
}

/// One field value, still escaped
struct ValueDeserializer<'de> {
    key: &'de str,
    raw: &'de str,
}

impl<'de> ValueDeserializer<'de> {
    fn invalid(&self, expected: &str) -> DecodeError {
        DecodeError::invalid(self.key, &unescape(self.raw), expected)
    }
}

macro_rules! deserialize_number {
    ($($method:ident => $visit:ident : $t:ty),* $(,)?) => {
        $(fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
            if self.raw.is_empty() {
                return visitor.$visit(<$t>::default());
            }
            match self.raw.parse::<$t>() {
                Ok(n) => visitor.$visit(n),
                Err(_) => Err(self.invalid(stringify!($t))),
            }
        })*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'de> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match unescape(self.raw) {
            std::borrow::Cow::Borrowed(text) => visitor.visit_borrowed_str(text),
            std::borrow::Cow::Owned(text) => visitor.visit_string(text),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.raw {
            "" | "0" => visitor.visit_bool(false),
            "1" => visitor.visit_bool(true),
            _ => Err(self.invalid("0 or 1")),
        }
    }

    deserialize_number! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        // Absent keys never reach here; serde fills those with None.
        visitor.visit_some(self)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        if name == ESCAPED_TOKEN {
            return visitor
                .visit_newtype_struct(BorrowedStrDeserializer::<DecodeError>::new(self.raw));
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        let items: Vec<&'de str> = if self.raw.is_empty() {
            Vec::new()
        } else {
            self.raw.split(',').collect()
        };
        visitor.visit_seq(ListAccess {
            key: self.key,
            items: items.into_iter(),
        })
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let variant: StringDeserializer<DecodeError> =
            unescape(self.raw).into_owned().into_deserializer();
        visitor.visit_enum(variant)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        char str string bytes byte_buf unit_struct tuple tuple_struct map struct identifier
    }
}

/// Elements of a comma joined list field
struct ListAccess<'de> {
    key: &'de str,
    items: std::vec::IntoIter<&'de str>,
}

impl<'de> SeqAccess<'de> for ListAccess<'de> {
    type Error = DecodeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, DecodeError> {
        match self.items.next() {
            Some(raw) => seed
                .deserialize(ValueDeserializer { key: self.key, raw })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}
