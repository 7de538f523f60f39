//! Decoded element values.
//!
//! [`Value`] is a plain projection of one protobuf value: scalars map onto
//! Rust primitives, strings and bytes keep their payloads, and embedded
//! messages become a [`MessageValue`] of named fields.

use bytes::Bytes;
use serde::Serialize;

/// A single decoded value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Bytes),
    /// An enum number with its symbolic name when the schema declares one.
    Enum {
        number: i32,
        name: Option<String>,
    },
    Message(MessageValue),
    /// Values of a repeated field inside an embedded message.
    List(Vec<Value>),
}

impl Value {
    /// Borrow the embedded message, if this is one.
    #[must_use]
    pub fn as_message(&self) -> Option<&MessageValue> {
        match self {
            Self::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Borrow the string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Widen any integer variant to `i128`.
    #[must_use]
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::I32(v) => Some(v.into()),
            Self::I64(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::U64(v) => Some(v.into()),
            Self::Enum { number, .. } => Some(number.into()),
            _ => None,
        }
    }
}

/// Structured projection of an embedded message.
///
/// Fields appear in the order they were first seen on the wire. Repeated
/// fields are gathered into a single [`Value::List`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageValue {
    fields: Vec<(String, Value)>,
}

impl MessageValue {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append or replace a singular field. Protobuf keeps the last value
    /// seen for a singular field.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_owned(), value)),
        }
    }

    /// Append `value` to the list stored under `name`.
    pub fn push(&mut self, name: &str, value: Value) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, Value::List(items))) => items.push(value),
            Some((_, slot)) => *slot = Value::List(vec![value]),
            None => self.fields.push((name.to_owned(), Value::List(vec![value]))),
        }
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize { self.fields.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    /// Iterate over `(name, value)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for MessageValue {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

impl Serialize for MessageValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(n, v)| (n, v)))
    }
}
