//! Schema model consumed by the field resolver and the value codec.
//!
//! The decoder never parses `.proto` text itself. Callers describe message
//! and enum types with the plain data types below (or deserialize them from
//! any serde format) and hand them to [`load`], which validates the set and
//! produces a [`Schema`]. Anything that can answer type lookups may stand in
//! for [`Schema`] by implementing [`SchemaProvider`].

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};

mod load;

pub use load::{SchemaDescriptor, load, load_descriptor};

/// Scalar field types understood by the wire-value reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    /// The `.proto` spelling of this type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Fixed32 => "fixed32",
            Self::Fixed64 => "fixed64",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }

    /// Parse a `.proto` scalar type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "double" => Self::Double,
            "float" => Self::Float,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "sint32" => Self::Sint32,
            "sint64" => Self::Sint64,
            "fixed32" => Self::Fixed32,
            "fixed64" => Self::Fixed64,
            "sfixed32" => Self::Sfixed32,
            "sfixed64" => Self::Sfixed64,
            "bool" => Self::Bool,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            _ => return None,
        };
        Some(ty)
    }
}

/// Declared type of a message field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// One of the built-in scalar types.
    Scalar(ScalarType),
    /// A reference to an enum or message type by fully qualified name.
    Named(String),
}

impl From<ScalarType> for FieldType {
    fn from(value: ScalarType) -> Self { Self::Scalar(value) }
}

/// Whether a field holds one value or a sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    Singular,
    Repeated,
}

/// A single field of a message type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub number: u32,
    pub field_type: FieldType,
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Explicit `[packed = ...]` option. `None` means the proto3 default.
    #[serde(default)]
    pub packed: Option<bool>,
}

impl FieldDef {
    /// Create a singular field.
    #[must_use]
    pub fn new(name: impl Into<String>, number: u32, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            number,
            field_type: field_type.into(),
            cardinality: Cardinality::Singular,
            packed: None,
        }
    }

    /// Mark the field as repeated.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Set the explicit `packed` option.
    #[must_use]
    pub fn with_packed(mut self, packed: bool) -> Self {
        self.packed = Some(packed);
        self
    }

    #[must_use]
    pub fn is_repeated(&self) -> bool { self.cardinality == Cardinality::Repeated }
}

/// A message type and its fields in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageType {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl MessageType {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by its wire number.
    #[must_use]
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.number == number)
    }
}

/// One symbolic value of an enum type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDef {
    pub name: String,
    pub number: i32,
}

/// An enum type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValueDef>,
}

impl EnumType {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Append a symbolic value.
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValueDef {
            name: name.into(),
            number,
        });
        self
    }

    /// Symbolic name for `number`, if declared. The first declaration wins
    /// when aliases share a number.
    #[must_use]
    pub fn name_of(&self, number: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|value| value.number == number)
            .map(|value| value.name.as_str())
    }
}

/// Type lookup used by the field resolver and the embedded-message codec.
///
/// Names are fully qualified; a leading `.` (as emitted by `protoc`) is
/// accepted and ignored by [`Schema`].
pub trait SchemaProvider: Send + Sync {
    /// Find a message type by name.
    fn message(&self, name: &str) -> Option<&MessageType>;

    /// Find an enum type by name.
    fn enumeration(&self, name: &str) -> Option<&EnumType>;
}

impl<P: SchemaProvider + ?Sized> SchemaProvider for Arc<P> {
    fn message(&self, name: &str) -> Option<&MessageType> { (**self).message(name) }

    fn enumeration(&self, name: &str) -> Option<&EnumType> { (**self).enumeration(name) }
}

/// Validated, immutable set of message and enum types.
///
/// Build one with [`load`] or [`load_descriptor`].
#[derive(Clone, Debug, Default)]
pub struct Schema {
    messages: HashMap<String, MessageType>,
    enums: HashMap<String, EnumType>,
}

impl Schema {
    /// Iterate over the message types in unspecified order.
    pub fn messages(&self) -> impl Iterator<Item = &MessageType> { self.messages.values() }

    /// Iterate over the enum types in unspecified order.
    pub fn enums(&self) -> impl Iterator<Item = &EnumType> { self.enums.values() }
}

impl SchemaProvider for Schema {
    fn message(&self, name: &str) -> Option<&MessageType> {
        self.messages.get(normalise_type_name(name))
    }

    fn enumeration(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(normalise_type_name(name))
    }
}

pub(crate) fn normalise_type_name(name: &str) -> &str { name.strip_prefix('.').unwrap_or(name) }
