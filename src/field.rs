//! Field metadata resolution.
//!
//! [`FieldDescriptor::resolve`] checks that a message type has exactly one
//! field, that the field is repeated, and derives everything the frame
//! decoder needs to split the stream: the wire type, whether the schema
//! expects a packed encoding, and the [`ValueKind`] the value codec decodes
//! each element as.

use crate::{
    error::SchemaValidationError,
    schema::{FieldType, ScalarType, SchemaProvider},
};

/// Protocol Buffers wire types supported by the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireType {
    /// Wire type 0: base-128 varint.
    Varint,
    /// Wire type 1: eight little-endian bytes.
    Fixed64,
    /// Wire type 2: varint length followed by that many bytes.
    LengthDelimited,
    /// Wire type 5: four little-endian bytes.
    Fixed32,
}

impl WireType {
    /// The three-bit wire type value carried in a tag.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::LengthDelimited => 2,
            Self::Fixed32 => 5,
        }
    }

    /// Interpret the low three bits of a tag. Groups (3, 4) are not supported.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    /// Fixed payload width, if this wire type has one.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Fixed32 => Some(4),
            Self::Fixed64 => Some(8),
            Self::Varint | Self::LengthDelimited => None,
        }
    }

    /// Whether values of this wire type may be packed.
    #[must_use]
    pub const fn is_packable(self) -> bool { !matches!(self, Self::LengthDelimited) }
}

/// Resolved decode strategy for one element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// A built-in scalar.
    Scalar(ScalarType),
    /// An enum, carried as an `int32` varint.
    Enum {
        /// Fully qualified enum type name.
        type_name: String,
    },
    /// An embedded message, decoded to a structured projection.
    Message {
        /// Fully qualified message type name.
        type_name: String,
    },
    /// A named type the provider could not resolve. Framed as
    /// length-delimited and surfaced as raw bytes.
    Opaque {
        /// The unresolved type name.
        type_name: String,
    },
}

impl ValueKind {
    /// Map a declared field type to its decode strategy.
    ///
    /// Named types resolve to an enum first, then a message; a name that
    /// resolves to neither becomes [`ValueKind::Opaque`].
    pub fn resolve<P: SchemaProvider + ?Sized>(field_type: &FieldType, provider: &P) -> Self {
        match field_type {
            FieldType::Scalar(scalar) => Self::Scalar(*scalar),
            FieldType::Named(name) if provider.enumeration(name).is_some() => Self::Enum {
                type_name: name.clone(),
            },
            FieldType::Named(name) if provider.message(name).is_some() => Self::Message {
                type_name: name.clone(),
            },
            FieldType::Named(name) => Self::Opaque {
                type_name: name.clone(),
            },
        }
    }

    /// Wire type used to encode values of this kind.
    #[must_use]
    pub const fn wire_type(&self) -> WireType {
        match self {
            Self::Scalar(
                ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::Uint32
                | ScalarType::Uint64
                | ScalarType::Sint32
                | ScalarType::Sint64
                | ScalarType::Bool,
            )
            | Self::Enum { .. } => WireType::Varint,
            Self::Scalar(ScalarType::Fixed64 | ScalarType::Sfixed64 | ScalarType::Double) => {
                WireType::Fixed64
            }
            Self::Scalar(ScalarType::Fixed32 | ScalarType::Sfixed32 | ScalarType::Float) => {
                WireType::Fixed32
            }
            Self::Scalar(ScalarType::String | ScalarType::Bytes)
            | Self::Message { .. }
            | Self::Opaque { .. } => WireType::LengthDelimited,
        }
    }
}

/// Everything the frame decoder needs to know about the streamed field.
///
/// Resolved once at construction and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    message: String,
    name: String,
    number: u32,
    kind: ValueKind,
    packed: bool,
}

impl FieldDescriptor {
    /// Resolve the single repeated field of `message_type`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaValidationError`] if the type is missing, declares
    /// no fields or more than one, or its sole field is not repeated.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbstream::{
    ///     field::{FieldDescriptor, WireType},
    ///     schema::{self, FieldDef, MessageType, ScalarType},
    /// };
    ///
    /// let schema = schema::load(
    ///     [MessageType::new("demo.Samples")
    ///         .with_field(FieldDef::new("samples", 1, ScalarType::Double).repeated())],
    ///     [],
    /// )
    /// .expect("valid schema");
    /// let field = FieldDescriptor::resolve(&schema, "demo.Samples").expect("streamable");
    /// assert_eq!(field.wire_type(), WireType::Fixed64);
    /// assert!(field.is_packed());
    /// ```
    pub fn resolve<P: SchemaProvider + ?Sized>(
        provider: &P,
        message_type: &str,
    ) -> Result<Self, SchemaValidationError> {
        let message =
            provider
                .message(message_type)
                .ok_or_else(|| SchemaValidationError::MessageNotFound {
                    name: message_type.to_owned(),
                })?;

        let field = match message.fields.as_slice() {
            [] => {
                return Err(SchemaValidationError::NoFields {
                    message: message.name.clone(),
                });
            }
            [field] => field,
            fields => {
                return Err(SchemaValidationError::MultipleFields {
                    message: message.name.clone(),
                    count: fields.len(),
                });
            }
        };

        if !field.is_repeated() {
            return Err(SchemaValidationError::NotRepeated {
                message: message.name.clone(),
                field: field.name.clone(),
            });
        }

        let kind = ValueKind::resolve(&field.field_type, provider);
        let packed = kind.wire_type().is_packable() && field.packed.unwrap_or(true);

        let descriptor = Self {
            message: message.name.clone(),
            name: field.name.clone(),
            number: field.number,
            kind,
            packed,
        };
        tracing::debug!(
            message = %descriptor.message,
            field = %descriptor.name,
            wire_type = ?descriptor.wire_type(),
            packed = descriptor.packed,
            "resolved repeated field"
        );
        Ok(descriptor)
    }

    /// Name of the message type that owns the field.
    #[must_use]
    pub fn message(&self) -> &str { &self.message }

    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Declared field number.
    #[must_use]
    pub fn number(&self) -> u32 { self.number }

    #[must_use]
    pub fn kind(&self) -> &ValueKind { &self.kind }

    /// Wire type of a single element.
    #[must_use]
    pub fn wire_type(&self) -> WireType { self.kind.wire_type() }

    /// Whether the schema expects a packed encoding. Only ever true for
    /// varint and fixed-width elements.
    #[must_use]
    pub fn is_packed(&self) -> bool { self.packed }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::schema::{self, EnumType, FieldDef, MessageType, Schema};

    fn single_field_schema(field: FieldDef) -> Schema {
        schema::load(
            [
                MessageType::new("t.Stream").with_field(field),
                MessageType::new("t.Point")
                    .with_field(FieldDef::new("x", 1, ScalarType::Int32))
                    .with_field(FieldDef::new("y", 2, ScalarType::Int32)),
            ],
            [EnumType::new("t.Colour").with_value("RED", 0)],
        )
        .expect("valid schema")
    }

    #[rstest]
    #[case(ScalarType::Int32, WireType::Varint)]
    #[case(ScalarType::Int64, WireType::Varint)]
    #[case(ScalarType::Uint32, WireType::Varint)]
    #[case(ScalarType::Uint64, WireType::Varint)]
    #[case(ScalarType::Sint32, WireType::Varint)]
    #[case(ScalarType::Sint64, WireType::Varint)]
    #[case(ScalarType::Bool, WireType::Varint)]
    #[case(ScalarType::Fixed64, WireType::Fixed64)]
    #[case(ScalarType::Sfixed64, WireType::Fixed64)]
    #[case(ScalarType::Double, WireType::Fixed64)]
    #[case(ScalarType::Fixed32, WireType::Fixed32)]
    #[case(ScalarType::Sfixed32, WireType::Fixed32)]
    #[case(ScalarType::Float, WireType::Fixed32)]
    #[case(ScalarType::String, WireType::LengthDelimited)]
    #[case(ScalarType::Bytes, WireType::LengthDelimited)]
    fn scalar_wire_types(#[case] scalar: ScalarType, #[case] expected: WireType) {
        let schema = single_field_schema(FieldDef::new("v", 1, scalar).repeated());
        let field = FieldDescriptor::resolve(&schema, "t.Stream").expect("resolve");
        assert_eq!(field.wire_type(), expected);
        assert_eq!(field.is_packed(), expected != WireType::LengthDelimited);
    }

    #[test]
    fn enum_resolves_to_varint() {
        let schema =
            single_field_schema(FieldDef::new("c", 1, FieldType::Named("t.Colour".into())).repeated());
        let field = FieldDescriptor::resolve(&schema, "t.Stream").expect("resolve");
        assert_eq!(field.wire_type(), WireType::Varint);
        assert!(field.is_packed());
        assert_eq!(
            field.kind(),
            &ValueKind::Enum {
                type_name: "t.Colour".into()
            }
        );
    }

    #[test]
    fn message_resolves_to_length_delimited_and_never_packs() {
        let schema = single_field_schema(
            FieldDef::new("p", 1, FieldType::Named(".t.Point".into()))
                .repeated()
                .with_packed(true),
        );
        let field = FieldDescriptor::resolve(&schema, "t.Stream").expect("resolve");
        assert_eq!(field.wire_type(), WireType::LengthDelimited);
        assert!(!field.is_packed());
    }

    #[test]
    fn explicit_packed_false_disables_packing() {
        let schema =
            single_field_schema(FieldDef::new("v", 3, ScalarType::Int32).repeated().with_packed(false));
        let field = FieldDescriptor::resolve(&schema, "t.Stream").expect("resolve");
        assert!(!field.is_packed());
        assert_eq!(field.number(), 3);
        assert_eq!(field.name(), "v");
        assert_eq!(field.message(), "t.Stream");
    }

    #[test]
    fn missing_type_is_rejected() {
        let schema = single_field_schema(FieldDef::new("v", 1, ScalarType::Int32).repeated());
        let err = FieldDescriptor::resolve(&schema, "t.Nope").expect_err("missing type");
        assert!(matches!(err, SchemaValidationError::MessageNotFound { .. }));
    }

    #[test]
    fn multiple_fields_are_rejected() {
        let schema = single_field_schema(FieldDef::new("v", 1, ScalarType::Int32).repeated());
        let err = FieldDescriptor::resolve(&schema, "t.Point").expect_err("two fields");
        assert_eq!(
            err,
            SchemaValidationError::MultipleFields {
                message: "t.Point".into(),
                count: 2
            }
        );
    }

    #[test]
    fn empty_message_is_rejected() {
        let schema = schema::load([MessageType::new("t.Empty")], []).expect("valid schema");
        let err = FieldDescriptor::resolve(&schema, "t.Empty").expect_err("no fields");
        assert!(matches!(err, SchemaValidationError::NoFields { .. }));
    }

    #[test]
    fn singular_field_is_rejected() {
        let schema = single_field_schema(FieldDef::new("v", 1, ScalarType::Int32));
        let err = FieldDescriptor::resolve(&schema, "t.Stream").expect_err("not repeated");
        assert!(matches!(err, SchemaValidationError::NotRepeated { .. }));
    }

    #[test]
    fn unresolved_name_is_opaque_length_delimited() {
        struct Empty;
        impl SchemaProvider for Empty {
            fn message(&self, _name: &str) -> Option<&MessageType> { None }
            fn enumeration(&self, _name: &str) -> Option<&EnumType> { None }
        }
        let kind = ValueKind::resolve(&FieldType::Named("x.Any".into()), &Empty);
        assert_eq!(kind.wire_type(), WireType::LengthDelimited);
        assert!(matches!(kind, ValueKind::Opaque { .. }));
    }

    #[rstest]
    #[case(0, Some(WireType::Varint))]
    #[case(1, Some(WireType::Fixed64))]
    #[case(2, Some(WireType::LengthDelimited))]
    #[case(3, None)]
    #[case(4, None)]
    #[case(5, Some(WireType::Fixed32))]
    fn wire_type_bits(#[case] bits: u8, #[case] expected: Option<WireType>) {
        assert_eq!(WireType::from_bits(bits), expected);
        if let Some(wire_type) = expected {
            assert_eq!(wire_type.bits(), bits);
        }
    }
}
