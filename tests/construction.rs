//! Decoder construction rejects message types that are not a single
//! repeated field, and resolves the field once for the decoder's lifetime.

use std::sync::Arc;

use pbstream::{
    RepeatedFieldDecoder,
    SchemaValidationError,
    ValueKind,
    WireType,
    schema::{self, EnumType, FieldDef, FieldType, MessageType, ScalarType, Schema},
};
use rstest::{fixture, rstest};

#[fixture]
fn demo_schema() -> Arc<Schema> {
    let schema = schema::load(
        [
            MessageType::new("demo.Empty"),
            MessageType::new("demo.Pair")
                .with_field(FieldDef::new("a", 1, ScalarType::Int32).repeated())
                .with_field(FieldDef::new("b", 2, ScalarType::Int32).repeated()),
            MessageType::new("demo.Single").with_field(FieldDef::new("a", 1, ScalarType::Int32)),
            MessageType::new("demo.Names")
                .with_field(FieldDef::new("names", 4, ScalarType::String).repeated()),
            MessageType::new("demo.Raw").with_field(
                FieldDef::new("raw", 1, ScalarType::Sint64)
                    .repeated()
                    .with_packed(false),
            ),
            MessageType::new("demo.Kinds").with_field(
                FieldDef::new("kinds", 2, FieldType::Named(".demo.Kind".into())).repeated(),
            ),
        ],
        [EnumType::new("demo.Kind").with_value("A", 0)],
    )
    .expect("valid schema");
    Arc::new(schema)
}

#[rstest]
#[case::missing(
    "demo.Nope",
    SchemaValidationError::MessageNotFound { name: "demo.Nope".into() }
)]
#[case::no_fields(
    "demo.Empty",
    SchemaValidationError::NoFields { message: "demo.Empty".into() }
)]
#[case::two_fields(
    "demo.Pair",
    SchemaValidationError::MultipleFields { message: "demo.Pair".into(), count: 2 }
)]
#[case::singular(
    "demo.Single",
    SchemaValidationError::NotRepeated { message: "demo.Single".into(), field: "a".into() }
)]
fn unstreamable_types_are_rejected(
    #[from(demo_schema)] schema: Arc<Schema>,
    #[case] message_type: &str,
    #[case] expected: SchemaValidationError,
) {
    let err = RepeatedFieldDecoder::new(schema, message_type).expect_err("rejected");
    assert_eq!(err, expected);
}

#[rstest]
fn strings_are_never_packed(#[from(demo_schema)] schema: Arc<Schema>) {
    let decoder = RepeatedFieldDecoder::new(schema, ".demo.Names").expect("streamable");
    let field = decoder.field();
    assert_eq!(field.message(), "demo.Names");
    assert_eq!(field.name(), "names");
    assert_eq!(field.number(), 4);
    assert_eq!(field.wire_type(), WireType::LengthDelimited);
    assert!(!field.is_packed());
    assert_eq!(decoder.learned_tag(), None);
    assert!(!decoder.is_terminated());
}

#[rstest]
fn explicit_packed_option_is_honoured(#[from(demo_schema)] schema: Arc<Schema>) {
    let decoder = RepeatedFieldDecoder::new(schema, "demo.Raw").expect("streamable");
    assert_eq!(decoder.field().wire_type(), WireType::Varint);
    assert!(!decoder.field().is_packed());
}

#[rstest]
fn enum_fields_resolve_to_varints(#[from(demo_schema)] schema: Arc<Schema>) {
    let decoder = RepeatedFieldDecoder::new(schema, "demo.Kinds").expect("streamable");
    assert_eq!(
        decoder.field().kind(),
        &ValueKind::Enum {
            type_name: ".demo.Kind".into()
        }
    );
    assert_eq!(decoder.field().wire_type(), WireType::Varint);
    assert!(decoder.field().is_packed());
}
