//! Schema fixtures shared by integration tests.

use std::sync::Arc;

use pbstream::schema::{self, FieldDef, FieldType, MessageType, ScalarType, Schema};
use rstest::fixture;

use crate::wire::{VARINT, WireWriter, int32};

/// Message type holding the repeated field in [`scalar_stream_schema`].
pub const STREAM_TYPE: &str = "test.Stream";
/// Field number of every fixture's repeated field.
pub const STREAM_FIELD: u32 = 1;
/// Message type holding `repeated test.Point points = 1`.
pub const POINTS_TYPE: &str = "test.Points";

/// Schema with `message test.Stream { repeated <scalar> values = 1; }`.
///
/// `packed` sets the explicit `[packed = ...]` option when `Some`.
#[must_use]
pub fn scalar_stream_schema(scalar: ScalarType, packed: Option<bool>) -> Arc<Schema> {
    let mut field = FieldDef::new("values", STREAM_FIELD, scalar).repeated();
    field.packed = packed;
    let schema = schema::load([MessageType::new(STREAM_TYPE).with_field(field)], [])
        .expect("fixture schema is valid");
    Arc::new(schema)
}

/// Schema with `test.Point { int32 x = 1; int32 y = 2; }` and
/// `test.Points { repeated test.Point points = 1; }`.
#[fixture]
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
pub fn point_schema() -> Arc<Schema> {
    let schema = schema::load(
        [
            MessageType::new("test.Point")
                .with_field(FieldDef::new("x", 1, ScalarType::Int32))
                .with_field(FieldDef::new("y", 2, ScalarType::Int32)),
            MessageType::new(POINTS_TYPE).with_field(
                FieldDef::new("points", STREAM_FIELD, FieldType::Named("test.Point".into()))
                    .repeated(),
            ),
        ],
        [],
    )
    .expect("fixture schema is valid");
    Arc::new(schema)
}

/// Encoded body of a `test.Point`.
#[must_use]
pub fn point(x: i32, y: i32) -> Vec<u8> {
    WireWriter::new()
        .tag(1, VARINT)
        .varint(int32(x))
        .tag(2, VARINT)
        .varint(int32(y))
        .into_bytes()
}
