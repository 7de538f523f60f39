//! Every scalar type decodes back to the values that were encoded,
//! packed and unpacked, regardless of chunk size.

use std::fmt::Debug;

use bytes::Bytes;
use pbstream::{
    PushDecoder,
    RepeatedFieldDecoder,
    Value,
    schema::ScalarType,
};
use pbstream_testing::{
    STREAM_FIELD,
    STREAM_TYPE,
    chunks_of,
    decode_chunks,
    deterministic_runner,
    scalar_stream_schema,
    wire::{
        int32,
        int64,
        length_delimited_items,
        packed_fixed32,
        packed_fixed64,
        packed_varints,
        sint32,
        sint64,
        unpacked_fixed32,
        unpacked_fixed64,
        unpacked_varints,
    },
};
use proptest::{
    collection::vec,
    prelude::{BoxedStrategy, Strategy, any, prop_oneof},
    test_runner::TestCaseError,
};

/// One encoded stream and the values it should decode to.
#[derive(Clone, Debug)]
struct Case {
    scalar: ScalarType,
    bytes: Vec<u8>,
    expected: Vec<Value>,
}

fn varint_case<S>(
    scalar: ScalarType,
    elements: S,
    encode: fn(S::Value) -> u64,
    project: fn(S::Value) -> Value,
) -> BoxedStrategy<Case>
where
    S: Strategy + 'static,
    S::Value: Copy + Debug,
{
    (vec(elements, 0..16), any::<bool>())
        .prop_map(move |(items, packed)| {
            let raw: Vec<u64> = items.iter().map(|&v| encode(v)).collect();
            let bytes = if packed {
                packed_varints(STREAM_FIELD, &raw)
            } else {
                unpacked_varints(STREAM_FIELD, &raw)
            };
            Case {
                scalar,
                bytes,
                expected: items.into_iter().map(project).collect(),
            }
        })
        .boxed()
}

fn fixed32_case<S>(
    scalar: ScalarType,
    elements: S,
    encode: fn(S::Value) -> u32,
    project: fn(S::Value) -> Value,
) -> BoxedStrategy<Case>
where
    S: Strategy + 'static,
    S::Value: Copy + Debug,
{
    (vec(elements, 0..16), any::<bool>())
        .prop_map(move |(items, packed)| {
            let raw: Vec<u32> = items.iter().map(|&v| encode(v)).collect();
            let bytes = if packed {
                packed_fixed32(STREAM_FIELD, &raw)
            } else {
                unpacked_fixed32(STREAM_FIELD, &raw)
            };
            Case {
                scalar,
                bytes,
                expected: items.into_iter().map(project).collect(),
            }
        })
        .boxed()
}

fn fixed64_case<S>(
    scalar: ScalarType,
    elements: S,
    encode: fn(S::Value) -> u64,
    project: fn(S::Value) -> Value,
) -> BoxedStrategy<Case>
where
    S: Strategy + 'static,
    S::Value: Copy + Debug,
{
    (vec(elements, 0..16), any::<bool>())
        .prop_map(move |(items, packed)| {
            let raw: Vec<u64> = items.iter().map(|&v| encode(v)).collect();
            let bytes = if packed {
                packed_fixed64(STREAM_FIELD, &raw)
            } else {
                unpacked_fixed64(STREAM_FIELD, &raw)
            };
            Case {
                scalar,
                bytes,
                expected: items.into_iter().map(project).collect(),
            }
        })
        .boxed()
}

fn case_strategy() -> impl Strategy<Value = Case> {
    prop_oneof![
        varint_case(ScalarType::Int32, any::<i32>(), int32, Value::I32),
        varint_case(ScalarType::Int64, any::<i64>(), int64, Value::I64),
        varint_case(ScalarType::Uint32, any::<u32>(), u64::from, Value::U32),
        varint_case(ScalarType::Uint64, any::<u64>(), |v| v, Value::U64),
        varint_case(ScalarType::Sint32, any::<i32>(), sint32, Value::I32),
        varint_case(ScalarType::Sint64, any::<i64>(), sint64, Value::I64),
        varint_case(ScalarType::Bool, any::<bool>(), u64::from, Value::Bool),
        fixed32_case(ScalarType::Fixed32, any::<u32>(), |v| v, Value::U32),
        fixed32_case(
            ScalarType::Sfixed32,
            any::<i32>(),
            |v| u32::from_le_bytes(v.to_le_bytes()),
            Value::I32
        ),
        fixed32_case(
            ScalarType::Float,
            proptest::num::f32::NORMAL,
            f32::to_bits,
            Value::F32
        ),
        fixed64_case(ScalarType::Fixed64, any::<u64>(), |v| v, Value::U64),
        fixed64_case(
            ScalarType::Sfixed64,
            any::<i64>(),
            |v| u64::from_le_bytes(v.to_le_bytes()),
            Value::I64
        ),
        fixed64_case(
            ScalarType::Double,
            proptest::num::f64::NORMAL,
            f64::to_bits,
            Value::F64
        ),
        vec("[a-zA-Z0-9 éß]{0,12}", 0..8).prop_map(|items| Case {
            scalar: ScalarType::String,
            bytes: length_delimited_items(STREAM_FIELD, &items),
            expected: items.into_iter().map(Value::String).collect(),
        })
        .boxed(),
        vec(vec(any::<u8>(), 0..24), 0..8).prop_map(|items| Case {
            scalar: ScalarType::Bytes,
            bytes: length_delimited_items(STREAM_FIELD, &items),
            expected: items
                .into_iter()
                .map(|b| Value::Bytes(Bytes::from(b)))
                .collect(),
        })
        .boxed(),
    ]
}

#[test]
fn scalars_round_trip_at_any_chunk_size() {
    let mut runner = deterministic_runner(256);
    runner
        .run(&(case_strategy(), 1usize..9), |(case, chunk_size)| {
            let decoder =
                RepeatedFieldDecoder::new(scalar_stream_schema(case.scalar, None), STREAM_TYPE)
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let mut push = PushDecoder::new(decoder);
            let decoded = decode_chunks(&mut push, chunks_of(&case.bytes, chunk_size));
            if let Some(err) = decoded.error {
                return Err(TestCaseError::fail(format!(
                    "{:?} stream failed: {err}",
                    case.scalar
                )));
            }
            if decoded.values != case.expected {
                return Err(TestCaseError::fail(format!(
                    "{:?}: decoded {:?}, expected {:?}",
                    case.scalar, decoded.values, case.expected
                )));
            }
            Ok(())
        })
        .expect("scalar round trip holds");
}
