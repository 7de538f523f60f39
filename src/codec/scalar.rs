//! Wire-value readers for scalar types.

use bytes::Bytes;

use super::ValueError;
use crate::{
    schema::ScalarType,
    value::Value,
    varint::{decode_varint_u64, zigzag_decode_32, zigzag_decode_64},
};

/// Decode a varint that must fill `payload` exactly.
pub(crate) fn read_varint(payload: &[u8]) -> Result<u64, ValueError> {
    let (raw, consumed) = decode_varint_u64(payload)?;
    if consumed != payload.len() {
        return Err(ValueError::TrailingBytes {
            consumed,
            len: payload.len(),
        });
    }
    Ok(raw)
}

fn read_fixed<const N: usize>(payload: &[u8]) -> Result<[u8; N], ValueError> {
    payload.try_into().map_err(|_| ValueError::FixedWidth {
        expected: N,
        actual: payload.len(),
    })
}

/// Decode `payload` as a value of `scalar`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    reason = "protobuf truncates 32-bit varints and reinterprets two's complement"
)]
pub(crate) fn read_scalar(scalar: ScalarType, payload: Bytes) -> Result<Value, ValueError> {
    let value = match scalar {
        ScalarType::Int32 => Value::I32(read_varint(&payload)? as i32),
        ScalarType::Int64 => Value::I64(read_varint(&payload)? as i64),
        ScalarType::Uint32 => Value::U32(read_varint(&payload)? as u32),
        ScalarType::Uint64 => Value::U64(read_varint(&payload)?),
        ScalarType::Sint32 => Value::I32(zigzag_decode_32(read_varint(&payload)?)),
        ScalarType::Sint64 => Value::I64(zigzag_decode_64(read_varint(&payload)?)),
        ScalarType::Bool => Value::Bool(read_varint(&payload)? != 0),
        ScalarType::Fixed32 => Value::U32(u32::from_le_bytes(read_fixed(&payload)?)),
        ScalarType::Sfixed32 => Value::I32(i32::from_le_bytes(read_fixed(&payload)?)),
        ScalarType::Float => Value::F32(f32::from_le_bytes(read_fixed(&payload)?)),
        ScalarType::Fixed64 => Value::U64(u64::from_le_bytes(read_fixed(&payload)?)),
        ScalarType::Sfixed64 => Value::I64(i64::from_le_bytes(read_fixed(&payload)?)),
        ScalarType::Double => Value::F64(f64::from_le_bytes(read_fixed(&payload)?)),
        ScalarType::String => {
            let text = std::str::from_utf8(&payload).map_err(|_| ValueError::InvalidUtf8)?;
            Value::String(text.to_owned())
        }
        ScalarType::Bytes => Value::Bytes(payload),
    };
    Ok(value)
}
