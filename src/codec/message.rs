//! Structured projection of embedded messages.
//!
//! Unlike the frame decoder, this works on a span that is already complete,
//! so it walks nested fields with a plain cursor.

use bytes::Bytes;

use super::{ValueError, WireValueCodec, scalar::read_varint};
use crate::{
    field::{ValueKind, WireType},
    schema::SchemaProvider,
    value::MessageValue,
    varint::decode_varint_u64,
};

/// Cut the next value of `wire_type` out of `buf` at `*pos`.
///
/// For length-delimited values the returned span excludes the length prefix.
pub(super) fn take_span(buf: &Bytes, pos: &mut usize, wire_type: WireType) -> Result<Bytes, ValueError> {
    let rest = buf.get(*pos..).ok_or(ValueError::Truncated)?;
    let (start, len) = match wire_type {
        WireType::Varint => {
            let (_, used) = decode_varint_u64(rest)?;
            (*pos, used)
        }
        WireType::Fixed32 => (*pos, 4),
        WireType::Fixed64 => (*pos, 8),
        WireType::LengthDelimited => {
            let (len, used) = decode_varint_u64(rest)?;
            let len = usize::try_from(len).map_err(|_| ValueError::Truncated)?;
            (*pos + used, len)
        }
    };
    let end = start
        .checked_add(len)
        .filter(|&end| end <= buf.len())
        .ok_or(ValueError::Truncated)?;
    *pos = end;
    Ok(buf.slice(start..end))
}

impl<P: SchemaProvider> WireValueCodec<P> {
    pub(super) fn decode_message(
        &self,
        type_name: &str,
        buf: &Bytes,
        depth: usize,
    ) -> Result<MessageValue, ValueError> {
        if depth >= self.max_depth {
            return Err(ValueError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        let ty = self
            .schema
            .message(type_name)
            .ok_or_else(|| ValueError::UnknownMessage {
                name: type_name.to_owned(),
            })?;

        let mut out = MessageValue::new();
        let mut pos = 0;
        while pos < buf.len() {
            let tag_span = take_span(buf, &mut pos, WireType::Varint)?;
            let tag = read_varint(&tag_span)?;
            let bits = u8::try_from(tag & 0x7).unwrap_or_default();
            let wire_type =
                WireType::from_bits(bits).ok_or(ValueError::UnsupportedWireType { bits })?;
            let number = u32::try_from(tag >> 3).map_err(|_| ValueError::InvalidFieldNumber)?;
            if number == 0 {
                return Err(ValueError::InvalidFieldNumber);
            }
            let span = take_span(buf, &mut pos, wire_type)?;

            let Some(field) = ty.field_by_number(number) else {
                tracing::trace!(message = type_name, number, "skipping unknown field");
                continue;
            };
            let kind = ValueKind::resolve(&field.field_type, &*self.schema);
            let expected = kind.wire_type();

            if field.is_repeated() && expected.is_packable() && wire_type == WireType::LengthDelimited {
                let mut run_pos = 0;
                while run_pos < span.len() {
                    let element = take_span(&span, &mut run_pos, expected)?;
                    out.push(&field.name, self.decode_kind(&kind, element, depth + 1)?);
                }
                continue;
            }

            if wire_type != expected {
                return Err(ValueError::WireTypeMismatch {
                    field: field.name.clone(),
                    expected,
                    actual: wire_type,
                });
            }
            let value = self.decode_kind(&kind, span, depth + 1)?;
            if field.is_repeated() {
                out.push(&field.name, value);
            } else {
                out.set(&field.name, value);
            }
        }
        Ok(out)
    }
}
