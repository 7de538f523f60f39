//! Value codecs turning framed payload spans into [`Value`]s.
//!
//! The frame decoder only finds element boundaries. Once a span is complete
//! it hands the bytes and the field's resolved [`ValueKind`] to a
//! [`ValueCodec`]. [`WireValueCodec`] is the standard implementation: it
//! reads scalars straight off the wire, validates UTF-8 for strings, passes
//! `bytes` through untouched, and projects embedded messages into a
//! [`MessageValue`](crate::value::MessageValue) using the schema.

use std::sync::Arc;

use bytes::Bytes;

use crate::{
    field::ValueKind,
    schema::{Schema, SchemaProvider},
    value::Value,
};

pub mod error;
mod message;
mod scalar;

pub use error::ValueError;

/// Default limit on embedded-message nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Decodes one framed element.
///
/// Implementations must be pure with respect to the stream: the frame
/// decoder calls this once per element, in order, and treats any error as
/// terminal.
pub trait ValueCodec: Send + Sync {
    /// Decode `payload` as a value of `kind`.
    ///
    /// For varint and fixed-width kinds `payload` holds exactly the encoded
    /// value. For length-delimited kinds it holds the bytes after the length
    /// prefix.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] if the span is not a valid encoding of
    /// `kind`.
    fn decode_value(&self, kind: &ValueKind, payload: Bytes) -> Result<Value, ValueError>;
}

/// Schema-aware codec for the standard protobuf wire encoding.
#[derive(Debug)]
pub struct WireValueCodec<P = Schema> {
    schema: Arc<P>,
    max_depth: usize,
}

impl<P> Clone for WireValueCodec<P> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            max_depth: self.max_depth,
        }
    }
}

impl<P: SchemaProvider> WireValueCodec<P> {
    /// Create a codec resolving enum names and embedded types via `schema`.
    #[must_use]
    pub fn new(schema: Arc<P>) -> Self {
        Self {
            schema,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the embedded-message nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The schema this codec resolves types against.
    #[must_use]
    pub fn schema(&self) -> &Arc<P> { &self.schema }

    fn decode_kind(&self, kind: &ValueKind, payload: Bytes, depth: usize) -> Result<Value, ValueError> {
        match kind {
            ValueKind::Scalar(scalar) => scalar::read_scalar(*scalar, payload),
            ValueKind::Enum { type_name } => {
                #[expect(clippy::cast_possible_truncation, reason = "enums are int32 on the wire")]
                let number = scalar::read_varint(&payload)? as i32;
                let name = self
                    .schema
                    .enumeration(type_name)
                    .and_then(|ty| ty.name_of(number))
                    .map(str::to_owned);
                Ok(Value::Enum { number, name })
            }
            ValueKind::Message { type_name } => self
                .decode_message(type_name, &payload, depth)
                .map(Value::Message),
            ValueKind::Opaque { .. } => Ok(Value::Bytes(payload)),
        }
    }
}

impl<P: SchemaProvider> ValueCodec for WireValueCodec<P> {
    fn decode_value(&self, kind: &ValueKind, payload: Bytes) -> Result<Value, ValueError> {
        self.decode_kind(kind, payload, 0)
    }
}
