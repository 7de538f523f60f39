//! Failures reported by the value codec.

use thiserror::Error;

use crate::{field::WireType, varint::VarintError};

/// A framed payload span that could not be turned into a [`Value`].
///
/// [`Value`]: crate::value::Value
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValueError {
    /// The span ended before the value (or a nested field) was complete.
    #[error("payload truncated")]
    Truncated,

    /// A varint does not fit in 64 bits.
    #[error("varint overflows 64 bits")]
    VarintOverflow,

    /// A varint scalar was followed by extra bytes.
    #[error("varint used {consumed} of {len} payload bytes")]
    TrailingBytes {
        /// Bytes the varint occupied.
        consumed: usize,
        /// Bytes in the span.
        len: usize,
    },

    /// A fixed-width scalar span has the wrong size.
    #[error("fixed-width value needs {expected} bytes, got {actual}")]
    FixedWidth {
        /// Width the type requires.
        expected: usize,
        /// Width received.
        actual: usize,
    },

    /// A `string` payload is not UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// An embedded message names a type the schema does not declare.
    #[error("unknown message type `{name}`")]
    UnknownMessage {
        /// The missing type.
        name: String,
    },

    /// A nested tag uses a wire type this codec does not handle (groups).
    #[error("unsupported wire type {bits}")]
    UnsupportedWireType {
        /// Raw wire type bits.
        bits: u8,
    },

    /// A nested tag carries field number zero or one past `u32`.
    #[error("invalid nested field number")]
    InvalidFieldNumber,

    /// A nested field arrived with a wire type its declared type cannot use.
    #[error("field `{field}` expects wire type {expected:?}, got {actual:?}")]
    WireTypeMismatch {
        /// Offending field.
        field: String,
        /// Wire type of the declared type.
        expected: WireType,
        /// Wire type on the wire.
        actual: WireType,
    },

    /// Embedded messages nest deeper than the codec allows.
    #[error("message nesting exceeds {limit} levels")]
    NestingTooDeep {
        /// Configured limit.
        limit: usize,
    },
}

impl From<VarintError> for ValueError {
    fn from(err: VarintError) -> Self {
        match err {
            VarintError::Unterminated => Self::Truncated,
            VarintError::Overflow => Self::VarintOverflow,
        }
    }
}
