//! Error taxonomy for schema loading, construction and stream decoding.
//!
//! - [`SchemaError`]: a schema description is internally inconsistent.
//! - [`SchemaValidationError`]: the target message cannot be streamed
//!   (construction time).
//! - [`FramingError`]: the byte stream violates the tag/length/value framing
//!   of a single repeated field.
//! - [`DecodeError`]: a fully framed element could not be decoded by the
//!   value codec.
//! - [`StreamError`]: top-level decode-time error surfaced through the
//!   stream adapters, wrapping the two above plus transport I/O.
//!
//! Every decode-time error is terminal. Elements emitted before the error
//! stay valid.

use std::io;

use thiserror::Error;

use crate::{codec::ValueError, decoder::Token, field::WireType};

/// Inconsistencies found while loading a schema.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// Two types share a fully qualified name.
    #[error("type `{name}` is declared more than once")]
    DuplicateType {
        /// The repeated name.
        name: String,
    },

    /// A field number is zero, reserved, or above the protobuf maximum.
    #[error("field `{message}.{field}` has invalid number {number}")]
    InvalidFieldNumber {
        /// Owning message type.
        message: String,
        /// Offending field.
        field: String,
        /// Rejected number.
        number: u32,
    },

    /// Two fields of one message share a number.
    #[error("message `{message}` uses field number {number} more than once")]
    DuplicateFieldNumber {
        /// Owning message type.
        message: String,
        /// Repeated number.
        number: u32,
    },

    /// A named field type refers to neither a message nor an enum.
    #[error("field `{message}.{field}` refers to unknown type `{target}`")]
    UnresolvedType {
        /// Owning message type.
        message: String,
        /// Offending field.
        field: String,
        /// The missing type name.
        target: String,
    },
}

/// Reasons a message type cannot be decoded as a single repeated field.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaValidationError {
    /// The schema has no message type with this name.
    #[error("message type `{name}` not found in schema")]
    MessageNotFound {
        /// Requested type name.
        name: String,
    },

    /// The message declares no fields.
    #[error("message type `{message}` has no fields; expected exactly one repeated field")]
    NoFields {
        /// Target message type.
        message: String,
    },

    /// The message declares more than one field.
    #[error("message type `{message}` has {count} fields; expected exactly one repeated field")]
    MultipleFields {
        /// Target message type.
        message: String,
        /// Number of declared fields.
        count: usize,
    },

    /// The sole field is not marked repeated.
    #[error("field `{message}.{field}` is not repeated")]
    NotRepeated {
        /// Target message type.
        message: String,
        /// The sole field.
        field: String,
    },
}

/// Framing violations detected by the incremental decoder.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FramingError {
    /// A later element announced a different tag than the first one.
    #[error("tag mismatch: expected {expected:#x}, got {actual:#x}")]
    TagMismatch {
        /// Tag learned from the first element.
        expected: u64,
        /// Tag that was read.
        actual: u64,
    },

    /// The first tag carries a wire type the field cannot be framed with.
    #[error("field `{field}` cannot use wire type {actual:?} (expected {expected:?})")]
    UnexpectedWireType {
        /// Field being decoded.
        field: String,
        /// Wire type implied by the field's declared type.
        expected: WireType,
        /// Raw wire type bits from the tag.
        actual: u8,
    },

    /// A varint token ran past the configured length cap without a
    /// terminating byte.
    #[error("malformed varint: no terminator within {max} bytes")]
    MalformedVarint {
        /// Configured cap.
        max: usize,
    },

    /// A declared element or packed-run length exceeds the configured limit.
    #[error("element exceeds max length: {size} > {max}")]
    OversizedElement {
        /// Declared size.
        size: u64,
        /// Configured limit.
        max: usize,
    },

    /// A packed element extends past the end of its run.
    #[error("packed element of {element} bytes overruns run with {remaining} bytes left")]
    PackedRunOverrun {
        /// Size of the element just framed.
        element: usize,
        /// Bytes the run still had.
        remaining: usize,
    },

    /// Input ended in the middle of a token.
    #[error("input ended inside {token} token with {buffered} bytes buffered")]
    Truncated {
        /// Token that was in progress.
        token: Token,
        /// Bytes held for that token.
        buffered: usize,
    },
}

/// A framed element the value codec could not decode.
#[derive(Debug, Error)]
#[error("failed to decode element {index} of `{field}` ({payload_len} byte payload): {source}")]
pub struct DecodeError {
    /// Field being decoded.
    pub field: String,
    /// Zero-based position of the element in the stream.
    pub index: u64,
    /// Length of the framed payload span.
    pub payload_len: usize,
    /// Underlying codec failure.
    #[source]
    pub source: ValueError,
}

/// Top-level decode-time error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamError {
    /// Tag/length/value framing was violated.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// A framed element failed value decoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The byte source failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StreamError {
    /// Returns the error category as a string for logging and metrics.
    ///
    /// One of `"framing"`, `"decode"`, or `"io"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Framing(_) => "framing",
            Self::Decode(_) => "decode",
            Self::Io(_) => "io",
        }
    }

    /// Returns true if the input ended inside a token.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Framing(FramingError::Truncated { .. }))
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(e) => e,
            StreamError::Framing(e @ FramingError::Truncated { .. }) => {
                io::Error::new(io::ErrorKind::UnexpectedEof, e)
            }
            StreamError::Framing(e) => io::Error::new(io::ErrorKind::InvalidData, e),
            StreamError::Decode(e) => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use rstest::rstest;

    use super::*;

    #[test]
    fn schema_validation_messages_are_distinguishable() {
        let messages = [
            SchemaValidationError::MessageNotFound { name: "a.B".into() }.to_string(),
            SchemaValidationError::NoFields { message: "a.B".into() }.to_string(),
            SchemaValidationError::MultipleFields {
                message: "a.B".into(),
                count: 2,
            }
            .to_string(),
            SchemaValidationError::NotRepeated {
                message: "a.B".into(),
                field: "x".into(),
            }
            .to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[rstest]
    #[case(
        StreamError::Framing(FramingError::TagMismatch { expected: 8, actual: 16 }),
        "framing",
        io::ErrorKind::InvalidData
    )]
    #[case(
        StreamError::Framing(FramingError::Truncated { token: Token::Payload, buffered: 3 }),
        "framing",
        io::ErrorKind::UnexpectedEof
    )]
    #[case(
        StreamError::Decode(DecodeError {
            field: "values".into(),
            index: 0,
            payload_len: 1,
            source: ValueError::InvalidUtf8,
        }),
        "decode",
        io::ErrorKind::InvalidData
    )]
    #[case(
        StreamError::Io(io::Error::other("reset")),
        "io",
        io::ErrorKind::Other
    )]
    fn stream_error_categories(
        #[case] err: StreamError,
        #[case] expected_type: &str,
        #[case] expected_kind: io::ErrorKind,
    ) {
        assert_eq!(err.error_type(), expected_type);
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), expected_kind);
    }

    #[test]
    fn tag_mismatch_message_shows_both_tags() {
        let err = FramingError::TagMismatch {
            expected: 0x0a,
            actual: 0x12,
        };
        assert_eq!(err.to_string(), "tag mismatch: expected 0xa, got 0x12");
    }

    #[test]
    fn decode_error_exposes_source() {
        let err = DecodeError {
            field: "names".into(),
            index: 4,
            payload_len: 2,
            source: ValueError::InvalidUtf8,
        };
        let source = std::error::Error::source(&err).expect("source present");
        assert_eq!(source.to_string(), ValueError::InvalidUtf8.to_string());
        assert!(err.to_string().contains("element 4 of `names`"));
    }
}
