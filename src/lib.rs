#![doc(html_root_url = "https://docs.rs/pbstream/latest")]
//! Public API for the `pbstream` library.
//!
//! This crate decodes a Protocol Buffers message consisting of exactly one
//! repeated field incrementally: bytes arrive in arbitrary chunks and each
//! element is emitted as soon as its bytes are complete, without buffering
//! the whole message. Packed and unpacked encodings are both accepted, and
//! the decoded sequence does not depend on where the chunk boundaries fall.
//!
//! Start with [`schema::load`] to describe the message types, build a
//! [`RepeatedFieldDecoder`] for the streamed type, and drive it through one
//! of the adapters in [`stream`].

pub mod codec;
pub mod config;
pub mod decoder;
pub mod error;
pub mod field;
pub mod metrics;
pub mod schema;
pub mod stream;
pub mod value;
pub mod varint;

pub use codec::{ValueCodec, ValueError, WireValueCodec};
pub use config::DecoderConfig;
pub use decoder::{RepeatedFieldDecoder, Token};
pub use error::{DecodeError, FramingError, SchemaError, SchemaValidationError, StreamError};
pub use field::{FieldDescriptor, ValueKind, WireType};
pub use metrics::{ELEMENTS_DECODED, ERRORS_TOTAL};
pub use stream::{
    DEFAULT_ELEMENT_CHANNEL_CAPACITY,
    Drain,
    ElementStream,
    PushDecoder,
    decode_chunks,
    decode_reader,
    element_channel,
};
pub use value::{MessageValue, Value};
