//! Incremental decoder for a message made of one repeated field.
//!
//! [`RepeatedFieldDecoder`] is a [`tokio_util::codec::Decoder`]: it is fed a
//! growing [`BytesMut`] and yields one [`Value`] per repeated-field element
//! as soon as the element's bytes are complete. Each element is framed by a
//! TAG, an optional LENGTH, and a PAYLOAD token:
//!
//! | Field encoding | Tokens per element |
//! |---|---|
//! | unpacked varint / fixed | TAG, PAYLOAD |
//! | length-delimited | TAG, LENGTH, PAYLOAD |
//! | packed run | TAG, LENGTH once, then PAYLOAD per element |
//!
//! Consumed bytes are split off the buffer as soon as a token completes, so
//! the buffer never holds more than the token in progress.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use bytes::BytesMut;
//! use pbstream::{
//!     RepeatedFieldDecoder,
//!     Value,
//!     schema::{self, FieldDef, MessageType, ScalarType},
//! };
//! use tokio_util::codec::Decoder;
//!
//! let schema = schema::load(
//!     [MessageType::new("demo.Numbers")
//!         .with_field(FieldDef::new("values", 1, ScalarType::Int32).repeated())],
//!     [],
//! )
//! .expect("valid schema");
//! let mut decoder =
//!     RepeatedFieldDecoder::new(Arc::new(schema), "demo.Numbers").expect("streamable type");
//!
//! // packed run of [1, 2] split across two chunks
//! let mut buf = BytesMut::from(&[0x0a, 0x02, 0x01][..]);
//! assert_eq!(decoder.decode(&mut buf).expect("decode"), Some(Value::I32(1)));
//! assert_eq!(decoder.decode(&mut buf).expect("decode"), None);
//! buf.extend_from_slice(&[0x02]);
//! assert_eq!(decoder.decode(&mut buf).expect("decode"), Some(Value::I32(2)));
//! assert_eq!(decoder.decode_eof(&mut buf).expect("clean end"), None);
//! ```

use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::{
    codec::{ValueCodec, WireValueCodec},
    config::DecoderConfig,
    error::{DecodeError, FramingError, SchemaValidationError, StreamError},
    field::{FieldDescriptor, WireType},
    metrics,
    schema::SchemaProvider,
    value::Value,
    varint,
};

mod state;

pub use state::Token;
use state::DecoderState;

/// Streaming decoder for the single repeated field of a message type.
///
/// A decoder instance is single-owner and not reusable: after the input ends
/// or the first error, it produces nothing further.
#[derive(Debug)]
pub struct RepeatedFieldDecoder<C = WireValueCodec> {
    field: FieldDescriptor,
    codec: C,
    config: DecoderConfig,
    state: DecoderState,
}

impl<P: SchemaProvider> RepeatedFieldDecoder<WireValueCodec<P>> {
    /// Resolve `message_type` in `schema` and build a decoder using the
    /// standard [`WireValueCodec`].
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaValidationError`] if the type is missing or does not
    /// consist of exactly one repeated field.
    pub fn new(schema: Arc<P>, message_type: &str) -> Result<Self, SchemaValidationError> {
        let field = FieldDescriptor::resolve(&*schema, message_type)?;
        Ok(Self::with_codec(field, WireValueCodec::new(schema)))
    }
}

impl<C: ValueCodec> RepeatedFieldDecoder<C> {
    /// Build a decoder from an already resolved field and a custom codec.
    #[must_use]
    pub fn with_codec(field: FieldDescriptor, codec: C) -> Self {
        Self {
            field,
            codec,
            config: DecoderConfig::default(),
            state: DecoderState::new(),
        }
    }

    /// Replace the decoder limits.
    #[must_use]
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// The field being streamed.
    #[must_use]
    pub fn field(&self) -> &FieldDescriptor { &self.field }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig { &self.config }

    /// Tag learned from the first element, if one has been read.
    #[must_use]
    pub fn learned_tag(&self) -> Option<u64> { self.state.tag.get() }

    /// Token the decoder is currently waiting to complete.
    #[must_use]
    pub fn next_token(&self) -> Token { self.state.next }

    /// Number of elements emitted so far.
    #[must_use]
    pub fn elements_emitted(&self) -> u64 { self.state.emitted }

    /// Whether the decoder has reached end-of-input or failed.
    #[must_use]
    pub fn is_terminated(&self) -> bool { self.state.terminated }

    /// Discard all state. Later calls produce nothing.
    pub fn terminate(&mut self, src: &mut BytesMut) {
        src.clear();
        self.state.terminate();
    }

    fn advance(&mut self, src: &mut BytesMut) -> Result<Option<Value>, StreamError> {
        loop {
            debug_assert!(self.state.read_offset <= src.len());
            match self.state.next {
                Token::Tag => {
                    let Some(len) = self.scan_varint(src)? else {
                        return Ok(None);
                    };
                    let tag = varint::decode_varint(&src[..len]);
                    self.consume(src, len);
                    self.accept_tag(tag)?;
                }
                Token::Length => {
                    let Some(len) = self.scan_varint(src)? else {
                        return Ok(None);
                    };
                    let declared = varint::decode_varint(&src[..len]);
                    self.consume(src, len);
                    self.accept_length(declared)?;
                }
                Token::Payload => {
                    let Some(len) = self.scan_payload(src)? else {
                        return Ok(None);
                    };
                    let payload = src.split_to(len).freeze();
                    self.state.read_offset = 0;
                    self.finish_element(len)?;
                    return self.decode_element(payload).map(Some);
                }
            }
        }
    }

    fn consume(&mut self, src: &mut BytesMut, len: usize) {
        src.advance(len);
        self.state.read_offset = 0;
    }

    /// Find the end of a varint token starting at the front of `src`,
    /// resuming from where the previous scan stopped.
    fn scan_varint(&mut self, src: &BytesMut) -> Result<Option<usize>, FramingError> {
        let max = self.config.max_varint_len();
        match varint::find_terminator(src, self.state.read_offset) {
            Some(len) if len <= max => Ok(Some(len)),
            Some(_) => Err(FramingError::MalformedVarint { max }),
            None if src.len() >= max => Err(FramingError::MalformedVarint { max }),
            None => {
                self.state.read_offset = src.len();
                Ok(None)
            }
        }
    }

    fn scan_payload(&mut self, src: &mut BytesMut) -> Result<Option<usize>, FramingError> {
        let need = match self.field.wire_type() {
            WireType::Varint => return self.scan_varint(src),
            WireType::Fixed32 => 4,
            WireType::Fixed64 => 8,
            WireType::LengthDelimited => self.state.payload_len,
        };
        if self.state.packed && need > self.state.run_remaining {
            return Err(FramingError::PackedRunOverrun {
                element: need,
                remaining: self.state.run_remaining,
            });
        }
        if src.len() >= need {
            return Ok(Some(need));
        }
        src.reserve(need - src.len());
        self.state.read_offset = src.len();
        Ok(None)
    }

    fn accept_tag(&mut self, tag: u64) -> Result<(), FramingError> {
        let element = self.field.wire_type();
        if self.state.tag.observe(tag)? {
            #[expect(clippy::cast_possible_truncation, reason = "masked to three bits")]
            let bits = (tag & 0x7) as u8;
            self.state.packed = match WireType::from_bits(bits) {
                Some(WireType::LengthDelimited) if element.is_packable() => true,
                Some(wire_type) if wire_type == element => false,
                _ => {
                    return Err(FramingError::UnexpectedWireType {
                        field: self.field.name().to_owned(),
                        expected: element,
                        actual: bits,
                    });
                }
            };
            if self.state.packed != self.field.is_packed() {
                tracing::debug!(
                    field = self.field.name(),
                    packed = self.state.packed,
                    "stream packing differs from schema; following the stream"
                );
            }
            tracing::debug!(
                field = self.field.name(),
                tag,
                packed = self.state.packed,
                "learned element tag"
            );
        }
        self.state.next = if self.state.packed || element == WireType::LengthDelimited {
            Token::Length
        } else {
            Token::Payload
        };
        Ok(())
    }

    fn accept_length(&mut self, declared: u64) -> Result<(), FramingError> {
        let max = self.config.max_element_len();
        // a packed run is consumed element by element, so only its
        // elements are bounded, never the run itself
        let limit = if self.state.packed { usize::MAX } else { max };
        let len = usize::try_from(declared)
            .ok()
            .filter(|&len| len <= limit)
            .ok_or(FramingError::OversizedElement {
                size: declared,
                max: limit,
            })?;
        if self.state.packed {
            self.state.run_remaining = len;
            self.state.next = if len == 0 { Token::Tag } else { Token::Payload };
        } else {
            self.state.payload_len = len;
            self.state.next = Token::Payload;
        }
        Ok(())
    }

    fn finish_element(&mut self, len: usize) -> Result<(), FramingError> {
        if self.state.packed {
            let remaining = self.state.run_remaining;
            if len > remaining {
                return Err(FramingError::PackedRunOverrun {
                    element: len,
                    remaining,
                });
            }
            self.state.run_remaining = remaining - len;
            if self.state.run_remaining == 0 {
                self.state.next = Token::Tag;
            }
        } else {
            self.state.payload_len = 0;
            self.state.next = Token::Tag;
        }
        Ok(())
    }

    fn decode_element(&mut self, payload: Bytes) -> Result<Value, StreamError> {
        let payload_len = payload.len();
        let value = self
            .codec
            .decode_value(self.field.kind(), payload)
            .map_err(|source| DecodeError {
                field: self.field.name().to_owned(),
                index: self.state.emitted,
                payload_len,
                source,
            })?;
        self.state.emitted += 1;
        Ok(value)
    }

    fn fail(&mut self, src: &mut BytesMut, err: StreamError) -> StreamError {
        self.terminate(src);
        metrics::inc_errors(err.error_type());
        tracing::warn!(
            field = self.field.name(),
            error_type = err.error_type(),
            elements = self.state.emitted,
            "repeated field decoding failed: {err}"
        );
        err
    }
}

impl<C: ValueCodec> Decoder for RepeatedFieldDecoder<C> {
    type Item = Value;
    type Error = StreamError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.state.terminated {
            src.clear();
            return Ok(None);
        }
        match self.advance(src) {
            Ok(Some(value)) => {
                metrics::inc_elements();
                tracing::trace!(
                    field = self.field.name(),
                    index = self.state.emitted - 1,
                    "emitted element"
                );
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(err) => Err(self.fail(src, err)),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(value) = self.decode(src)? {
            return Ok(Some(value));
        }
        if self.state.terminated {
            return Ok(None);
        }
        if src.is_empty() && self.state.next == Token::Tag {
            tracing::debug!(
                field = self.field.name(),
                elements = self.state.emitted,
                "stream ended at element boundary"
            );
            self.terminate(src);
            return Ok(None);
        }
        let err = FramingError::Truncated {
            token: self.state.next,
            buffered: src.len(),
        };
        Err(self.fail(src, err.into()))
    }
}
