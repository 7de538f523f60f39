//! Adapters connecting byte sources to a [`RepeatedFieldDecoder`].
//!
//! - [`PushDecoder`] for synchronous callers that receive chunks themselves.
//! - [`decode_reader`] and [`decode_chunks`] wrap any [`AsyncRead`] or
//!   chunk [`Stream`] in a [`FramedRead`], yielding one element per poll.
//! - [`element_channel`] runs decoding on its own task and hands elements
//!   over a bounded channel, propagating back-pressure to the reader.
//!
//! Every adapter is pull-driven: nothing is decoded ahead of the consumer
//! beyond the channel capacity.

use std::{io, pin::Pin};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio::{io::AsyncRead, sync::mpsc, task::JoinHandle};
use tokio_util::{
    codec::{Decoder, FramedRead},
    io::StreamReader,
};

use crate::{
    codec::{ValueCodec, WireValueCodec},
    decoder::RepeatedFieldDecoder,
    error::StreamError,
    value::Value,
};

/// Default capacity for [`element_channel`].
///
/// Bounds the number of decoded elements waiting for a slow consumer.
pub const DEFAULT_ELEMENT_CHANNEL_CAPACITY: usize = 16;

/// Stream of decoded elements produced by [`element_channel`].
pub type ElementStream = Pin<Box<dyn Stream<Item = Result<Value, StreamError>> + Send + 'static>>;

/// Synchronous chunk-at-a-time front end for a [`RepeatedFieldDecoder`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use pbstream::{
///     PushDecoder,
///     RepeatedFieldDecoder,
///     Value,
///     schema::{self, FieldDef, MessageType, ScalarType},
/// };
///
/// let schema = schema::load(
///     [MessageType::new("demo.Names")
///         .with_field(FieldDef::new("names", 1, ScalarType::String).repeated())],
///     [],
/// )
/// .expect("valid schema");
/// let decoder = RepeatedFieldDecoder::new(Arc::new(schema), "demo.Names").expect("streamable");
/// let mut push = PushDecoder::new(decoder);
///
/// // the second element's tag arrives before its length and payload
/// let first: Result<Vec<_>, _> = push.push(&[0x0a, 0x01, b'a', 0x0a]).collect();
/// assert_eq!(first.expect("decode"), vec![Value::String("a".into())]);
/// let rest: Result<Vec<_>, _> = push.push(&[0x01, b'b']).collect();
/// assert_eq!(rest.expect("decode"), vec![Value::String("b".into())]);
/// assert_eq!(push.finish().count(), 0);
/// ```
#[derive(Debug)]
pub struct PushDecoder<C = WireValueCodec> {
    decoder: RepeatedFieldDecoder<C>,
    buffer: BytesMut,
}

impl<C: ValueCodec> PushDecoder<C> {
    #[must_use]
    pub fn new(decoder: RepeatedFieldDecoder<C>) -> Self {
        Self {
            decoder,
            buffer: BytesMut::new(),
        }
    }

    /// Append `chunk` and return an iterator over the elements it completes.
    ///
    /// Elements are decoded lazily as the iterator is advanced. Bytes left
    /// undrained stay buffered for the next call.
    pub fn push(&mut self, chunk: &[u8]) -> Drain<'_, C> {
        if !self.decoder.is_terminated() {
            self.buffer.extend_from_slice(chunk);
        }
        Drain {
            owner: self,
            eof: false,
            done: false,
        }
    }

    /// Signal end-of-input and return the remaining elements.
    ///
    /// Yields [`FramingError::Truncated`](crate::FramingError::Truncated) if
    /// the input stopped inside a token.
    pub fn finish(&mut self) -> Drain<'_, C> {
        Drain {
            owner: self,
            eof: true,
            done: false,
        }
    }

    /// Bytes held for the token in progress.
    #[must_use]
    pub fn buffered(&self) -> usize { self.buffer.len() }

    #[must_use]
    pub fn decoder(&self) -> &RepeatedFieldDecoder<C> { &self.decoder }

    /// Drop buffered bytes and stop decoding.
    pub fn cancel(&mut self) { self.decoder.terminate(&mut self.buffer); }
}

/// Iterator returned by [`PushDecoder::push`] and [`PushDecoder::finish`].
#[derive(Debug)]
pub struct Drain<'a, C> {
    owner: &'a mut PushDecoder<C>,
    eof: bool,
    done: bool,
}

impl<C: ValueCodec> Iterator for Drain<'_, C> {
    type Item = Result<Value, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let PushDecoder { decoder, buffer } = &mut *self.owner;
        let result = if self.eof {
            decoder.decode_eof(buffer)
        } else {
            decoder.decode(buffer)
        };
        match result {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Decode elements from an [`AsyncRead`].
///
/// The returned [`FramedRead`] is a [`Stream`] of
/// `Result<Value, StreamError>` that ends after the first error.
pub fn decode_reader<R, C>(reader: R, decoder: RepeatedFieldDecoder<C>) -> FramedRead<R, RepeatedFieldDecoder<C>>
where
    R: AsyncRead,
    C: ValueCodec,
{
    FramedRead::new(reader, decoder)
}

/// Decode elements from a stream of byte chunks.
pub fn decode_chunks<S, C>(
    chunks: S,
    decoder: RepeatedFieldDecoder<C>,
) -> FramedRead<StreamReader<S, Bytes>, RepeatedFieldDecoder<C>>
where
    S: Stream<Item = io::Result<Bytes>>,
    C: ValueCodec,
{
    FramedRead::new(StreamReader::new(chunks), decoder)
}

/// Decode `reader` on a spawned task, delivering elements through a bounded
/// channel of `capacity` slots.
///
/// The task waits for channel capacity before decoding further, so a slow
/// consumer holds back the reader. Dropping the returned stream stops the
/// task at its next send; the decoder state is discarded with it.
///
/// Must be called from within a Tokio runtime.
///
/// # Panics
///
/// Panics if `capacity` is zero, mirroring [`tokio::sync::mpsc::channel`].
pub fn element_channel<R, C>(
    reader: R,
    decoder: RepeatedFieldDecoder<C>,
    capacity: usize,
) -> (ElementStream, JoinHandle<()>)
where
    R: AsyncRead + Send + Unpin + 'static,
    C: ValueCodec + 'static,
{
    let (tx, rx) = mpsc::channel(capacity);
    let handle = tokio::spawn(forward_elements(FramedRead::new(reader, decoder), tx));
    let stream = tokio_stream::wrappers::ReceiverStream::new(rx);
    (Box::pin(stream), handle)
}

async fn forward_elements<R, D>(mut framed: FramedRead<R, D>, tx: mpsc::Sender<Result<Value, StreamError>>)
where
    R: AsyncRead + Unpin,
    D: Decoder<Item = Value, Error = StreamError>,
{
    while let Some(item) = framed.next().await {
        let failed = item.is_err();
        if tx.send(item).await.is_err() {
            tracing::debug!("element receiver dropped; stopping decode task");
            return;
        }
        if failed {
            return;
        }
    }
}
