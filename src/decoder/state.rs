//! Mutable per-stream state of the frame decoder.

use std::fmt;

use crate::error::FramingError;

/// The token the decoder is waiting to complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// Field tag varint.
    Tag,
    /// Length varint of a length-delimited element or packed run.
    Length,
    /// Element payload.
    Payload,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tag => "tag",
            Self::Length => "length",
            Self::Payload => "payload",
        })
    }
}

/// Tag learned from the first element.
///
/// Moves from unset to set exactly once; afterwards every tag is compared
/// against it and it is never reassigned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct LearnedTag(Option<u64>);

impl LearnedTag {
    /// Record or check `tag`. Returns `true` the first time a tag is seen.
    pub(crate) fn observe(&mut self, tag: u64) -> Result<bool, FramingError> {
        match self.0 {
            None => {
                self.0 = Some(tag);
                Ok(true)
            }
            Some(expected) if expected == tag => Ok(false),
            Some(expected) => Err(FramingError::TagMismatch {
                expected,
                actual: tag,
            }),
        }
    }

    pub(crate) fn get(self) -> Option<u64> { self.0 }
}

/// Cursor and bookkeeping for the in-progress token.
///
/// The decoder's buffer only ever holds bytes of the current token;
/// `read_offset` marks how far into them a varint scan has already looked
/// so a resumed scan does not revisit them.
#[derive(Debug)]
pub(crate) struct DecoderState {
    pub(crate) read_offset: usize,
    pub(crate) tag: LearnedTag,
    pub(crate) next: Token,
    /// Size of the active length-delimited element; zero until known.
    pub(crate) payload_len: usize,
    /// Bytes left in the active packed run.
    pub(crate) run_remaining: usize,
    /// Whether the learned tag announced a packed run.
    pub(crate) packed: bool,
    pub(crate) emitted: u64,
    pub(crate) terminated: bool,
}

impl DecoderState {
    pub(crate) fn new() -> Self {
        Self {
            read_offset: 0,
            tag: LearnedTag::default(),
            next: Token::Tag,
            payload_len: 0,
            run_remaining: 0,
            packed: false,
            emitted: 0,
            terminated: false,
        }
    }

    /// Drop all in-progress token state. No further elements are produced.
    pub(crate) fn terminate(&mut self) {
        self.terminated = true;
        self.read_offset = 0;
        self.payload_len = 0;
        self.run_remaining = 0;
        self.next = Token::Tag;
    }
}
