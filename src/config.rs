//! Decoder limits.
//!
//! Protocol Buffers puts no upper bound on varint or element length, so a
//! corrupt stream could stall the decoder or make it buffer without limit.
//! [`DecoderConfig`] caps both.

use crate::varint::MAX_VARINT_LEN;

/// Minimum element length limit in bytes.
pub const MIN_ELEMENT_LENGTH: usize = 64;

/// Maximum element length limit in bytes (256 MiB).
pub const MAX_ELEMENT_LENGTH: usize = 256 * 1024 * 1024;

/// Default element length limit in bytes (16 MiB).
pub const DEFAULT_ELEMENT_LENGTH: usize = 16 * 1024 * 1024;

/// Limits applied by the frame decoder.
///
/// # Examples
///
/// ```
/// use pbstream::config::{DecoderConfig, MIN_ELEMENT_LENGTH};
///
/// let config = DecoderConfig::default().with_max_element_len(1);
/// assert_eq!(config.max_element_len(), MIN_ELEMENT_LENGTH);
/// assert_eq!(config.max_varint_len(), 10);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    max_varint_len: usize,
    max_element_len: usize,
}

impl DecoderConfig {
    /// Cap the length of tag, length and varint payload tokens.
    ///
    /// Clamped to `1..=10`. A token still unterminated after this many bytes
    /// fails as a malformed varint instead of waiting for more input.
    #[must_use]
    pub fn with_max_varint_len(mut self, len: usize) -> Self {
        self.max_varint_len = len.clamp(1, MAX_VARINT_LEN);
        self
    }

    /// Cap declared element and packed-run lengths.
    ///
    /// Clamped to [`MIN_ELEMENT_LENGTH`]`..=`[`MAX_ELEMENT_LENGTH`].
    #[must_use]
    pub fn with_max_element_len(mut self, len: usize) -> Self {
        self.max_element_len = len.clamp(MIN_ELEMENT_LENGTH, MAX_ELEMENT_LENGTH);
        self
    }

    #[must_use]
    pub fn max_varint_len(&self) -> usize { self.max_varint_len }

    #[must_use]
    pub fn max_element_len(&self) -> usize { self.max_element_len }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_varint_len: MAX_VARINT_LEN,
            max_element_len: DEFAULT_ELEMENT_LENGTH,
        }
    }
}
