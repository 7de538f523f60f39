//! Base-128 varint primitives.
//!
//! Protocol Buffers encode tags, lengths and most integer scalars as
//! little-endian base-128 varints: each byte carries seven payload bits and
//! the high bit flags that another byte follows.
//!
//! Two decoders live here. [`decode_varint`] folds a complete span with
//! plain shifts and is meant for tag and length tokens, which are always
//! small. [`decode_varint_u64`] is the checked 64-bit reader used for scalar
//! payloads.

use thiserror::Error;

/// Longest varint needed to carry a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7f;

/// Failure while reading a complete varint span.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum VarintError {
    /// The span ended before a terminating byte.
    #[error("varint is missing its terminating byte")]
    Unterminated,
    /// The encoded value does not fit in 64 bits.
    #[error("varint overflows 64 bits")]
    Overflow,
}

/// Returns `true` if `byte` terminates a varint.
#[inline]
#[must_use]
pub const fn is_terminator(byte: u8) -> bool { byte & CONTINUATION == 0 }

/// Scan `buf` from `from` for the byte that terminates a varint.
///
/// Returns the length of the varint (terminator included) measured from the
/// start of `buf`, or `None` when every byte from `from` onwards carries the
/// continuation flag.
///
/// # Examples
///
/// ```
/// use pbstream::varint::find_terminator;
///
/// assert_eq!(find_terminator(&[0x96, 0x01, 0x08], 0), Some(2));
/// assert_eq!(find_terminator(&[0x96, 0x81], 0), None);
/// ```
#[must_use]
pub fn find_terminator(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .iter()
        .position(|&byte| is_terminator(byte))
        .map(|pos| from + pos + 1)
}

/// Decode a complete varint span by OR-ing each byte's low seven bits at
/// `7 * index`.
///
/// Bits that would land past bit 63 are dropped, so this is only suitable for
/// tag and length tokens. Callers bound the span length before calling.
///
/// # Examples
///
/// ```
/// use pbstream::varint::decode_varint;
///
/// assert_eq!(decode_varint(&[0x08]), 8);
/// assert_eq!(decode_varint(&[0xac, 0x02]), 300);
/// ```
#[must_use]
pub fn decode_varint(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(MAX_VARINT_LEN)
        .enumerate()
        .fold(0u64, |acc, (index, &byte)| {
            acc | (u64::from(byte & PAYLOAD_MASK) << (7 * index))
        })
}

/// Decode a varint from the front of `bytes`, returning the value and the
/// number of bytes consumed.
///
/// # Errors
///
/// Returns [`VarintError::Unterminated`] if no terminating byte is present
/// and [`VarintError::Overflow`] if the value exceeds 64 bits.
pub fn decode_varint_u64(bytes: &[u8]) -> Result<(u64, usize), VarintError> {
    let mut value = 0u64;
    for (index, &byte) in bytes.iter().enumerate() {
        if index == MAX_VARINT_LEN {
            return Err(VarintError::Overflow);
        }
        let bits = u64::from(byte & PAYLOAD_MASK);
        // The tenth byte may only contribute the single remaining bit.
        if index == MAX_VARINT_LEN - 1 && bits > 1 {
            return Err(VarintError::Overflow);
        }
        value |= bits << (7 * index);
        if is_terminator(byte) {
            return Ok((value, index + 1));
        }
    }
    Err(VarintError::Unterminated)
}

/// Undo zig-zag encoding for `sint32` values.
#[inline]
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    reason = "sint32 keeps its payload in the low 32 bits"
)]
pub const fn zigzag_decode_32(raw: u64) -> i32 {
    let raw = raw as u32;
    ((raw >> 1) as i32) ^ -((raw & 1) as i32)
}

/// Undo zig-zag encoding for `sint64` values.
#[inline]
#[must_use]
#[expect(clippy::cast_possible_wrap, reason = "zig-zag maps u64 onto i64")]
pub const fn zigzag_decode_64(raw: u64) -> i64 { ((raw >> 1) as i64) ^ -((raw & 1) as i64) }
