//! Minimal protobuf encoder for building test streams.
//!
//! The library only decodes, so fixtures are assembled by hand with
//! [`WireWriter`] or the whole-stream helpers below.

/// Wire type bits.
pub const VARINT: u8 = 0;
pub const FIXED64: u8 = 1;
pub const LENGTH_DELIMITED: u8 = 2;
pub const FIXED32: u8 = 5;

/// Append-only protobuf byte builder.
///
/// ```rust
/// use pbstream_testing::wire::{VARINT, WireWriter};
///
/// let bytes = WireWriter::new().tag(1, VARINT).varint(150).into_bytes();
/// assert_eq!(bytes, [0x08, 0x96, 0x01]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn varint(mut self, mut value: u64) -> Self {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return self;
            }
            self.buf.push(byte | 0x80);
        }
    }

    #[must_use]
    pub fn tag(self, field: u32, wire_type: u8) -> Self {
        self.varint((u64::from(field) << 3) | u64::from(wire_type))
    }

    #[must_use]
    pub fn fixed32(mut self, value: u32) -> Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    #[must_use]
    pub fn fixed64(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Length prefix followed by `bytes`.
    #[must_use]
    pub fn length_delimited(self, bytes: &[u8]) -> Self {
        let mut this = self.varint(bytes.len() as u64);
        this.buf.extend_from_slice(bytes);
        this
    }

    /// Raw bytes with no prefix.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize { self.buf.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> { self.buf }
}

/// Raw varint value of an `int32` (sign-extended to 64 bits).
#[must_use]
pub fn int32(value: i32) -> u64 { i64::from(value) as u64 }

/// Raw varint value of an `int64`.
#[must_use]
pub fn int64(value: i64) -> u64 { value as u64 }

/// Zig-zag encode an `sint32`.
#[must_use]
pub fn sint32(value: i32) -> u64 { u64::from(((value << 1) ^ (value >> 31)) as u32) }

/// Zig-zag encode an `sint64`.
#[must_use]
pub fn sint64(value: i64) -> u64 { ((value << 1) ^ (value >> 63)) as u64 }

/// Packed run of raw varints under `field`.
#[must_use]
pub fn packed_varints(field: u32, values: &[u64]) -> Vec<u8> {
    let run = values
        .iter()
        .fold(WireWriter::new(), |w, &v| w.varint(v))
        .into_bytes();
    WireWriter::new()
        .tag(field, LENGTH_DELIMITED)
        .length_delimited(&run)
        .into_bytes()
}

/// One tag per raw varint under `field`.
#[must_use]
pub fn unpacked_varints(field: u32, values: &[u64]) -> Vec<u8> {
    values
        .iter()
        .fold(WireWriter::new(), |w, &v| w.tag(field, VARINT).varint(v))
        .into_bytes()
}

/// Packed run of 32-bit fixed values under `field`.
#[must_use]
pub fn packed_fixed32(field: u32, values: &[u32]) -> Vec<u8> {
    let run = values
        .iter()
        .fold(WireWriter::new(), |w, &v| w.fixed32(v))
        .into_bytes();
    WireWriter::new()
        .tag(field, LENGTH_DELIMITED)
        .length_delimited(&run)
        .into_bytes()
}

/// One tag per 32-bit fixed value under `field`.
#[must_use]
pub fn unpacked_fixed32(field: u32, values: &[u32]) -> Vec<u8> {
    values
        .iter()
        .fold(WireWriter::new(), |w, &v| w.tag(field, FIXED32).fixed32(v))
        .into_bytes()
}

/// Packed run of 64-bit fixed values under `field`.
#[must_use]
pub fn packed_fixed64(field: u32, values: &[u64]) -> Vec<u8> {
    let run = values
        .iter()
        .fold(WireWriter::new(), |w, &v| w.fixed64(v))
        .into_bytes();
    WireWriter::new()
        .tag(field, LENGTH_DELIMITED)
        .length_delimited(&run)
        .into_bytes()
}

/// One tag per 64-bit fixed value under `field`.
#[must_use]
pub fn unpacked_fixed64(field: u32, values: &[u64]) -> Vec<u8> {
    values
        .iter()
        .fold(WireWriter::new(), |w, &v| w.tag(field, FIXED64).fixed64(v))
        .into_bytes()
}

/// One tag and length prefix per payload under `field`.
#[must_use]
pub fn length_delimited_items<I, B>(field: u32, items: I) -> Vec<u8>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    items
        .into_iter()
        .fold(WireWriter::new(), |w, item| {
            w.tag(field, LENGTH_DELIMITED).length_delimited(item.as_ref())
        })
        .into_bytes()
}
