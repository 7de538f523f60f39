//! Helpers for feeding encoded streams to a decoder in pieces.

use pbstream::{PushDecoder, StreamError, Value, codec::ValueCodec};

/// Everything a decoder produced for one input.
#[derive(Debug)]
pub struct Decoded {
    /// Elements emitted before the stream ended or failed.
    pub values: Vec<Value>,
    /// The terminal error, if any.
    pub error: Option<StreamError>,
}

/// Split `bytes` into chunks of at most `size` bytes.
///
/// ```rust
/// use pbstream_testing::chunks_of;
///
/// assert_eq!(chunks_of(&[1, 2, 3], 2), vec![vec![1, 2], vec![3]]);
/// ```
#[must_use]
pub fn chunks_of(bytes: &[u8], size: usize) -> Vec<Vec<u8>> {
    bytes.chunks(size.max(1)).map(<[u8]>::to_vec).collect()
}

/// Split `bytes` at each offset in `cuts`. Offsets are sorted, deduplicated,
/// and clamped to the input length.
#[must_use]
pub fn split_at_offsets(bytes: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = cuts.iter().map(|&c| c.min(bytes.len())).collect();
    cuts.sort_unstable();
    cuts.dedup();
    let mut start = 0;
    let mut out = Vec::with_capacity(cuts.len() + 1);
    for cut in cuts {
        out.push(bytes[start..cut].to_vec());
        start = cut;
    }
    out.push(bytes[start..].to_vec());
    out
}

/// Push every chunk through `decoder`, then signal end-of-input.
///
/// Stops at the first error, as a consumer of the stream would.
pub fn decode_chunks<C, I, B>(decoder: &mut PushDecoder<C>, chunks: I) -> Decoded
where
    C: ValueCodec,
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut values = Vec::new();
    for chunk in chunks {
        for item in decoder.push(chunk.as_ref()) {
            match item {
                Ok(value) => values.push(value),
                Err(error) => {
                    return Decoded {
                        values,
                        error: Some(error),
                    };
                }
            }
        }
    }
    for item in decoder.finish() {
        match item {
            Ok(value) => values.push(value),
            Err(error) => {
                return Decoded {
                    values,
                    error: Some(error),
                };
            }
        }
    }
    Decoded {
        values,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_handles_duplicate_and_edge_offsets() {
        let parts = split_at_offsets(&[1, 2, 3, 4], &[3, 0, 3, 9]);
        assert_eq!(parts, vec![vec![], vec![1, 2, 3], vec![4], vec![]]);
    }
}
