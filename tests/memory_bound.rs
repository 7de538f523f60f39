//! A long stream never buffers more than the element in progress.

use std::sync::Arc;

use pbstream::{PushDecoder, RepeatedFieldDecoder, schema::Schema};
use pbstream_testing::{POINTS_TYPE, STREAM_FIELD, point, point_schema, wire::length_delimited_items};
use rstest::rstest;

const POINTS: i32 = 10_000;
/// Largest framed point: tag, length, and two ten-byte negative varints
/// with their tags.
const MAX_FRAMED_POINT: usize = 2 + 2 * (1 + 10);

#[rstest]
#[case::small_chunks(7)]
#[case::socket_sized(4096)]
fn buffer_stays_within_one_element(point_schema: Arc<Schema>, #[case] chunk_size: usize) {
    let bytes = length_delimited_items(
        STREAM_FIELD,
        (0..POINTS).map(|i| point(i, if i % 2 == 0 { -i } else { i })),
    );
    let decoder = RepeatedFieldDecoder::new(point_schema, POINTS_TYPE).expect("streamable");
    let mut push = PushDecoder::new(decoder);

    let mut emitted = 0;
    let mut peak = 0;
    for chunk in bytes.chunks(chunk_size) {
        for item in push.push(chunk) {
            item.expect("decode");
            emitted += 1;
        }
        peak = peak.max(push.buffered());
    }
    assert_eq!(push.finish().count(), 0);

    assert_eq!(emitted, POINTS);
    assert!(
        peak < MAX_FRAMED_POINT,
        "buffered {peak} bytes between chunks"
    );
    assert_eq!(push.decoder().elements_emitted(), 10_000);
}
