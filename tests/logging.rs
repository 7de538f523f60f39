//! Decoder diagnostics reach the `log` facade through `tracing`.

use log::Level;
use pbstream::{PushDecoder, RepeatedFieldDecoder, schema::ScalarType};
use pbstream_testing::{
    LoggerHandle,
    STREAM_FIELD,
    STREAM_TYPE,
    decode_chunks,
    logger,
    scalar_stream_schema,
    wire::unpacked_varints,
};
use rstest::rstest;

fn push_for(scalar: ScalarType, packed: Option<bool>) -> PushDecoder {
    let decoder = RepeatedFieldDecoder::new(scalar_stream_schema(scalar, packed), STREAM_TYPE)
        .expect("streamable");
    PushDecoder::new(decoder)
}

#[rstest]
fn terminal_error_is_logged_as_warning(mut logger: LoggerHandle) {
    logger.clear();
    let mut bytes = unpacked_varints(STREAM_FIELD, &[1]);
    bytes.extend(unpacked_varints(STREAM_FIELD + 4, &[1]));
    let decoded = decode_chunks(&mut push_for(ScalarType::Uint32, None), [bytes]);
    assert!(decoded.error.is_some());
    assert!(
        logger.drain_contains(Level::Warn, "expected 0x8, got 0x28"),
        "tag mismatch warning not logged"
    );
}

#[rstest]
fn clean_end_is_logged_at_debug(mut logger: LoggerHandle) {
    logger.clear();
    let bytes = unpacked_varints(STREAM_FIELD, &[3, 4]);
    let decoded = decode_chunks(&mut push_for(ScalarType::Uint64, None), [bytes]);
    assert!(decoded.error.is_none());
    assert!(
        logger.drain_contains(Level::Debug, "stream ended at element boundary"),
        "clean end not logged"
    );
}

#[rstest]
fn truncation_is_logged_with_the_open_token(mut logger: LoggerHandle) {
    logger.clear();
    let decoded = decode_chunks(
        &mut push_for(ScalarType::Fixed64, None),
        [vec![0x09u8, 0x01, 0x02]],
    );
    assert!(decoded.error.is_some_and(|e| e.is_truncation()));
    assert!(
        logger.drain_contains(Level::Warn, "inside payload token with 2 bytes buffered"),
        "truncation warning not logged"
    );
}
