//! Test support for `pbstream`.
//!
//! Provides a tiny protobuf encoder for building input streams, schema
//! fixtures, chunking helpers for exercising split points, and a
//! serialised handle on the global `log` capture.
//!
//! ```rust
//! use pbstream_testing::wire::packed_varints;
//!
//! let bytes = packed_varints(1, &[1, 2]);
//! assert_eq!(bytes, [0x0a, 0x02, 0x01, 0x02]);
//! ```

pub mod chunks;
pub mod fixtures;
pub mod logging;
pub mod property;
pub mod wire;

pub use chunks::{Decoded, chunks_of, decode_chunks, split_at_offsets};
pub use fixtures::{POINTS_TYPE, STREAM_FIELD, STREAM_TYPE, point, point_schema, scalar_stream_schema};
pub use logging::{LoggerHandle, logger};
pub use property::deterministic_runner;
