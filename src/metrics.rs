//! Metric helpers for `pbstream`.
//!
//! This module defines metric names and simple helper functions wrapping
//! the [`metrics`](https://docs.rs/metrics) crate. Without the `metrics`
//! feature the helpers compile to nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking emitted elements.
pub const ELEMENTS_DECODED: &str = "pbstream_elements_decoded_total";
/// Name of the counter tracking terminal decode errors.
pub const ERRORS_TOTAL: &str = "pbstream_errors_total";

/// Record an emitted element.
pub fn inc_elements() {
    #[cfg(feature = "metrics")]
    counter!(ELEMENTS_DECODED).increment(1);
}

/// Record a terminal error of the given category.
pub fn inc_errors(kind: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_TOTAL, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}
