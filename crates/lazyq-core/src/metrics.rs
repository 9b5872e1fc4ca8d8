//! Tracing hooks.
//!
//! Compiled to no-ops unless the `tracing` feature is on; subscribers are the
//! binary's business.

#[cfg(feature = "tracing")]
pub fn emit_span(event: &str, key_values: &[(&str, String)]) {
    let span = tracing::span!(tracing::Level::TRACE, "lazyq", event);
    let _entered = span.enter();
    for (k, v) in key_values {
        tracing::trace!(%event, %k, %v, "metric");
    }
}

#[cfg(not(feature = "tracing"))]
pub fn emit_span(_event: &str, _key_values: &[(&str, String)]) {}

/// Log that an operator materialized its input.
#[cfg(feature = "tracing")]
pub fn materialized(op: &'static str, rows: usize, buckets: Option<usize>) {
    match buckets {
        Some(b) => tracing::trace!(op, rows, buckets = b, "materialized"),
        None => tracing::trace!(op, rows, "materialized"),
    }
}

#[cfg(not(feature = "tracing"))]
pub fn materialized(_op: &'static str, _rows: usize, _buckets: Option<usize>) {}
