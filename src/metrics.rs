//! Metric helpers for `brokerwire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature every helper compiles to a no-op.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking active connections.
pub const CONNECTIONS_ACTIVE: &str = "brokerwire_connections_active";
/// Name of the counter tracking processed frames.
pub const FRAMES_PROCESSED: &str = "brokerwire_frames_processed_total";
/// Name of the counter tracking error occurrences.
pub const ERRORS_TOTAL: &str = "brokerwire_errors_total";
/// Name of the counter tracking panics in connection tasks.
pub const CONNECTION_PANICS: &str = "brokerwire_connection_panics_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Request frames received from a client.
    Inbound,
    /// Response frames sent to a client.
    Outbound,
}

impl Direction {
    /// Label value recorded for this direction.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Increment the active connections gauge.
pub fn inc_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).increment(1.0);
}

/// Decrement the active connections gauge.
pub fn dec_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).decrement(1.0);
}

/// Record a processed frame for the given direction.
pub fn inc_frames(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_PROCESSED, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record an error occurrence, labelled with a short error kind such as
/// `"malformed_header"` or `"truncated_frame"`.
pub fn inc_errors(kind: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_TOTAL, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record a panic caught in a connection task.
pub fn inc_connection_panics() {
    #[cfg(feature = "metrics")]
    counter!(CONNECTION_PANICS).increment(1);
}

/// Guard that holds one unit of the active connections gauge.
///
/// The gauge is incremented on creation and decremented on drop, so the
/// count stays balanced even when a connection task unwinds.
#[derive(Debug)]
pub struct ConnectionGauge(());

impl ConnectionGauge {
    /// Increment the gauge and return the guard.
    #[must_use]
    pub fn acquire() -> Self {
        inc_connections();
        Self(())
    }
}

impl Drop for ConnectionGauge {
    fn drop(&mut self) { dec_connections(); }
}
