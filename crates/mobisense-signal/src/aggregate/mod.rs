//! Time-window bucketing and per-window aggregation for the
//! non-inertial event streams.
//!
//! Each aggregator partitions an unordered, finite event list into
//! fixed-width half-open windows `[start, start + width)` tiling a single
//! analysis span, then computes a source-specific per-window aggregate:
//!
//! - [`wifi::aggregate_access_points`] — distinct BSSID counts
//! - [`cellular::aggregate_cell_churn`] — `(ci, pci)` set churn
//! - [`gps::aggregate_gps_speed`] — pairwise Haversine speed statistics
//!
//! Windows are contiguous, non-overlapping, and always emitted in
//! chronological order; an empty window yields a placeholder aggregate,
//! never a gap.

pub mod cellular;
pub mod gps;
pub mod wifi;

pub use cellular::aggregate_cell_churn;
pub use gps::aggregate_gps_speed;
pub use wifi::aggregate_access_points;

/// Fixed-width window partition of a single analysis span.
///
/// Events exactly at a window's `start` belong to that window; events at
/// `start + width` belong to the next. Events outside
/// `[start, start + span)` are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    /// Span start, epoch milliseconds
    pub start_ms: i64,
    /// Window width, milliseconds
    pub width_ms: i64,
    /// Total span covered, milliseconds
    pub span_ms: i64,
}

impl WindowPlan {
    /// Creates a plan. `width_ms` and `span_ms` must be positive and the
    /// width must divide the span; callers supply compile-time geometry
    /// constants so this is a debug assertion rather than an error path.
    #[must_use]
    pub fn new(start_ms: i64, width_ms: i64, span_ms: i64) -> Self {
        debug_assert!(width_ms > 0 && span_ms > 0);
        debug_assert!(span_ms % width_ms == 0, "width must tile the span");
        Self {
            start_ms,
            width_ms,
            span_ms,
        }
    }

    /// Number of windows in the span.
    #[must_use]
    pub fn window_count(&self) -> usize {
        (self.span_ms / self.width_ms) as usize
    }

    /// Window index owning `timestamp_ms`, or `None` outside the span.
    #[must_use]
    pub fn index_of(&self, timestamp_ms: i64) -> Option<usize> {
        let offset = timestamp_ms - self.start_ms;
        if offset < 0 || offset >= self.span_ms {
            return None;
        }
        Some((offset / self.width_ms) as usize)
    }

    /// Half-open bounds `[start, end)` of window `index`, milliseconds.
    #[must_use]
    pub fn bounds_of(&self, index: usize) -> (i64, i64) {
        let start = self.start_ms + index as i64 * self.width_ms;
        (start, start + self.width_ms)
    }

    /// Partitions an unordered event slice into per-window buckets.
    ///
    /// Buckets are returned in chronological order; empty windows are
    /// present as empty buckets. Events outside the span are dropped.
    pub fn bucket<'a, T>(&self, events: &'a [T], timestamp_of: impl Fn(&T) -> i64) -> Vec<Vec<&'a T>> {
        let mut buckets: Vec<Vec<&T>> = vec![Vec::new(); self.window_count()];
        for event in events {
            if let Some(idx) = self.index_of(timestamp_of(event)) {
                buckets[idx].push(event);
            }
        }
        buckets
    }
}
