//! Cellular identity-churn ("jerk") aggregation.
//!
//! Buckets cell observations into 5 s sub-windows over the analysis span
//! and measures how much the set of visible `(ci, pci)` identity pairs
//! changes between consecutive non-empty sub-windows: jerk is the size of
//! the symmetric difference between the two sets. A phone moving past
//! base stations churns identities; a stationary one does not.

use std::collections::HashSet;

use mobisense_core::config::{BTS_KEYS, CELL_WINDOW_MS, SENTINEL, SPAN_MS};
use mobisense_core::types::{CellObservation, FeatureRow};

use super::WindowPlan;

/// Aggregates a span of cell observations into one [`FeatureRow`]:
/// `bts_total` (distinct pairs across the span) plus
/// `bts_jerk_mean/std/min/max` over the per-step jerk counts.
///
/// A span with fewer than 2 non-empty sub-windows cannot produce a
/// churn step; every derived statistic, `bts_total` included, degrades
/// to the documented `-1.0` sentinel.
#[must_use]
pub fn aggregate_cell_churn(cells: &[CellObservation], start_ms: i64) -> FeatureRow {
    let plan = WindowPlan::new(start_ms, CELL_WINDOW_MS, SPAN_MS);

    let window_sets: Vec<HashSet<(i64, i64)>> = plan
        .bucket(cells, |c| c.timestamp_ms)
        .into_iter()
        .map(|bucket| bucket.iter().map(|c| c.identity()).collect())
        .collect();

    let occupied: Vec<&HashSet<(i64, i64)>> =
        window_sets.iter().filter(|set| !set.is_empty()).collect();

    let mut row = FeatureRow::new();
    if occupied.len() < 2 {
        tracing::debug!(
            occupied = occupied.len(),
            "cell churn degenerate: fewer than 2 non-empty sub-windows"
        );
        for key in BTS_KEYS {
            row.insert(key.to_owned(), SENTINEL);
        }
        return row;
    }

    let jerks: Vec<f64> = occupied
        .windows(2)
        .map(|pair| pair[0].symmetric_difference(pair[1]).count() as f64)
        .collect();

    let total: HashSet<(i64, i64)> = occupied.iter().flat_map(|set| set.iter().copied()).collect();

    let n = jerks.len() as f64;
    let mean = jerks.iter().sum::<f64>() / n;
    let var = jerks.iter().map(|j| (j - mean).powi(2)).sum::<f64>() / n;
    let min = jerks.iter().copied().fold(f64::INFINITY, f64::min);
    let max = jerks.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    row.insert(BTS_KEYS[0].to_owned(), total.len() as f64);
    row.insert(BTS_KEYS[1].to_owned(), mean);
    row.insert(BTS_KEYS[2].to_owned(), var.sqrt());
    row.insert(BTS_KEYS[3].to_owned(), min);
    row.insert(BTS_KEYS[4].to_owned(), max);
    row
}
