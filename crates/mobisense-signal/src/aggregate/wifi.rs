//! Access-point count aggregation.
//!
//! Counts distinct BSSIDs per window. Duplicate sightings of the same
//! BSSID within a window are counted once, so the aggregate is idempotent
//! under scan-list duplication.

use std::collections::HashSet;

use mobisense_core::config::{SPAN_MS, WIFI_KEYS, WIFI_WINDOW_MS};
use mobisense_core::types::{FeatureRow, WifiObservation};

use super::WindowPlan;

/// Buckets WiFi scans into fixed windows and emits one [`FeatureRow`]
/// per window with the distinct-BSSID count under `wifi_cnt`.
///
/// An empty window emits count `0`. Scans outside `[start, start + span)`
/// are discarded.
#[must_use]
pub fn aggregate_access_points(scans: &[WifiObservation], start_ms: i64) -> Vec<FeatureRow> {
    aggregate_with_plan(scans, WindowPlan::new(start_ms, WIFI_WINDOW_MS, SPAN_MS))
}

/// Plan-driven variant used when the caller owns the window geometry.
#[must_use]
pub fn aggregate_with_plan(scans: &[WifiObservation], plan: WindowPlan) -> Vec<FeatureRow> {
    plan.bucket(scans, |s| s.timestamp_ms)
        .into_iter()
        .map(|bucket| {
            let distinct: HashSet<&str> = bucket.iter().map(|s| s.bssid.as_str()).collect();
            let mut row = FeatureRow::new();
            row.insert(WIFI_KEYS[0].to_owned(), distinct.len() as f64);
            row
        })
        .collect()
}
