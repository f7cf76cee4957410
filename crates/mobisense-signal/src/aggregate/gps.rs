//! GPS speed aggregation.
//!
//! For each 5 s window, computes pairwise Haversine speeds between
//! consecutive fixes inside the window and aggregates them to
//! min/max/mean/population-std in km/h.

use mobisense_core::config::{GPS_KEYS, GPS_WINDOW_MS, SENTINEL, SPAN_MS};
use mobisense_core::geo::segment_speed_kmh;
use mobisense_core::types::{FeatureRow, GpsFix};

use super::WindowPlan;

/// Buckets GPS fixes into 5 s windows over the span and emits one
/// [`FeatureRow`] per window with `gps_speed_min/max/mean/std`.
///
/// A window with fewer than 2 fixes has no pairwise speed; all four
/// statistics degrade to the documented `-1.0` sentinel.
#[must_use]
pub fn aggregate_gps_speed(fixes: &[GpsFix], start_ms: i64) -> Vec<FeatureRow> {
    let plan = WindowPlan::new(start_ms, GPS_WINDOW_MS, SPAN_MS);

    plan.bucket(fixes, |f| f.timestamp_ms)
        .into_iter()
        .map(|bucket| {
            let mut window: Vec<&GpsFix> = bucket;
            window.sort_by_key(|f| f.timestamp_ms);
            window_speed_row(&window)
        })
        .collect()
}

/// Speed statistics for one chronologically sorted window of fixes.
fn window_speed_row(window: &[&GpsFix]) -> FeatureRow {
    let speeds: Vec<f64> = window
        .windows(2)
        .filter_map(|pair| segment_speed_kmh(pair[0], pair[1]))
        .collect();

    let mut row = FeatureRow::new();
    if window.len() < 2 || speeds.is_empty() {
        for key in GPS_KEYS {
            row.insert(key.to_owned(), SENTINEL);
        }
        return row;
    }

    let n = speeds.len() as f64;
    let mean = speeds.iter().sum::<f64>() / n;
    let var = speeds.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let min = speeds.iter().copied().fold(f64::INFINITY, f64::min);
    let max = speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    row.insert(GPS_KEYS[0].to_owned(), min);
    row.insert(GPS_KEYS[1].to_owned(), max);
    row.insert(GPS_KEYS[2].to_owned(), mean);
    row.insert(GPS_KEYS[3].to_owned(), var.sqrt());
    row
}
