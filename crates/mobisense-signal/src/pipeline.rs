//! Per-feature-set IMU processing entry point.
//!
//! Conditions an inertial grid into scalar series (magnitude plus
//! optional per-axis series), runs the enabled feature families per
//! window, and publishes one [`FeatureRow`] per window under
//! `{set}_{axis}_{stat}` keys. Every row of a feature set carries the
//! same key set; windows that cannot be computed carry NaN values and
//! are zero-filled later by the assembler.

use num_traits::Float;

use mobisense_core::config::{FeatureSet, IMU_SAMPLE_RATE_HZ, SPECTRAL_STATS, TIME_DOMAIN_STATS};
use mobisense_core::error::CoreResult;
use mobisense_core::types::{FeatureRow, InertialGrid};

use crate::features::{welch_psd, SpectralFeatures, TimeDomainFeatures};
use crate::inertial;

/// Processes one feature set over an inertial grid.
///
/// `rotation` and `gravity` are aligned support grids, required only by
/// the `Rotate` and `Horizontal`/`Vertical` process kinds respectively.
///
/// # Errors
///
/// Propagates configuration and structural errors from
/// [`FeatureSet::validate`] and [`inertial::condition`]; per-window
/// irregularities degrade to NaN rows instead of erroring.
pub fn process_imu<F: Float>(
    set: &FeatureSet,
    raw: &InertialGrid<F>,
    rotation: Option<&InertialGrid<F>>,
    gravity: Option<&InertialGrid<F>>,
) -> CoreResult<Vec<FeatureRow>> {
    set.validate()?;

    let magnitude = inertial::condition(set, raw, rotation, gravity)?;
    let window_count = magnitude.len();

    // Axis label -> scalar series per window, in publication order.
    let mut series_by_axis: Vec<(&'static str, Vec<Vec<F>>)> = vec![("m", magnitude)];
    for (axis_idx, label) in ["x", "y", "z"].into_iter().enumerate() {
        if set.axis_labels().contains(&label) {
            series_by_axis.push((label, inertial::axis_series(raw, axis_idx)));
        }
    }

    let mut rows = Vec::with_capacity(window_count);
    for w in 0..window_count {
        let mut row = FeatureRow::new();
        for (axis, series) in &series_by_axis {
            let window: Vec<f64> = series
                .get(w)
                .map(|s| s.iter().map(|v| v.to_f64().unwrap_or(f64::NAN)).collect())
                .unwrap_or_default();
            publish_window(set, axis, &window, &mut row);
        }
        rows.push(row);
    }

    debug_assert!(
        rows.windows(2).all(|pair| pair[0].len() == pair[1].len()),
        "all rows of a feature set share one key set"
    );
    Ok(rows)
}

/// Runs the enabled feature families on one window series and inserts
/// the results under `{set}_{axis}_{stat}` keys.
fn publish_window(set: &FeatureSet, axis: &str, window: &[f64], row: &mut FeatureRow) {
    if set.time_domain {
        let features = TimeDomainFeatures::from_series(window);
        for (stat, value) in TIME_DOMAIN_STATS.iter().zip(features.values()) {
            row.insert(feature_key(&set.name, axis, stat), value);
        }
    }
    if set.spectral {
        let psd = welch_psd(window, IMU_SAMPLE_RATE_HZ);
        let features = SpectralFeatures::from_psd(&psd);
        for (stat, value) in SPECTRAL_STATS.iter().zip(features.values()) {
            row.insert(feature_key(&set.name, axis, stat), value);
        }
    }
}

/// Published key for one (feature set, axis, statistic) combination.
#[must_use]
pub fn feature_key(set_name: &str, axis: &str, stat: &str) -> String {
    format!("{set_name}_{axis}_{stat}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobisense_core::config::SensorKind;

    fn sine_grid(windows: usize, samples: usize, freq: f64) -> InertialGrid<f64> {
        (0..windows)
            .map(|_| {
                (0..samples)
                    .map(|i| {
                        let t = i as f64 / IMU_SAMPLE_RATE_HZ;
                        let v = (2.0 * std::f64::consts::PI * freq * t).sin();
                        vec![v, 0.0, 0.0]
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_row_per_window_with_stable_keys() {
        let set = FeatureSet {
            per_axis: true,
            ..FeatureSet::magnitude("acc", SensorKind::Accelerometer)
        };
        let raw = sine_grid(3, 100, 5.0);
        let rows = process_imu(&set, &raw, None, None).unwrap();

        assert_eq!(rows.len(), 3);
        let expected_keys = set.feature_keys();
        for row in &rows {
            assert_eq!(row.len(), expected_keys.len());
            for key in &expected_keys {
                assert!(row.contains_key(key), "missing {key}");
            }
        }
    }

    #[test]
    fn test_magnitude_only_set_has_no_axis_keys() {
        let set = FeatureSet::magnitude("grv", SensorKind::Gravity);
        let raw = sine_grid(1, 50, 2.0);
        let rows = process_imu(&set, &raw, None, None).unwrap();
        assert!(rows[0].contains_key("grv_m_mean"));
        assert!(!rows[0].contains_key("grv_x_mean"));
    }

    #[test]
    fn test_empty_window_yields_nan_row_not_gap() {
        let set = FeatureSet::magnitude("acc", SensorKind::Accelerometer);
        let mut raw = sine_grid(2, 50, 2.0);
        raw[1].clear();
        let rows = process_imu(&set, &raw, None, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0]["acc_m_mean"].is_finite());
        assert!(rows[1]["acc_m_mean"].is_nan());
    }

    #[test]
    fn test_jerk_set_publishes_magnitude_only() {
        let set = FeatureSet {
            jerk: true,
            per_axis: true,
            ..FeatureSet::magnitude("acc_jerk", SensorKind::Accelerometer)
        };
        let raw = sine_grid(1, 50, 2.0);
        let rows = process_imu(&set, &raw, None, None).unwrap();
        assert!(rows[0].contains_key("acc_jerk_m_mean"));
        assert!(!rows[0].contains_key("acc_jerk_x_mean"));
    }

    #[test]
    fn test_invalid_set_is_rejected() {
        let set = FeatureSet::magnitude("rot", SensorKind::RotationVector);
        let raw: InertialGrid<f64> = vec![vec![vec![0.0, 0.0, 0.0, 1.0]]];
        assert!(process_imu(&set, &raw, None, None).is_err());
    }
}
