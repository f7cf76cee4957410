//! Inertial signal conditioning.
//!
//! Transforms raw per-window inertial samples into the scalar magnitude
//! series consumed by the feature extractor, according to a feature set's
//! [`ProcessKind`]: plain magnitude, world-frame rotation, or
//! gravity-relative projection, optionally followed by a first difference
//! ("jerk") along the sample axis.
//!
//! The whole module is generic over the floating-point width `F`: the
//! same pipeline serves f32 and f64 grids. Structural irregularity in a
//! single window (short sample, wrong channel count) degrades that window
//! to all-NaN of the expected length; it never aborts the batch. Only a
//! wrong channel count for the entire grid is fatal.

use num_traits::Float;

use mobisense_core::config::{FeatureSet, ProcessKind};
use mobisense_core::error::{CoreError, CoreResult};
use mobisense_core::types::InertialGrid;

/// Rotation quaternions carry 4 components `(qx, qy, qz, qw)`.
const QUAT_CHANNELS: usize = 4;

/// Converts an f64 constant into the pipeline's float width.
///
/// Never fails for f32/f64, the only widths the pipeline instantiates.
fn c<F: Float>(x: f64) -> F {
    F::from(x).expect("constant representable in pipeline float width")
}

/// Conditions an inertial grid into one scalar series per window.
///
/// `rotation` and `gravity` must be window/sample aligned with `raw` when
/// the feature set's process requires them.
///
/// # Errors
///
/// - [`CoreError::Validation`] for an empty grid
/// - [`CoreError::ChannelMismatch`] when the grid's channel count does
///   not match the sensor
/// - [`CoreError::MissingSeries`] when `Rotate` lacks the quaternion grid
///   or `Horizontal`/`Vertical` lack the gravity grid
pub fn condition<F: Float>(
    set: &FeatureSet,
    raw: &InertialGrid<F>,
    rotation: Option<&InertialGrid<F>>,
    gravity: Option<&InertialGrid<F>>,
) -> CoreResult<Vec<Vec<F>>> {
    if raw.is_empty() {
        return Err(CoreError::validation(format!(
            "feature set '{}': empty inertial grid",
            set.name
        )));
    }

    let channels = set.sensor.channel_count();
    check_grid_channels(set.sensor.short_name(), raw, channels)?;

    match set.process {
        ProcessKind::Rotate => {
            if rotation.is_none() {
                return Err(CoreError::missing_series(
                    set.sensor.short_name(),
                    "rotation",
                ));
            }
        }
        ProcessKind::Horizontal | ProcessKind::Vertical => {
            if gravity.is_none() {
                return Err(CoreError::missing_series(
                    set.sensor.short_name(),
                    "gravity",
                ));
            }
        }
        ProcessKind::None => {}
    }

    let mut series: Vec<Vec<F>> = raw
        .iter()
        .enumerate()
        .map(|(w, window)| condition_window(set, w, window, rotation, gravity, channels))
        .collect();

    if set.jerk {
        for window in &mut series {
            *window = first_difference(window);
        }
    }

    Ok(series)
}

/// Extracts a single channel as one scalar series per window.
///
/// Samples missing the requested channel degrade to NaN.
pub fn axis_series<F: Float>(raw: &InertialGrid<F>, axis: usize) -> Vec<Vec<F>> {
    raw.iter()
        .map(|window| {
            window
                .iter()
                .map(|sample| sample.get(axis).copied().unwrap_or_else(F::nan))
                .collect()
        })
        .collect()
}

/// First difference `v[i+1] - v[i]` along the sample axis.
///
/// A window with fewer than 2 samples yields an empty series.
pub fn first_difference<F: Float>(window: &[F]) -> Vec<F> {
    if window.len() < 2 {
        return Vec::new();
    }
    window.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Rotates a body-frame vector into the world frame by a unit quaternion
/// `(qx, qy, qz, qw)`.
///
/// Uses the expanded sandwich product `v' = v + 2·q⃗ × (q⃗ × v + w·v)`,
/// which is exact for the identity quaternion.
pub fn rotate_by_quaternion<F: Float>(q: [F; 4], v: [F; 3]) -> [F; 3] {
    let [qx, qy, qz, qw] = q;
    let two = c::<F>(2.0);

    // t = q_vec x v + w * v
    let tx = qy * v[2] - qz * v[1] + qw * v[0];
    let ty = qz * v[0] - qx * v[2] + qw * v[1];
    let tz = qx * v[1] - qy * v[0] + qw * v[2];

    // v' = v + 2 * (q_vec x t)
    [
        v[0] + two * (qy * tz - qz * ty),
        v[1] + two * (qz * tx - qx * tz),
        v[2] + two * (qx * ty - qy * tx),
    ]
}

/// 3-axis Euclidean magnitude.
pub fn magnitude3<F: Float>(v: [F; 3]) -> F {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Angle between a vector and the gravity vector.
///
/// `acos(clamp(dot / (|g|·|v| + eps), -1, 1))` with the denominator
/// floored to `1e-6` so near-zero magnitudes never divide by zero.
fn gravity_angle<F: Float>(v: [F; 3], g: [F; 3]) -> F {
    let eps = c::<F>(1e-6);
    let dot = v[0] * g[0] + v[1] * g[1] + v[2] * g[2];
    let mut denom = magnitude3(v) * magnitude3(g) + eps;
    if denom < eps {
        denom = eps;
    }
    let cos = (dot / denom).max(-F::one()).min(F::one());
    cos.acos()
}

/// Whole-grid channel validation against the sensor's declared count.
///
/// Looks at the first populated sample; per-window deviations from it are
/// handled later by NaN degradation.
fn check_grid_channels<F: Float>(
    sensor: &'static str,
    raw: &InertialGrid<F>,
    expected: usize,
) -> CoreResult<()> {
    for window in raw {
        if let Some(sample) = window.first() {
            if sample.len() != expected {
                return Err(CoreError::channel_mismatch(sensor, expected, sample.len()));
            }
            return Ok(());
        }
    }
    // All windows empty: nothing to validate; extraction will degrade.
    Ok(())
}

/// Conditions one window; any structural irregularity inside it yields
/// all-NaN of the window's sample count.
fn condition_window<F: Float>(
    set: &FeatureSet,
    window_idx: usize,
    window: &[Vec<F>],
    rotation: Option<&InertialGrid<F>>,
    gravity: Option<&InertialGrid<F>>,
    channels: usize,
) -> Vec<F> {
    let n = window.len();
    let nan_window = |reason: &str| {
        tracing::debug!(
            set = %set.name,
            window = window_idx,
            reason,
            "degrading window to NaN"
        );
        vec![F::nan(); n]
    };

    // 1-channel sensors pass through unchanged regardless of process.
    if channels == 1 {
        let mut out = Vec::with_capacity(n);
        for sample in window {
            if sample.len() != 1 {
                return nan_window("channel mismatch");
            }
            out.push(sample[0]);
        }
        return out;
    }

    let mut out = Vec::with_capacity(n);
    for (i, sample) in window.iter().enumerate() {
        if sample.len() != channels {
            return nan_window("channel mismatch");
        }
        let v = [sample[0], sample[1], sample[2]];

        let value = match set.process {
            ProcessKind::None => magnitude3(v),
            ProcessKind::Rotate => {
                let Some(q) = aligned_quat(rotation, window_idx, i) else {
                    return nan_window("misaligned rotation window");
                };
                magnitude3(rotate_by_quaternion(q, v))
            }
            ProcessKind::Horizontal => {
                let Some(g) = aligned_vec3(gravity, window_idx, i) else {
                    return nan_window("misaligned gravity window");
                };
                magnitude3(v) * gravity_angle(v, g).cos()
            }
            ProcessKind::Vertical => {
                let Some(g) = aligned_vec3(gravity, window_idx, i) else {
                    return nan_window("misaligned gravity window");
                };
                magnitude3(v) * gravity_angle(v, g).sin()
            }
        };
        out.push(value);
    }
    out
}

/// Sample `i` of window `w` in an aligned 3-channel support grid.
fn aligned_vec3<F: Float>(grid: Option<&InertialGrid<F>>, w: usize, i: usize) -> Option<[F; 3]> {
    let sample = grid?.get(w)?.get(i)?;
    if sample.len() < 3 {
        return None;
    }
    Some([sample[0], sample[1], sample[2]])
}

/// Sample `i` of window `w` in an aligned quaternion support grid.
fn aligned_quat<F: Float>(grid: Option<&InertialGrid<F>>, w: usize, i: usize) -> Option<[F; 4]> {
    let sample = grid?.get(w)?.get(i)?;
    if sample.len() < QUAT_CHANNELS {
        return None;
    }
    Some([sample[0], sample[1], sample[2], sample[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobisense_core::config::SensorKind;

    fn acc_set(process: ProcessKind) -> FeatureSet {
        FeatureSet {
            process,
            ..FeatureSet::magnitude("acc", SensorKind::Accelerometer)
        }
    }

    fn grid(windows: &[&[[f64; 3]]]) -> InertialGrid<f64> {
        windows
            .iter()
            .map(|w| w.iter().map(|s| s.to_vec()).collect())
            .collect()
    }

    #[test]
    fn test_plain_magnitude() {
        let raw = grid(&[&[[3.0, 4.0, 0.0], [0.0, 0.0, 2.0]]]);
        let out = condition(&acc_set(ProcessKind::None), &raw, None, None).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0][0] - 5.0).abs() < 1e-12);
        assert!((out[0][1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_identity_quaternion_rotation_is_exact() {
        let v = [1.5, -2.5, 3.25];
        let rotated = rotate_by_quaternion([0.0, 0.0, 0.0, 1.0], v);
        // Exact, not approximate: no arithmetic may perturb the input.
        assert_eq!(rotated, v);
    }

    #[test]
    fn test_quarter_turn_about_z() {
        // 90 degrees about z maps x onto y.
        let half = std::f64::consts::FRAC_PI_4;
        let q = [0.0, 0.0, half.sin(), half.cos()];
        let rotated = rotate_by_quaternion(q, [1.0, 0.0, 0.0]);
        assert!(rotated[0].abs() < 1e-12);
        assert!((rotated[1] - 1.0).abs() < 1e-12);
        assert!(rotated[2].abs() < 1e-12);
    }

    #[test]
    fn test_rotate_requires_rotation_grid() {
        let raw = grid(&[&[[1.0, 0.0, 0.0]]]);
        let err = condition(&acc_set(ProcessKind::Rotate), &raw, None, None).unwrap_err();
        assert!(matches!(err, CoreError::MissingSeries { .. }));
    }

    #[test]
    fn test_rotate_preserves_magnitude() {
        let raw = grid(&[&[[1.0, 2.0, 2.0]]]);
        let half = std::f64::consts::FRAC_PI_6;
        let rot: InertialGrid<f64> = vec![vec![vec![half.sin(), 0.0, 0.0, half.cos()]]];
        let out = condition(&acc_set(ProcessKind::Rotate), &raw, Some(&rot), None).unwrap();
        assert!((out[0][0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_horizontal_vertical_split() {
        // v at 45 degrees to gravity: horizontal = vertical = |v|/sqrt(2)
        // under the published cos/sin convention.
        let set_h = FeatureSet {
            process: ProcessKind::Horizontal,
            ..FeatureSet::magnitude("lin_h", SensorKind::LinearAcceleration)
        };
        let set_v = FeatureSet {
            process: ProcessKind::Vertical,
            ..FeatureSet::magnitude("lin_v", SensorKind::LinearAcceleration)
        };
        let raw = grid(&[&[[1.0, 0.0, 1.0]]]);
        let gravity = grid(&[&[[0.0, 0.0, 9.81]]]);

        let h = condition(&set_h, &raw, None, Some(&gravity)).unwrap();
        let v = condition(&set_v, &raw, None, Some(&gravity)).unwrap();
        let mag = std::f64::consts::SQRT_2;
        assert!((h[0][0] - mag * (std::f64::consts::FRAC_PI_4).cos()).abs() < 1e-9);
        assert!((v[0][0] - mag * (std::f64::consts::FRAC_PI_4).sin()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_gravity_does_not_panic() {
        let set = FeatureSet {
            process: ProcessKind::Vertical,
            ..FeatureSet::magnitude("lin_v", SensorKind::LinearAcceleration)
        };
        let raw = grid(&[&[[1.0, 0.0, 0.0]]]);
        let gravity = grid(&[&[[0.0, 0.0, 0.0]]]);
        let out = condition(&set, &raw, None, Some(&gravity)).unwrap();
        assert!(out[0][0].is_finite());
    }

    #[test]
    fn test_jerk_shortens_window_by_one() {
        let set = FeatureSet {
            jerk: true,
            ..acc_set(ProcessKind::None)
        };
        let raw = grid(&[&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [4.0, 0.0, 0.0]]]);
        let out = condition(&set, &raw, None, None).unwrap();
        assert_eq!(out[0].len(), 2);
        assert!((out[0][0] - 1.0).abs() < 1e-12);
        assert!((out[0][1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_jerk_on_short_window_is_empty() {
        let set = FeatureSet {
            jerk: true,
            ..acc_set(ProcessKind::None)
        };
        let raw = grid(&[&[[1.0, 0.0, 0.0]]]);
        let out = condition(&set, &raw, None, None).unwrap();
        assert!(out[0].is_empty());
    }

    #[test]
    fn test_short_sample_degrades_single_window() {
        let mut raw = grid(&[&[[1.0, 0.0, 0.0]], &[[3.0, 4.0, 0.0]]]);
        raw[0][0].truncate(2); // structurally broken first window
        let out = condition(&acc_set(ProcessKind::None), &raw, None, None).unwrap();
        assert!(out[0][0].is_nan());
        assert!((out[1][0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_extra_channels_degrade_single_window() {
        // First window validates the grid; a later 4-channel window must
        // degrade to NaN, not be read on its first three components.
        let mut raw = grid(&[&[[3.0, 4.0, 0.0]], &[[1.0, 0.0, 0.0]]]);
        raw[1][0].push(0.5);
        let out = condition(&acc_set(ProcessKind::None), &raw, None, None).unwrap();
        assert!((out[0][0] - 5.0).abs() < 1e-12);
        assert!(out[1][0].is_nan());
    }

    #[test]
    fn test_pressure_extra_channel_degrades_window() {
        let set = FeatureSet {
            spectral: false,
            ..FeatureSet::magnitude("prs", SensorKind::Pressure)
        };
        let raw: InertialGrid<f64> = vec![vec![vec![1013.2]], vec![vec![1013.4, 0.0]]];
        let out = condition(&set, &raw, None, None).unwrap();
        assert!((out[0][0] - 1013.2).abs() < 1e-12);
        assert!(out[1][0].is_nan());
    }

    #[test]
    fn test_whole_grid_channel_mismatch_is_fatal() {
        let raw: InertialGrid<f64> = vec![vec![vec![1.0, 2.0, 3.0, 4.0]]];
        let err = condition(&acc_set(ProcessKind::None), &raw, None, None).unwrap_err();
        assert!(matches!(err, CoreError::ChannelMismatch { .. }));
    }

    #[test]
    fn test_empty_grid_is_invalid_input() {
        let raw: InertialGrid<f64> = Vec::new();
        let err = condition(&acc_set(ProcessKind::None), &raw, None, None).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn test_pressure_passes_through() {
        let set = FeatureSet {
            spectral: false,
            ..FeatureSet::magnitude("prs", SensorKind::Pressure)
        };
        let raw: InertialGrid<f64> = vec![vec![vec![1013.2], vec![1013.4]]];
        let out = condition(&set, &raw, None, None).unwrap();
        assert!((out[0][0] - 1013.2).abs() < 1e-12);
        assert!((out[0][1] - 1013.4).abs() < 1e-12);
    }

    #[test]
    fn test_f32_instantiation() {
        let raw: InertialGrid<f32> = vec![vec![vec![3.0_f32, 4.0, 0.0]]];
        let out = condition(&acc_set(ProcessKind::None), &raw, None, None).unwrap();
        assert!((out[0][0] - 5.0_f32).abs() < 1e-6);
    }

    #[test]
    fn test_axis_series_extraction() {
        let raw = grid(&[&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]]);
        let ys = axis_series(&raw, 1);
        assert_eq!(ys[0], vec![2.0, 5.0]);
    }
}
