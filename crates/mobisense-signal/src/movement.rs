//! Kalman-filtered distance estimation from raw accelerometer samples
//! with periodic GPS corrections.
//!
//! A 1-D filter integrates gravity-removed acceleration magnitude into
//! velocity and position. A zero-velocity pseudo-observation after
//! every sample keeps integration drift bounded, and every
//! `gps_interval`-th sample the position is pulled toward the
//! cumulative GPS track distance. The final estimate passes a
//! plausibility gate before it is reported.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mobisense_core::geo;
use mobisense_core::types::{AccelSample, GpsFix, MovementReport};

/// Tuning parameters for [`MovementEstimator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementEstimatorConfig {
    /// Low-pass coefficient for the running gravity estimate
    pub gravity_alpha: f64,

    /// Velocity variance added per predict step
    pub velocity_process_noise: f64,

    /// Position variance added per predict step, before the
    /// velocity-variance term
    pub position_process_noise: f64,

    /// Observation noise of the zero-velocity pseudo-measurement
    pub velocity_obs_noise: f64,

    /// Observation noise of the GPS distance measurement
    pub position_obs_noise: f64,

    /// GPS correction cadence, in inertial samples
    pub gps_interval: usize,

    /// Fixes with a worse reported accuracy are ignored, metres
    pub gps_accuracy_max_m: f64,

    /// GPS track steps shorter than this are treated as jitter, metres
    pub gps_min_step_m: f64,

    /// Estimates below this over non-zero elapsed time are implausible,
    /// metres
    pub min_distance_m: f64,

    /// Estimates implying a higher average speed are implausible, m/s
    pub max_avg_speed_mps: f64,
}

impl Default for MovementEstimatorConfig {
    fn default() -> Self {
        Self {
            gravity_alpha: 0.8,
            velocity_process_noise: 0.05,
            position_process_noise: 0.01,
            velocity_obs_noise: 0.5,
            position_obs_noise: 1.0,
            gps_interval: 100,
            gps_accuracy_max_m: 20.0,
            gps_min_step_m: 0.1,
            min_distance_m: 0.1,
            max_avg_speed_mps: 50.0,
        }
    }
}

impl MovementEstimatorConfig {
    /// Sets the gravity low-pass coefficient.
    #[must_use]
    pub fn with_gravity_alpha(mut self, alpha: f64) -> Self {
        self.gravity_alpha = alpha;
        self
    }

    /// Sets the GPS correction cadence in samples.
    #[must_use]
    pub fn with_gps_interval(mut self, interval: usize) -> Self {
        self.gps_interval = interval;
        self
    }

    /// Sets the maximum plausible average speed.
    #[must_use]
    pub fn with_max_avg_speed_mps(mut self, speed: f64) -> Self {
        self.max_avg_speed_mps = speed;
        self
    }
}

/// Scalar Kalman state tracked across the inertial stream.
#[derive(Debug, Clone, Copy, PartialEq)]
struct KalmanState {
    velocity: f64,
    position: f64,
    velocity_var: f64,
    position_var: f64,
    gravity: [f64; 3],
}

impl KalmanState {
    fn new() -> Self {
        Self {
            velocity: 0.0,
            position: 0.0,
            velocity_var: 0.0,
            position_var: 0.0,
            gravity: [0.0; 3],
        }
    }
}

/// Distance estimator over one closed recording.
#[derive(Debug, Clone, Default)]
pub struct MovementEstimator {
    config: MovementEstimatorConfig,
}

impl MovementEstimator {
    /// Creates an estimator with the given configuration.
    #[must_use]
    pub fn new(config: MovementEstimatorConfig) -> Self {
        Self { config }
    }

    /// Estimates the distance travelled over the recording.
    ///
    /// `imu` is the raw accelerometer stream in capture order; `gps` is
    /// the fix list for the same span. Fewer than two inertial samples
    /// yield a zero report without engaging the gate.
    #[must_use]
    pub fn estimate(&self, imu: &[AccelSample], gps: &[GpsFix]) -> MovementReport {
        let cfg = &self.config;

        if imu.len() < 2 {
            debug!(samples = imu.len(), "inertial stream too short to estimate");
            return report(0.0, 0.0, false);
        }

        let mut state = KalmanState::new();
        let mut prev_ts = imu[0].timestamp_ms;

        for (i, sample) in imu.iter().enumerate() {
            let raw = [sample.x, sample.y, sample.z];
            for axis in 0..3 {
                state.gravity[axis] =
                    cfg.gravity_alpha * state.gravity[axis] + (1.0 - cfg.gravity_alpha) * raw[axis];
            }
            let linear = [
                raw[0] - state.gravity[0],
                raw[1] - state.gravity[1],
                raw[2] - state.gravity[2],
            ];
            let accel = (linear[0] * linear[0] + linear[1] * linear[1] + linear[2] * linear[2])
                .sqrt();

            let dt = ((sample.timestamp_ms - prev_ts) as f64 / 1_000.0).max(0.0);
            prev_ts = sample.timestamp_ms;

            // Predict.
            state.velocity += accel * dt;
            state.position += state.velocity * dt;
            state.velocity_var += cfg.velocity_process_noise;
            state.position_var += cfg.position_process_noise + state.velocity_var * dt * dt;

            // Zero-velocity pseudo-observation after every sample.
            let kv = state.velocity_var / (state.velocity_var + cfg.velocity_obs_noise);
            state.velocity -= kv * state.velocity;
            state.velocity_var *= 1.0 - kv;

            if cfg.gps_interval > 0 && (i + 1) % cfg.gps_interval == 0 && !gps.is_empty() {
                let observed = self.gps_track_distance_m(gps, sample.timestamp_ms);
                let kp = state.position_var / (state.position_var + cfg.position_obs_noise);
                state.position += kp * (observed - state.position);
                state.position_var *= 1.0 - kp;
            }

            state.velocity = state.velocity.max(0.0);
            state.position = state.position.max(0.0);
        }

        let elapsed_s =
            (imu[imu.len() - 1].timestamp_ms - imu[0].timestamp_ms) as f64 / 1_000.0;
        self.gate(state.position, elapsed_s)
    }

    /// Cumulative GPS track distance up to `until_ms`, in metres.
    ///
    /// Fixes over the accuracy limit are skipped entirely; steps below
    /// the jitter threshold contribute nothing but still advance the
    /// reference fix.
    fn gps_track_distance_m(&self, gps: &[GpsFix], until_ms: i64) -> f64 {
        let cfg = &self.config;
        let mut total = 0.0;
        let mut prev: Option<&GpsFix> = None;
        for fix in gps
            .iter()
            .filter(|f| f.timestamp_ms <= until_ms && f.accuracy_m < cfg.gps_accuracy_max_m)
        {
            if let Some(p) = prev {
                let step = geo::fix_distance_m(p, fix);
                if step > cfg.gps_min_step_m {
                    total += step;
                }
            }
            prev = Some(fix);
        }
        total
    }

    /// Applies the plausibility gate to the raw position estimate.
    fn gate(&self, distance_m: f64, elapsed_s: f64) -> MovementReport {
        let cfg = &self.config;
        let avg_speed = if elapsed_s > 0.0 {
            distance_m / elapsed_s
        } else {
            0.0
        };

        let implausible = distance_m < 0.0
            || (elapsed_s > 0.0 && distance_m < cfg.min_distance_m)
            || avg_speed > cfg.max_avg_speed_mps;

        if implausible {
            warn!(
                distance_m,
                elapsed_s, avg_speed, "distance estimate failed plausibility gate"
            );
            return report(0.0, elapsed_s, true);
        }
        report(distance_m, elapsed_s, false)
    }
}

/// Estimates distance with the default configuration.
#[must_use]
pub fn estimate_distance(imu: &[AccelSample], gps: &[GpsFix]) -> MovementReport {
    MovementEstimator::default().estimate(imu, gps)
}

fn report(distance_m: f64, elapsed_s: f64, anomalous: bool) -> MovementReport {
    MovementReport {
        distance_m,
        elapsed_s,
        anomalous,
        generated_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f64 = 9.81;

    /// 100 Hz stream of `n` samples built from a per-index acceleration.
    fn stream(n: usize, f: impl Fn(usize) -> [f64; 3]) -> Vec<AccelSample> {
        (0..n)
            .map(|i| {
                let [x, y, z] = f(i);
                AccelSample::new(i as i64 * 10, x, y, z)
            })
            .collect()
    }

    #[test]
    fn test_short_stream_reports_zero_without_gate() {
        let report = estimate_distance(&[AccelSample::new(0, 0.0, 0.0, G)], &[]);
        assert!(report.distance_m.abs() < f64::EPSILON);
        assert!(!report.anomalous);
    }

    #[test]
    fn test_stationary_stream_is_gated_to_zero() {
        // Constant gravity-only input: the linear residual decays to zero
        // and the zero-velocity update keeps the filter at rest, so the
        // sub-threshold estimate trips the gate.
        let imu = stream(1_000, |_| [0.0, 0.0, G]);
        let report = estimate_distance(&imu, &[]);
        assert!(report.distance_m.abs() < f64::EPSILON);
        assert!(report.anomalous);
        assert!((report.elapsed_s - 9.99).abs() < 1e-9);
    }

    #[test]
    fn test_oscillating_acceleration_produces_plausible_distance() {
        // A 2 Hz oscillation on top of gravity mimics gait: the gravity
        // low-pass tracks the slow component, leaving a periodic linear
        // residual whose magnitude integrates into forward progress.
        let imu = stream(3_000, |i| {
            let t = i as f64 / 100.0;
            [3.0 * (2.0 * std::f64::consts::PI * 2.0 * t).sin(), 0.0, G]
        });
        let report = estimate_distance(&imu, &[]);
        assert!(!report.anomalous);
        assert!(report.distance_m > 0.1, "distance {}", report.distance_m);
        assert!(report.avg_speed_mps() < 50.0);
    }

    #[test]
    fn test_gps_correction_pulls_position_toward_track() {
        // Stationary IMU but a GPS track moving north ~111 m over 10 s.
        let imu = stream(1_000, |_| [0.0, 0.0, G]);
        let gps: Vec<GpsFix> = (0..10)
            .map(|i| GpsFix::new(i64::from(i) * 1_000, f64::from(i) * 0.000_1, 0.0, 5.0))
            .collect();
        let report = estimate_distance(&imu, &gps);
        assert!(!report.anomalous);
        assert!(report.distance_m > 10.0, "distance {}", report.distance_m);
    }

    #[test]
    fn test_inaccurate_fixes_are_ignored() {
        let imu = stream(1_000, |_| [0.0, 0.0, G]);
        let gps: Vec<GpsFix> = (0..10)
            .map(|i| GpsFix::new(i64::from(i) * 1_000, f64::from(i) * 0.000_1, 0.0, 50.0))
            .collect();
        let report = estimate_distance(&imu, &gps);
        // All fixes rejected on accuracy: behaves like the GPS-free case.
        assert!(report.distance_m.abs() < f64::EPSILON);
        assert!(report.anomalous);
    }

    #[test]
    fn test_excessive_speed_trips_gate() {
        // GPS track claiming ~11 km in 10 s.
        let imu = stream(1_000, |_| [0.0, 0.0, G]);
        let gps: Vec<GpsFix> = (0..10)
            .map(|i| GpsFix::new(i64::from(i) * 1_000, f64::from(i) * 0.01, 0.0, 5.0))
            .collect();
        let report = estimate_distance(&imu, &gps);
        assert!(report.anomalous);
        assert!(report.distance_m.abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_builder() {
        let cfg = MovementEstimatorConfig::default()
            .with_gps_interval(50)
            .with_max_avg_speed_mps(10.0);
        assert_eq!(cfg.gps_interval, 50);
        assert!((cfg.max_avg_speed_mps - 10.0).abs() < f64::EPSILON);
        assert!((cfg.gravity_alpha - 0.8).abs() < f64::EPSILON);
    }
}
