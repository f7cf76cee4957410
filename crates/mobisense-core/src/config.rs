//! Feature-set configuration and window geometry.
//!
//! The per-sensor configuration is a load-time table of tagged records:
//! each [`FeatureSet`] names a source sensor, a conditioning mode, and
//! which feature families to publish. The fixed header consumed by the
//! downstream model is generated deterministically from the same table,
//! so extractors and schema cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Full analysis span covered by one pipeline invocation, milliseconds.
pub const SPAN_MS: i64 = 60_000;

/// Inertial sub-window width, milliseconds (60 one-second slots per span).
pub const IMU_WINDOW_MS: i64 = 1_000;

/// Nominal inertial sampling rate, Hz.
pub const IMU_SAMPLE_RATE_HZ: f64 = 100.0;

/// GPS aggregation window width, milliseconds.
pub const GPS_WINDOW_MS: i64 = 5_000;

/// Cellular churn sub-window width, milliseconds.
pub const CELL_WINDOW_MS: i64 = 5_000;

/// WiFi access-point count window width, milliseconds.
pub const WIFI_WINDOW_MS: i64 = 60_000;

/// Sentinel published when a windowed statistic is not computable.
pub const SENTINEL: f64 = -1.0;

/// Time-domain statistic suffixes, in header order.
pub const TIME_DOMAIN_STATS: [&str; 10] = [
    "mean",
    "std",
    "max",
    "min",
    "mad",
    "iqr",
    "acorr_peak",
    "acorr_lag",
    "zcr",
    "fzc",
];

/// Spectral statistic suffixes, in header order.
pub const SPECTRAL_STATS: [&str; 5] = ["psd_max", "entropy", "centroid", "skew", "kurt"];

/// Feature keys published by the access-point aggregator.
pub const WIFI_KEYS: [&str; 1] = ["wifi_cnt"];

/// Feature keys published by the cellular churn aggregator.
pub const BTS_KEYS: [&str; 5] = [
    "bts_total",
    "bts_jerk_mean",
    "bts_jerk_std",
    "bts_jerk_min",
    "bts_jerk_max",
];

/// Feature keys published by the GPS speed aggregator.
pub const GPS_KEYS: [&str; 4] = [
    "gps_speed_min",
    "gps_speed_max",
    "gps_speed_mean",
    "gps_speed_std",
];

/// Inertial sensors known to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// 3-axis accelerometer, m/s²
    Accelerometer,
    /// 3-axis gyroscope, rad/s
    Gyroscope,
    /// 3-axis magnetometer, µT
    Magnetometer,
    /// 3-axis gravity estimate, m/s²
    Gravity,
    /// 3-axis gravity-compensated linear acceleration, m/s²
    LinearAcceleration,
    /// Barometric pressure, hPa (single channel)
    Pressure,
    /// Rotation quaternion `(qx, qy, qz, qw)`; support stream only
    RotationVector,
}

impl SensorKind {
    /// Channels per sample for this sensor.
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        match self {
            Self::Pressure => 1,
            Self::RotationVector => 4,
            _ => 3,
        }
    }

    /// Stable short name used as a feature-key prefix.
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Accelerometer => "acc",
            Self::Gyroscope => "gyr",
            Self::Magnetometer => "mag",
            Self::Gravity => "grv",
            Self::LinearAcceleration => "lin",
            Self::Pressure => "prs",
            Self::RotationVector => "rot",
        }
    }

    /// Parses a collector-supplied sensor name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownSensor`] for names outside the fixed
    /// schema; unknown sensors are unrecoverable by design.
    pub fn parse(name: &str) -> CoreResult<Self> {
        match name {
            "acc" | "accelerometer" => Ok(Self::Accelerometer),
            "gyr" | "gyroscope" => Ok(Self::Gyroscope),
            "mag" | "magnetometer" => Ok(Self::Magnetometer),
            "grv" | "gravity" => Ok(Self::Gravity),
            "lin" | "linear_acceleration" => Ok(Self::LinearAcceleration),
            "prs" | "pressure" => Ok(Self::Pressure),
            "rot" | "rotation_vector" => Ok(Self::RotationVector),
            other => Err(CoreError::unknown_sensor(other)),
        }
    }
}

/// Conditioning applied to an inertial window before feature extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    /// Plain 3-axis Euclidean magnitude (or pass-through for 1 channel)
    None,
    /// Rotate body-frame samples into the world frame, then magnitude
    Rotate,
    /// Magnitude of the component orthogonal to gravity
    Horizontal,
    /// Magnitude of the component along gravity
    Vertical,
}

/// One named feature-set configuration.
///
/// Drives which scalar series is fed to the feature extractor and under
/// what name prefix the outputs are published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Name-prefix for published feature keys
    pub name: String,

    /// Source sensor
    pub sensor: SensorKind,

    /// Conditioning mode
    pub process: ProcessKind,

    /// Publish per-axis series alongside the magnitude series
    pub per_axis: bool,

    /// Apply a first difference along the sample axis
    pub jerk: bool,

    /// Publish time-domain statistics
    pub time_domain: bool,

    /// Publish Welch-PSD spectral statistics
    pub spectral: bool,
}

impl FeatureSet {
    /// Creates a magnitude-only feature set with both feature families on.
    #[must_use]
    pub fn magnitude(name: &str, sensor: SensorKind) -> Self {
        Self {
            name: name.to_owned(),
            sensor,
            process: ProcessKind::None,
            per_axis: false,
            jerk: false,
            time_domain: true,
            spectral: true,
        }
    }

    /// Axis labels this set publishes, in header order.
    ///
    /// Always `"m"`; additionally `"x"/"y"/"z"` when per-axis extraction
    /// is enabled, the sensor has at least 2 channels, and jerk is off.
    #[must_use]
    pub fn axis_labels(&self) -> Vec<&'static str> {
        let mut labels = vec!["m"];
        if self.per_axis && self.sensor.channel_count() >= 2 && !self.jerk {
            labels.extend(["x", "y", "z"]);
        }
        labels
    }

    /// Statistic suffixes this set publishes, in header order.
    #[must_use]
    pub fn stat_suffixes(&self) -> Vec<&'static str> {
        let mut stats = Vec::new();
        if self.time_domain {
            stats.extend(TIME_DOMAIN_STATS);
        }
        if self.spectral {
            stats.extend(SPECTRAL_STATS);
        }
        stats
    }

    /// Feature keys this set publishes, in header order.
    #[must_use]
    pub fn feature_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for axis in self.axis_labels() {
            for stat in self.stat_suffixes() {
                keys.push(format!("{}_{}_{}", self.name, axis, stat));
            }
        }
        keys
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] when the rotation vector is
    /// used as a magnitude source (it is a support stream only), when
    /// `Rotate` is requested for a non-3-channel sensor, or when no
    /// feature family is enabled.
    pub fn validate(&self) -> CoreResult<()> {
        if self.sensor == SensorKind::RotationVector {
            return Err(CoreError::configuration(format!(
                "feature set '{}': rotation vector cannot be a magnitude source",
                self.name
            )));
        }
        if self.process != ProcessKind::None && self.sensor.channel_count() != 3 {
            return Err(CoreError::configuration(format!(
                "feature set '{}': {:?} requires a 3-channel sensor",
                self.name, self.process
            )));
        }
        if !self.time_domain && !self.spectral {
            return Err(CoreError::configuration(format!(
                "feature set '{}': no feature family enabled",
                self.name
            )));
        }
        Ok(())
    }
}

/// The default load-time feature-set table.
///
/// Raw magnitudes for every inertial sensor, world-frame rotated
/// acceleration, horizontal/vertical linear-acceleration projections,
/// and jerk variants for the two acceleration streams.
#[must_use]
pub fn default_feature_sets() -> Vec<FeatureSet> {
    let mut sets = vec![
        FeatureSet {
            per_axis: true,
            ..FeatureSet::magnitude("acc", SensorKind::Accelerometer)
        },
        FeatureSet {
            process: ProcessKind::Rotate,
            ..FeatureSet::magnitude("acc_w", SensorKind::Accelerometer)
        },
        FeatureSet {
            per_axis: true,
            ..FeatureSet::magnitude("gyr", SensorKind::Gyroscope)
        },
        FeatureSet {
            per_axis: true,
            ..FeatureSet::magnitude("mag", SensorKind::Magnetometer)
        },
        FeatureSet::magnitude("grv", SensorKind::Gravity),
        FeatureSet {
            per_axis: true,
            ..FeatureSet::magnitude("lin", SensorKind::LinearAcceleration)
        },
        FeatureSet {
            process: ProcessKind::Horizontal,
            ..FeatureSet::magnitude("lin_h", SensorKind::LinearAcceleration)
        },
        FeatureSet {
            process: ProcessKind::Vertical,
            ..FeatureSet::magnitude("lin_v", SensorKind::LinearAcceleration)
        },
        FeatureSet::magnitude("prs", SensorKind::Pressure),
        FeatureSet {
            jerk: true,
            ..FeatureSet::magnitude("acc_jerk", SensorKind::Accelerometer)
        },
        FeatureSet {
            jerk: true,
            ..FeatureSet::magnitude("lin_jerk", SensorKind::LinearAcceleration)
        },
    ];
    // Pressure has no meaningful spectral content at 1 Hz-scale variation.
    if let Some(prs) = sets.iter_mut().find(|s| s.name == "prs") {
        prs.spectral = false;
    }
    sets
}

/// Builds the fixed, ordered header for a feature-set table.
///
/// Inertial feature keys in table order, then the WiFi, cellular, and
/// GPS aggregate keys.
#[must_use]
pub fn header_for(sets: &[FeatureSet]) -> Vec<String> {
    let mut header = Vec::new();
    for set in sets {
        header.extend(set.feature_keys());
    }
    header.extend(WIFI_KEYS.iter().map(|s| (*s).to_owned()));
    header.extend(BTS_KEYS.iter().map(|s| (*s).to_owned()));
    header.extend(GPS_KEYS.iter().map(|s| (*s).to_owned()));
    header
}

/// The default fixed header consumed by the downstream model.
#[must_use]
pub fn default_header() -> Vec<String> {
    header_for(&default_feature_sets())
}
