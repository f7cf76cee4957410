//! Core data types for the mobisense pipeline.
//!
//! All events are closed, finite lists handed to the pipeline by the
//! collector layer; the pipeline never owns a live stream. Event
//! timestamps are plain epoch milliseconds because every windowing
//! operation is integer arithmetic over them. Produced artifacts carry a
//! wall-clock provenance stamp instead.
//!
//! # Type Categories
//!
//! - **Event Types**: [`WifiObservation`], [`CellObservation`], [`GpsFix`],
//!   [`AccelSample`]
//! - **Inertial Input**: [`InertialGrid`]
//! - **Output Types**: [`FeatureRow`], [`FeatureMatrix`], [`MovementReport`]

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder identifier used when the collector could not read a value.
pub const MISSING_ID: &str = "N/A";

/// One WiFi access-point sighting from a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiObservation {
    /// Capture time, epoch milliseconds
    pub timestamp_ms: i64,

    /// Access-point BSSID; [`MISSING_ID`] when the scan entry had none
    pub bssid: String,
}

impl WifiObservation {
    /// Creates a new observation.
    #[must_use]
    pub fn new(timestamp_ms: i64, bssid: impl Into<String>) -> Self {
        Self {
            timestamp_ms,
            bssid: bssid.into(),
        }
    }

    /// Creates an observation whose BSSID could not be read.
    #[must_use]
    pub fn missing(timestamp_ms: i64) -> Self {
        Self::new(timestamp_ms, MISSING_ID)
    }
}

/// One serving- or neighbour-cell sighting.
///
/// Missing identifiers default to `0` at the collector boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellObservation {
    /// Capture time, epoch milliseconds
    pub timestamp_ms: i64,

    /// Cell identity (CI)
    pub cell_id: i64,

    /// Physical cell identity (PCI)
    pub physical_cell_id: i64,
}

impl CellObservation {
    /// Creates a new cell observation.
    #[must_use]
    pub fn new(timestamp_ms: i64, cell_id: i64, physical_cell_id: i64) -> Self {
        Self {
            timestamp_ms,
            cell_id,
            physical_cell_id,
        }
    }

    /// The `(ci, pci)` identity pair used for churn computation.
    #[must_use]
    pub fn identity(&self) -> (i64, i64) {
        (self.cell_id, self.physical_cell_id)
    }
}

/// One GPS fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Fix time, epoch milliseconds
    pub timestamp_ms: i64,

    /// Latitude in degrees
    pub latitude_deg: f64,

    /// Longitude in degrees
    pub longitude_deg: f64,

    /// Reported horizontal accuracy in metres
    pub accuracy_m: f64,
}

impl GpsFix {
    /// Creates a new fix.
    #[must_use]
    pub fn new(timestamp_ms: i64, latitude_deg: f64, longitude_deg: f64, accuracy_m: f64) -> Self {
        Self {
            timestamp_ms,
            latitude_deg,
            longitude_deg,
            accuracy_m,
        }
    }
}

/// One raw 3-axis accelerometer sample for the movement estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    /// Capture time, epoch milliseconds
    pub timestamp_ms: i64,

    /// X-axis acceleration, m/s²
    pub x: f64,

    /// Y-axis acceleration, m/s²
    pub y: f64,

    /// Z-axis acceleration, m/s²
    pub z: f64,
}

impl AccelSample {
    /// Creates a new sample.
    #[must_use]
    pub fn new(timestamp_ms: i64, x: f64, y: f64, z: f64) -> Self {
        Self {
            timestamp_ms,
            x,
            y,
            z,
        }
    }
}

/// Inertial samples shaped `[windows][samples-per-window][channels]`.
///
/// This is the only inertial input shape the pipeline accepts: the
/// collector has already bucketed the raw sensor stream into one-second
/// windows at the nominal IMU rate. Individual windows may be short or
/// empty; the conditioner degrades those to NaN rather than rejecting
/// the whole grid.
pub type InertialGrid<F> = Vec<Vec<Vec<F>>>;

/// Mapping from feature name to scalar value, one per window per
/// feature set. Every row produced for a given feature set has the
/// same key set.
pub type FeatureRow = HashMap<String, f64>;

/// Rectangular `[windows x features]` numeric structure with a
/// deterministic column order.
///
/// Column order is exactly the header order; the downstream classifier
/// has a fixed input shape and relies on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    /// Ordered feature names, one per column
    pub header: Vec<String>,

    /// Row-major values, `rows[w][c]` is window `w`, column `c`
    pub rows: Vec<Vec<f64>>,

    /// When this matrix was assembled
    pub generated_at: DateTime<Utc>,
}

impl FeatureMatrix {
    /// Creates a matrix stamped with the current time.
    #[must_use]
    pub fn new(header: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            header,
            rows,
            generated_at: Utc::now(),
        }
    }

    /// `(windows, features)` shape.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.header.len())
    }

    /// Returns `true` if the matrix holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column index of a feature name, if present in the header.
    #[must_use]
    pub fn column_of(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Converts to a dense `ndarray` matrix.
    ///
    /// Rows shorter than the header are right-padded with `0.0`; the
    /// result always has the header's column count.
    #[must_use]
    pub fn to_array2(&self) -> Array2<f64> {
        let ncols = self.header.len();
        let mut out = Array2::zeros((self.rows.len(), ncols));
        for (i, row) in self.rows.iter().enumerate() {
            for (j, &v) in row.iter().take(ncols).enumerate() {
                out[[i, j]] = v;
            }
        }
        out
    }
}

/// Result of one movement-estimator run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementReport {
    /// Estimated distance travelled, metres. Zero when `anomalous`.
    pub distance_m: f64,

    /// Elapsed time covered by the inertial stream, seconds
    pub elapsed_s: f64,

    /// `true` when the raw estimate failed the plausibility gate and
    /// was zeroed
    pub anomalous: bool,

    /// When this report was produced
    pub generated_at: DateTime<Utc>,
}

impl MovementReport {
    /// Average speed implied by the report, m/s. Zero for zero elapsed time.
    #[must_use]
    pub fn avg_speed_mps(&self) -> f64 {
        if self.elapsed_s > 0.0 {
            self.distance_m / self.elapsed_s
        } else {
            0.0
        }
    }
}
