//! Mobisense Signal Processing Library
//!
//! This crate turns the irregular multi-sensor streams captured on a
//! device (inertial windows, WiFi scans, cellular sightings, GPS fixes)
//! into the fixed-shape feature matrix consumed by the transportation
//! classifier, and estimates the distance travelled over a recording.
//!
//! # Features
//!
//! - **Window Aggregation**: access-point counts, cell-identity churn,
//!   and GPS segment speeds over fixed windows of the analysis span
//! - **Inertial Conditioning**: quaternion rotation, gravity
//!   projections, magnitude and jerk series, precision-generic
//! - **Feature Extraction**: time-domain statistics and Welch-PSD
//!   spectral statistics per window
//! - **Schema Assembly**: deterministic header order, NaN zero-fill,
//!   row replay for slow sources
//! - **Movement Estimation**: Kalman-filtered distance with a
//!   plausibility gate
//!
//! # Example
//!
//! ```rust,no_run
//! use mobisense_core::config::{default_feature_sets, default_header};
//! use mobisense_core::types::InertialGrid;
//! use mobisense_signal::{assemble, process_imu};
//!
//! let sets = default_feature_sets();
//! let acc: InertialGrid<f64> = vec![vec![vec![0.0, 0.0, 9.81]; 100]; 60];
//!
//! let rows = process_imu(&sets[0], &acc, None, None)?;
//! let matrix = assemble(&[("acc".to_string(), rows)], &default_header(), 60);
//! assert_eq!(matrix.shape().0, 60);
//! # Ok::<(), mobisense_core::CoreError>(())
//! ```

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod assemble;
pub mod features;
pub mod inertial;
pub mod movement;
pub mod pipeline;

// Re-export main types for convenience
pub use aggregate::{
    aggregate_access_points, aggregate_cell_churn, aggregate_gps_speed, WindowPlan,
};
pub use assemble::assemble;
pub use features::{welch_psd, SpectralFeatures, TimeDomainFeatures, WelchPsd};
pub use inertial::condition;
pub use movement::{estimate_distance, MovementEstimator, MovementEstimatorConfig};
pub use pipeline::process_imu;

pub use mobisense_core::error::{CoreError, CoreResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for signal processing operations
pub type Result<T> = CoreResult<T>;

/// Commonly used imports
pub mod prelude {
    pub use crate::aggregate::{
        aggregate_access_points, aggregate_cell_churn, aggregate_gps_speed, WindowPlan,
    };
    pub use crate::assemble::assemble;
    pub use crate::features::{SpectralFeatures, TimeDomainFeatures};
    pub use crate::movement::{estimate_distance, MovementEstimator, MovementEstimatorConfig};
    pub use crate::pipeline::process_imu;
    pub use mobisense_core::prelude::*;
}
