//! # Mobisense Core
//!
//! Core types, errors, and configuration for the mobisense
//! feature-extraction pipeline.
//!
//! This crate provides the foundational building blocks used throughout
//! the mobisense workspace:
//!
//! - **Event Types**: [`WifiObservation`], [`CellObservation`], [`GpsFix`],
//!   and [`AccelSample`] for the raw, already-timestamped sensor readings
//!   handed in by the collector layer.
//!
//! - **Output Types**: [`FeatureRow`], [`FeatureMatrix`], and
//!   [`MovementReport`] consumed by the downstream classifier and logger.
//!
//! - **Error Types**: the [`error`] module's [`CoreError`] taxonomy —
//!   only structural schema violations are fatal; degenerate windows and
//!   numerical edge cases degrade to documented sentinels.
//!
//! - **Configuration**: the [`config`] module's load-time feature-set
//!   table, window geometry constants, and fixed header generation.
//!
//! ## Example
//!
//! ```rust
//! use mobisense_core::config::{default_feature_sets, default_header};
//!
//! let sets = default_feature_sets();
//! let header = default_header();
//! assert!(header.len() > sets.len());
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod geo;
pub mod types;

pub use config::{
    default_feature_sets, default_header, FeatureSet, ProcessKind, SensorKind, SENTINEL,
};
pub use error::{CoreError, CoreResult};
pub use types::{
    AccelSample, CellObservation, FeatureMatrix, FeatureRow, GpsFix, InertialGrid,
    MovementReport, WifiObservation,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
///
/// ```rust
/// use mobisense_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{
        default_feature_sets, default_header, FeatureSet, ProcessKind, SensorKind, SENTINEL,
    };
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{
        AccelSample, CellObservation, FeatureMatrix, FeatureRow, GpsFix, InertialGrid,
        MovementReport, WifiObservation,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_valid() {
        assert!(!VERSION.is_empty());
    }
}
