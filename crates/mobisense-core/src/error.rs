//! Error types for the mobisense pipeline.
//!
//! Error handling follows a strict taxonomy: only structural violations of
//! the fixed feature schema are surfaced as errors. Degenerate windows
//! (too few samples for a statistic) resolve to documented sentinel values,
//! and numerical edge cases (zero-norm vectors, zero spectral energy) are
//! resolved by epsilon-floored denominators. Neither ever raises.
//!
//! # Example
//!
//! ```rust
//! use mobisense_core::error::CoreError;
//!
//! fn check_channels(actual: usize) -> Result<(), CoreError> {
//!     if actual != 3 {
//!         return Err(CoreError::channel_mismatch("accelerometer", 3, actual));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Top-level error type for the mobisense pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Malformed input at a call boundary (null/empty mandatory series).
    ///
    /// Fails fast for the call that received the data, but sibling
    /// windows and sensors continue to be processed.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what validation failed
        message: String,
    },

    /// Invalid configuration (bad window geometry, empty feature table).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
    },

    /// A sensor name that is not part of the fixed schema.
    #[error("Unknown sensor: '{name}'")]
    UnknownSensor {
        /// The unrecognized sensor name
        name: String,
    },

    /// Channel count of an inertial grid does not match the sensor.
    #[error("Channel mismatch for {sensor}: expected {expected}, got {actual}")]
    ChannelMismatch {
        /// Sensor whose grid was malformed
        sensor: &'static str,
        /// Channel count the sensor declares
        expected: usize,
        /// Channel count actually supplied
        actual: usize,
    },

    /// A processing mode requires an aligned support series that is absent.
    ///
    /// Frame rotation needs the quaternion grid; gravity-relative
    /// projection needs the gravity grid.
    #[error("Missing series for {sensor}: {series} is required")]
    MissingSeries {
        /// Sensor being conditioned
        sensor: &'static str,
        /// The absent support series
        series: &'static str,
    },
}

impl CoreError {
    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new unknown-sensor error.
    #[must_use]
    pub fn unknown_sensor(name: impl Into<String>) -> Self {
        Self::UnknownSensor { name: name.into() }
    }

    /// Creates a new channel-mismatch error.
    #[must_use]
    pub fn channel_mismatch(sensor: &'static str, expected: usize, actual: usize) -> Self {
        Self::ChannelMismatch {
            sensor,
            expected,
            actual,
        }
    }

    /// Creates a new missing-series error.
    #[must_use]
    pub fn missing_series(sensor: &'static str, series: &'static str) -> Self {
        Self::MissingSeries { sensor, series }
    }

    /// Returns `true` if the caller can skip the offending sensor and
    /// continue with the rest of the batch.
    ///
    /// Structural schema violations are unrecoverable: the downstream
    /// model has a fixed input shape, so a matrix assembled without the
    /// offending columns would be unusable anyway.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Validation { .. } => true,
            Self::Configuration { .. }
            | Self::UnknownSensor { .. }
            | Self::ChannelMismatch { .. }
            | Self::MissingSeries { .. } => false,
        }
    }
}
