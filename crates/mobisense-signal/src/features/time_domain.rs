//! Time-domain statistics for one window series.

use serde::{Deserialize, Serialize};

use mobisense_core::config::TIME_DOMAIN_STATS;

/// Time-domain features of a scalar series.
///
/// Field order matches [`TIME_DOMAIN_STATS`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDomainFeatures {
    /// Arithmetic mean
    pub mean: f64,

    /// Population standard deviation
    pub std: f64,

    /// Maximum value
    pub max: f64,

    /// Minimum value
    pub min: f64,

    /// Median absolute deviation: median of `|x_i - median(x)|`
    pub mad: f64,

    /// Interquartile range via nearest-index slicing on a sorted copy:
    /// `x[3n/4] - x[n/4]` with floored indices. Not a true interpolated
    /// quantile; the bin selection is part of the published schema.
    pub iqr: f64,

    /// Peak of the unbiased autocorrelation
    /// `sum(x_i * x_{i+lag}) / (n - lag)` over lags `0..n`
    pub acorr_peak: f64,

    /// Lag index of the autocorrelation peak, published as a float
    pub acorr_lag: f64,

    /// Zero-crossing rate: fraction of consecutive pairs that change
    /// sign, with `0` treated as non-negative
    pub zcr: f64,

    /// Index of the first sample whose sign differs from its
    /// predecessor; `0` when the series never crosses
    pub first_zero_cross: f64,
}

impl TimeDomainFeatures {
    /// Extracts features from one window series.
    ///
    /// An empty series, or one containing non-finite values, yields
    /// all-NaN features.
    #[must_use]
    pub fn from_series(x: &[f64]) -> Self {
        if x.is_empty() || x.iter().any(|v| !v.is_finite()) {
            return Self::nan();
        }

        let n = x.len();
        let nf = n as f64;

        let mean = x.iter().sum::<f64>() / nf;
        let var = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / nf;
        let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = x.iter().copied().fold(f64::INFINITY, f64::min);

        let mut sorted = x.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite values are orderable"));
        let med = median_sorted(&sorted);

        let mut abs_dev: Vec<f64> = x.iter().map(|v| (v - med).abs()).collect();
        abs_dev.sort_by(|a, b| a.partial_cmp(b).expect("finite values are orderable"));
        let mad = median_sorted(&abs_dev);

        let iqr = sorted[3 * n / 4] - sorted[n / 4];

        let (acorr_peak, acorr_lag) = autocorrelation_peak(x);

        let crossings = sign_changes(x);
        let zcr = if n >= 2 {
            crossings as f64 / (n - 1) as f64
        } else {
            0.0
        };
        let first_zero_cross = first_sign_change(x).map_or(0.0, |i| i as f64);

        Self {
            mean,
            std: var.sqrt(),
            max,
            min,
            mad,
            iqr,
            acorr_peak,
            acorr_lag,
            zcr,
            first_zero_cross,
        }
    }

    /// All-NaN features for a window that cannot be computed.
    #[must_use]
    pub fn nan() -> Self {
        Self {
            mean: f64::NAN,
            std: f64::NAN,
            max: f64::NAN,
            min: f64::NAN,
            mad: f64::NAN,
            iqr: f64::NAN,
            acorr_peak: f64::NAN,
            acorr_lag: f64::NAN,
            zcr: f64::NAN,
            first_zero_cross: f64::NAN,
        }
    }

    /// Values in [`TIME_DOMAIN_STATS`] order.
    #[must_use]
    pub fn values(&self) -> [f64; TIME_DOMAIN_STATS.len()] {
        [
            self.mean,
            self.std,
            self.max,
            self.min,
            self.mad,
            self.iqr,
            self.acorr_peak,
            self.acorr_lag,
            self.zcr,
            self.first_zero_cross,
        ]
    }
}

/// Median of an already sorted, non-empty slice.
fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Unbiased autocorrelation peak over lags `0..n`.
///
/// `r(lag) = sum(x_i * x_{i+lag}) / (n - lag)`. Lag 0 is the energy
/// term, but the shrinking `(n - lag)` denominator means it does not
/// always win the search; ties resolve to the smallest lag.
fn autocorrelation_peak(x: &[f64]) -> (f64, f64) {
    let n = x.len();
    let mut peak = f64::NEG_INFINITY;
    let mut peak_lag = 0usize;
    for lag in 0..n {
        let r = (0..n - lag).map(|i| x[i] * x[i + lag]).sum::<f64>() / (n - lag) as f64;
        if r > peak {
            peak = r;
            peak_lag = lag;
        }
    }
    (peak, peak_lag as f64)
}

/// Count of sign changes between consecutive samples, `0` non-negative.
fn sign_changes(x: &[f64]) -> usize {
    x.windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count()
}

/// Index of the first sample whose sign differs from its predecessor.
fn first_sign_change(x: &[f64]) -> Option<usize> {
    x.windows(2)
        .position(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_statistics() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let f = TimeDomainFeatures::from_series(&x);
        assert!((f.mean - 2.5).abs() < 1e-12);
        assert!((f.max - 4.0).abs() < 1e-12);
        assert!((f.min - 1.0).abs() < 1e-12);
        // Population std of 1..4 is sqrt(1.25).
        assert!((f.std - 1.25_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mad_of_symmetric_series() {
        // median = 3, |x - 3| = [2, 1, 0, 1, 2], MAD = 1.
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let f = TimeDomainFeatures::from_series(&x);
        assert!((f.mad - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_even_length_median_averages_middle_pair() {
        // median(1..4) = 2.5; |x - 2.5| sorted = [0.5, 0.5, 1.5, 1.5],
        // so the MAD is (0.5 + 1.5) / 2 = 1.
        let x = [4.0, 1.0, 3.0, 2.0];
        let f = TimeDomainFeatures::from_series(&x);
        assert!((f.mad - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_iqr_uses_floored_bin_indices() {
        // n = 8: iqr = sorted[6] - sorted[2].
        let x = [8.0, 1.0, 6.0, 3.0, 5.0, 4.0, 7.0, 2.0];
        let f = TimeDomainFeatures::from_series(&x);
        assert!((f.iqr - (7.0 - 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_crossing_rate_zero_is_nonnegative() {
        // Signs: + + - +  => changes at two of three pairs.
        let x = [0.0, 1.0, -1.0, 1.0];
        let f = TimeDomainFeatures::from_series(&x);
        assert!((f.zcr - 2.0 / 3.0).abs() < 1e-12);
        assert!((f.first_zero_cross - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_crossing_reports_zero_index() {
        let x = [1.0, 2.0, 3.0];
        let f = TimeDomainFeatures::from_series(&x);
        assert!(f.zcr.abs() < 1e-12);
        assert!(f.first_zero_cross.abs() < 1e-12);
    }

    #[test]
    fn test_autocorrelation_peak_at_lag_zero() {
        // r(0) = 18/3 = 6 dominates r(1) = 2.5 and r(2) = 4.
        let x = [4.0, 1.0, 1.0];
        let f = TimeDomainFeatures::from_series(&x);
        assert!((f.acorr_peak - 6.0).abs() < 1e-12);
        assert!(f.acorr_lag.abs() < 1e-12);
    }

    #[test]
    fn test_unbiased_normalization_can_move_peak_off_lag_zero() {
        // r(0) = 18/4 = 4.5 but r(3) = 9/1 = 9: the shrinking
        // denominator lets an end-aligned lag win.
        let x = [3.0, 0.0, 0.0, 3.0];
        let f = TimeDomainFeatures::from_series(&x);
        assert!((f.acorr_peak - 9.0).abs() < 1e-12);
        assert!((f.acorr_lag - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_and_nan_series_degrade() {
        assert!(TimeDomainFeatures::from_series(&[]).mean.is_nan());
        let with_nan = [1.0, f64::NAN, 2.0];
        assert!(TimeDomainFeatures::from_series(&with_nan).std.is_nan());
    }

    #[test]
    fn test_values_order_matches_schema() {
        let x = [1.0, -2.0, 3.0];
        let f = TimeDomainFeatures::from_series(&x);
        let values = f.values();
        assert_eq!(values.len(), TIME_DOMAIN_STATS.len());
        assert!((values[0] - f.mean).abs() < f64::EPSILON);
        assert!((values[9] - f.first_zero_cross).abs() < f64::EPSILON);
    }
}
