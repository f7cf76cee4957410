//! Welch power-spectral-density estimation and derived spectral
//! statistics.
//!
//! Segments of `nperseg` samples with 50 % overlap are Hann-windowed,
//! zero-padded to the next power of two, transformed with `rustfft`, and
//! averaged into a one-sided PSD scaled by `2 / (fs * nperseg)`. The
//! default entry point uses the full window as the single segment.

use num_complex::Complex64;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use mobisense_core::config::SPECTRAL_STATS;

/// Floor applied to the PSD standard deviation before it is used as a
/// divisor for the standardized moments.
const STD_FLOOR: f64 = 1e-10;

/// One-sided Welch PSD with its frequency bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelchPsd {
    /// PSD values per one-sided frequency bin
    pub power: Vec<f64>,

    /// Bin frequencies in Hz
    pub frequencies: Vec<f64>,
}

impl WelchPsd {
    /// Bin index holding the most power, or `None` for an empty PSD.
    #[must_use]
    pub fn peak_bin(&self) -> Option<usize> {
        self.power
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
    }

    /// Width of one frequency bin in Hz.
    #[must_use]
    pub fn bin_width_hz(&self) -> f64 {
        match self.frequencies.as_slice() {
            [_, second, ..] => *second,
            _ => 0.0,
        }
    }
}

/// Welch PSD of one window series with `nperseg` = the full window
/// length.
#[must_use]
pub fn welch_psd(x: &[f64], fs: f64) -> WelchPsd {
    welch_psd_with(x, fs, x.len())
}

/// Welch PSD with an explicit segment length and 50 % overlap.
#[must_use]
pub fn welch_psd_with(x: &[f64], fs: f64, nperseg: usize) -> WelchPsd {
    if x.is_empty() || nperseg == 0 || nperseg > x.len() {
        return WelchPsd {
            power: Vec::new(),
            frequencies: Vec::new(),
        };
    }

    let nfft = nperseg.next_power_of_two();
    let n_bins = nfft / 2 + 1;
    let step = (nperseg / 2).max(1);
    let hann = hann_window(nperseg);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(nfft);

    let mut averaged = vec![0.0; n_bins];
    let mut segments = 0usize;
    let scale = 2.0 / (fs * nperseg as f64);

    let mut start = 0;
    while start + nperseg <= x.len() {
        let mut buffer: Vec<Complex64> = x[start..start + nperseg]
            .iter()
            .zip(hann.iter())
            .map(|(&v, &w)| Complex64::new(v * w, 0.0))
            .collect();
        buffer.resize(nfft, Complex64::new(0.0, 0.0));

        fft.process(&mut buffer);

        for (bin, value) in buffer.iter().take(n_bins).enumerate() {
            averaged[bin] += value.norm_sqr() * scale;
        }
        segments += 1;
        start += step;
    }

    for value in &mut averaged {
        *value /= segments as f64;
    }

    let frequencies = (0..n_bins).map(|k| k as f64 * fs / nfft as f64).collect();
    WelchPsd {
        power: averaged,
        frequencies,
    }
}

/// Symmetric Hann window of length `n`.
fn hann_window(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    let denom = (n - 1) as f64;
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / denom).cos()))
        .collect()
}

/// Spectral statistics derived from a one-sided PSD.
///
/// Field order matches [`SPECTRAL_STATS`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralFeatures {
    /// Maximum PSD value
    pub psd_max: f64,

    /// Spectral entropy `-sum(p * ln p)` over the normalized PSD,
    /// zero bins skipped
    pub entropy: f64,

    /// Frequency centroid `sum(f * P) / sum(P)`
    pub centroid: f64,

    /// Skewness of the PSD treated as a distribution over frequency bins
    pub skew: f64,

    /// Kurtosis of the PSD treated as a distribution over frequency bins
    pub kurt: f64,
}

impl SpectralFeatures {
    /// Derives spectral statistics from a PSD.
    ///
    /// An empty PSD, or one containing non-finite values, yields all-NaN
    /// features. Zero total energy resolves to zeros via epsilon-floored
    /// denominators, never to an error.
    #[must_use]
    pub fn from_psd(psd: &WelchPsd) -> Self {
        let p = &psd.power;
        if p.is_empty() || p.iter().any(|v| !v.is_finite()) {
            return Self::nan();
        }

        let psd_max = p.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let total: f64 = p.iter().sum();
        let total = total.max(STD_FLOOR);

        let entropy = -p
            .iter()
            .map(|&v| v / total)
            .filter(|&q| q > 0.0)
            .map(|q| q * q.ln())
            .sum::<f64>();

        let centroid = p
            .iter()
            .zip(&psd.frequencies)
            .map(|(&v, &f)| v * f)
            .sum::<f64>()
            / total;

        // Standardized central moments of the normalized PSD over bins.
        let var = p
            .iter()
            .zip(&psd.frequencies)
            .map(|(&v, &f)| v / total * (f - centroid).powi(2))
            .sum::<f64>();
        let std = var.sqrt().max(STD_FLOOR);

        let skew = p
            .iter()
            .zip(&psd.frequencies)
            .map(|(&v, &f)| v / total * ((f - centroid) / std).powi(3))
            .sum::<f64>();
        let kurt = p
            .iter()
            .zip(&psd.frequencies)
            .map(|(&v, &f)| v / total * ((f - centroid) / std).powi(4))
            .sum::<f64>();

        Self {
            psd_max,
            entropy,
            centroid,
            skew,
            kurt,
        }
    }

    /// All-NaN features for a window that cannot be computed.
    #[must_use]
    pub fn nan() -> Self {
        Self {
            psd_max: f64::NAN,
            entropy: f64::NAN,
            centroid: f64::NAN,
            skew: f64::NAN,
            kurt: f64::NAN,
        }
    }

    /// Values in [`SPECTRAL_STATS`] order.
    #[must_use]
    pub fn values(&self) -> [f64; SPECTRAL_STATS.len()] {
        [self.psd_max, self.entropy, self.centroid, self.skew, self.kurt]
    }
}
