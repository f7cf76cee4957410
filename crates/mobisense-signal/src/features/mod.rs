//! Statistical and spectral feature computation for scalar window series.
//!
//! Both extractors operate per window, independently: a malformed window
//! (empty or containing non-finite values) yields all-NaN features for
//! that window only and never aborts extraction for the rest of the
//! batch. Callers zero-fill the NaNs at assembly time.

pub mod spectral;
pub mod time_domain;

pub use spectral::{welch_psd, SpectralFeatures, WelchPsd};
pub use time_domain::TimeDomainFeatures;
