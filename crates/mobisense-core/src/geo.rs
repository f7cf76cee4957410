//! Geodesic helpers shared by the GPS aggregator and the movement
//! estimator.

use crate::types::GpsFix;

/// Mean earth radius for the spherical-earth approximation, kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, kilometres.
///
/// Haversine formula over a spherical earth; accurate to well under a
/// percent at the distances covered by a single analysis span.
#[must_use]
pub fn haversine_km(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let dlat = (lat2_deg - lat1_deg).to_radians();
    let dlon = (lon2_deg - lon1_deg).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two fixes, metres.
#[must_use]
pub fn fix_distance_m(a: &GpsFix, b: &GpsFix) -> f64 {
    haversine_km(a.latitude_deg, a.longitude_deg, b.latitude_deg, b.longitude_deg) * 1000.0
}

/// Speed between two consecutive fixes, km/h.
///
/// Returns `None` unless `b` is strictly later than `a`.
#[must_use]
pub fn segment_speed_kmh(a: &GpsFix, b: &GpsFix) -> Option<f64> {
    let dt_ms = b.timestamp_ms - a.timestamp_ms;
    if dt_ms <= 0 {
        return None;
    }
    let km = haversine_km(a.latitude_deg, a.longitude_deg, b.latitude_deg, b.longitude_deg);
    let hours = dt_ms as f64 / 3_600_000.0;
    Some(km / hours)
}
