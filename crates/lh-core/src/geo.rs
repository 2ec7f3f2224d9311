//! Geospatial and duration helpers used by the projection step.

use crate::timeline::GeoPoint;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two optional centers.
///
/// Returns `None` when either point is missing, never zero.
pub fn distance_between(a: Option<&GeoPoint>, b: Option<&GeoPoint>) -> Option<f64> {
    let (a, b) = (a?, b?);
    Some(haversine_distance(
        a.latitude,
        a.longitude,
        b.latitude,
        b.longitude,
    ))
}

/// Initial compass bearing (forward azimuth) in degrees, `[0, 360)`.
///
/// Same missing-input rule as [`distance_between`]. Identical points yield
/// `0.0` rather than an error.
pub fn bearing_between(a: Option<&GeoPoint>, b: Option<&GeoPoint>) -> Option<f64> {
    let (a, b) = (a?, b?);
    Some(initial_bearing(
        a.latitude,
        a.longitude,
        b.latitude,
        b.longitude,
    ))
}

fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let y = dlon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Renders a duration as `H:MM:SS` when it spans at least an hour, `M:SS`
/// otherwise. Minutes and seconds are zero-padded, hours never are.
pub fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours >= 1 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
