//! Great-circle distance between fixes.

use crate::models::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers. Zero for identical points.
pub fn distance(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let d_phi = (b.lat() - a.lat()).to_radians();
    let d_lambda = (b.lon() - a.lon()).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}
