//! Distance and bearing calculations on the Earth's surface.
//!
//! Every distance in the crate goes through [`haversine_distance`] so that
//! placement clearance and the collection gate agree on one sphere model.

use geo::{Bearing, Distance, Haversine, Point};

/// Flat approximation used to turn meter offsets into degrees of latitude.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    Haversine.distance(p1, p2)
}

/// Initial compass bearing from `from` to `to`, in degrees within `[0, 360)`
pub fn bearing(from: Point, to: Point) -> f64 {
    Haversine.bearing(from, to).rem_euclid(360.0)
}

pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

pub fn degrees_to_meters(degrees: f64) -> f64 {
    degrees * METERS_PER_DEGREE
}

/// Factor that stretches a latitude-equivalent offset into true longitude
/// degrees at the given latitude.
pub fn longitude_correction(lat_deg: f64) -> f64 {
    1.0 / lat_deg.to_radians().cos()
}

/// Fold an angle in degrees into `(-180, 180]`.
pub fn normalize_bearing(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let folded = degrees.rem_euclid(360.0);
    if folded > 180.0 { folded - 360.0 } else { folded }
}

/// Bring a longitude back into `[-180, 180)` after an offset has pushed it
/// across the antimeridian.
pub fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        return lng;
    }
    (lng + 180.0).rem_euclid(360.0) - 180.0
}
