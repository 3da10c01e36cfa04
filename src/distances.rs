use serde::{Deserialize, Serialize};

use crate::TransportMode;

/// Earth radius in km. The earth is approximated by a sphere.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geo-point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns the haversine distance to another [`Coordinate`] in km
    pub fn distance(&self, other: &Self) -> f64 {
        haversine(*self, *other)
    }
}

/// Returns the great-circle distance between two geo-points in km,
/// using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
pub fn haversine(from: Coordinate, to: Coordinate) -> f64 {
    let lat_start = from.latitude.to_radians();
    let lat_dest = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_long = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat_start.cos() * lat_dest.cos() * (delta_long / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    c * EARTH_RADIUS_KM
}

/// Returns the great-circle distance between two geo-points in km,
/// using the spherical law of cosines.
/// Ill-conditioned for short distances; use [`haversine`] for anything but cross-checks.
pub fn great_circle(from: Coordinate, to: Coordinate) -> f64 {
    let lat_start = from.latitude.to_radians();
    let lat_dest = to.latitude.to_radians();
    let delta_long = (to.longitude - from.longitude).to_radians();

    let zeta = (lat_start.sin() * lat_dest.sin()
        + lat_start.cos() * lat_dest.cos() * delta_long.cos())
    .clamp(-1.0, 1.0)
    .acos();

    zeta * EARTH_RADIUS_KM
}

/// Total length in km of the path through `coordinates`, as the sum of the
/// haversine distances of consecutive pairs.
pub fn path_length(coordinates: &[Coordinate]) -> f64 {
    coordinates
        .windows(2)
        .map(|w| haversine(w[0], w[1]))
        .sum()
}

/// The ratio between the typical length of a real route and the great-circle
/// distance, for modes that travel on roads, rails or water.
/// `None` for modes whose route already approximates a great circle.
pub fn detour_coefficient(mode: TransportMode) -> Option<f64> {
    match mode {
        TransportMode::Car | TransportMode::Motorbike => Some(1.3),
        TransportMode::Bus => Some(1.5),
        TransportMode::Train => Some(1.2),
        TransportMode::Plane | TransportMode::Ferry => None,
    }
}

/// Converts a great-circle distance into an estimated travel distance for `mode`.
pub fn apply_detour(distance: f64, mode: TransportMode) -> f64 {
    detour_coefficient(mode).map_or(distance, |coefficient| distance * coefficient)
}
