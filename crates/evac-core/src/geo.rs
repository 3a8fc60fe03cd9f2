use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the globe in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Finite and inside the usual latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// `"lat,lon"` label used when a zone or vehicle has no free-text location.
    pub fn label(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

#[inline(always)]
fn to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

/// Great-circle distance in kilometres (haversine).
#[inline(always)]
pub fn distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = to_radians(from.latitude);
    let lat2 = to_radians(to.latitude);
    let d_lat = lat2 - lat1;
    let d_lon = to_radians(to.longitude - from.longitude);

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);

    2.0 * a.sqrt().atan2((1.0 - a).sqrt()) * EARTH_RADIUS_KM
}

/// Travel time in minutes. A non-positive speed yields `f64::INFINITY`,
/// which planners treat as "not a candidate".
#[inline(always)]
pub fn travel_time_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    if speed_kmh <= 0.0 {
        return f64::INFINITY;
    }
    (distance_km / speed_kmh) * 60.0
}

/// Rounds to two decimals, half away from zero.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
