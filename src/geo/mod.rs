//! Great-circle math over WGS84-style latitude/longitude pairs
//!
//! Distances are computed with the haversine formula on a sphere of
//! radius [`EARTH_RADIUS_KM`].

use crate::error::{CepDistError, ErrorCode, Result};
use serde::Serialize;
use std::fmt;

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CepDistError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!("latitude {lat} is outside [-90, 90]"),
                Some("lat".to_string()),
            ));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CepDistError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!("longitude {lon} is outside [-180, 180]"),
                Some("lon".to_string()),
            ));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Great-circle distance between two coordinates in kilometres
///
/// Symmetric, non-negative and zero only for identical points. NaN inputs
/// propagate to the result.
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let sin_dlat = (d_lat / 2.0).sin();
    let sin_dlon = (d_lon / 2.0).sin();
    let h = sin_dlat * sin_dlat
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * sin_dlon * sin_dlon;
    // Rounding can push h a hair past 1 near antipodes
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
