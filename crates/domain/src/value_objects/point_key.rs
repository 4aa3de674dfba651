//! Quantized cache key for geographic points

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::GeoPoint;

/// Quantization precision: 3 decimal places, roughly a 110 m grid at the
/// equator. Nearby queries collapse onto one cache slot.
const MILLI_DEGREES: f64 = 1000.0;

/// A cache key identifying a geographic point at 3-decimal precision
///
/// Stored as integer milli-degrees so equality and hashing are exact; the
/// same physical query always quantizes to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointKey {
    lat_milli: i32,
    lon_milli: i32,
}

impl PointKey {
    /// Quantize a point to its cache key
    #[must_use]
    pub fn from_point(point: &GeoPoint) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self {
            lat_milli: (point.latitude() * MILLI_DEGREES).round() as i32,
            lon_milli: (point.longitude() * MILLI_DEGREES).round() as i32,
        }
    }

    /// Latitude of the grid slot in degrees
    #[must_use]
    pub fn latitude(&self) -> f64 {
        f64::from(self.lat_milli) / MILLI_DEGREES
    }

    /// Longitude of the grid slot in degrees
    #[must_use]
    pub fn longitude(&self) -> f64 {
        f64::from(self.lon_milli) / MILLI_DEGREES
    }
}

impl From<&GeoPoint> for PointKey {
    fn from(point: &GeoPoint) -> Self {
        Self::from_point(point)
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3},{:.3}", self.latitude(), self.longitude())
    }
}
