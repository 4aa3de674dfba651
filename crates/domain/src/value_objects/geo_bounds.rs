//! Bounding box value object and its quantized cache key

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const MILLI_DEGREES: f64 = 1000.0;

/// A geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}

impl GeoBounds {
    /// Create a bounding box with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBounds` if any edge is out of range or
    /// if south/west do not lie below north/east
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&south) || !(-90.0..=90.0).contains(&north) {
            return Err(DomainError::InvalidBounds(
                "latitude edges must be -90 to 90".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&west) || !(-180.0..=180.0).contains(&east) {
            return Err(DomainError::InvalidBounds(
                "longitude edges must be -180 to 180".to_string(),
            ));
        }
        if south >= north {
            return Err(DomainError::InvalidBounds(
                "south must be below north".to_string(),
            ));
        }
        if west >= east {
            return Err(DomainError::InvalidBounds(
                "west must be below east".to_string(),
            ));
        }
        Ok(Self {
            south,
            west,
            north,
            east,
        })
    }

    /// Southern edge in degrees
    #[must_use]
    pub const fn south(&self) -> f64 {
        self.south
    }

    /// Western edge in degrees
    #[must_use]
    pub const fn west(&self) -> f64 {
        self.west
    }

    /// Northern edge in degrees
    #[must_use]
    pub const fn north(&self) -> f64 {
        self.north
    }

    /// Eastern edge in degrees
    #[must_use]
    pub const fn east(&self) -> f64 {
        self.east
    }

    /// Quantize to the cache key identifying this box
    #[must_use]
    pub fn key(&self) -> BoundsKey {
        BoundsKey::from_bounds(self)
    }
}

impl fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.4}, {:.4}) - ({:.4}, {:.4})",
            self.south, self.west, self.north, self.east
        )
    }
}

/// A bounding box quantized to 3-decimal precision, usable as a cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundsKey {
    south_milli: i32,
    west_milli: i32,
    north_milli: i32,
    east_milli: i32,
}

impl BoundsKey {
    /// Quantize a bounding box to its cache key
    #[must_use]
    pub fn from_bounds(bounds: &GeoBounds) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self {
            south_milli: (bounds.south() * MILLI_DEGREES).round() as i32,
            west_milli: (bounds.west() * MILLI_DEGREES).round() as i32,
            north_milli: (bounds.north() * MILLI_DEGREES).round() as i32,
            east_milli: (bounds.east() * MILLI_DEGREES).round() as i32,
        }
    }
}

impl fmt::Display for BoundsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.south_milli, self.west_milli, self.north_milli, self.east_milli
        )
    }
}
