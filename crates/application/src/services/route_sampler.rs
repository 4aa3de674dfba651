//! Route polyline sampling
//!
//! Converts a dense route polyline into a sparse set of representative
//! coordinates to query, so provider call volume scales with route length
//! rather than with vertex density.

use domain::value_objects::GeoPoint;

/// Default minimum spacing between emitted samples, in degrees
///
/// 0.018 degrees is roughly 2 km at mid latitudes. Degree distance is not
/// geodesically uniform but is an accepted approximation for spacing.
pub const DEFAULT_SPACING_DEGREES: f64 = 0.018;

/// Spacing-threshold polyline sampler
#[derive(Debug, Clone, Copy)]
pub struct RouteSampler {
    spacing_degrees: f64,
}

impl Default for RouteSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SPACING_DEGREES)
    }
}

impl RouteSampler {
    /// Create a sampler with a custom minimum spacing in degrees
    #[must_use]
    pub const fn new(spacing_degrees: f64) -> Self {
        Self { spacing_degrees }
    }

    /// Sample representative points from an ordered polyline
    ///
    /// Always emits the first and last input point. In between, a point is
    /// emitted whenever its straight-line degree-space distance from the
    /// last emitted point exceeds the spacing threshold. Output preserves
    /// input order and is non-empty whenever the input is.
    #[must_use]
    pub fn sample(&self, path: &[GeoPoint]) -> Vec<GeoPoint> {
        let Some((first, rest)) = path.split_first() else {
            return Vec::new();
        };

        let mut samples = vec![*first];
        let mut last_emitted = *first;

        for point in rest {
            if last_emitted.degree_distance(point) > self.spacing_degrees {
                samples.push(*point);
                last_emitted = *point;
            }
        }

        // The endpoint is always represented, unless the walk just emitted it
        if let Some(end) = path.last()
            && samples.last() != Some(end)
        {
            samples.push(*end);
        }

        samples
    }
}
