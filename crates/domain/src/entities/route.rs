//! Route samples - a sampled coordinate paired with its resolved verdict

use serde::{Deserialize, Serialize};

use crate::entities::AggregatedWeather;
use crate::value_objects::GeoPoint;

/// A coordinate drawn from a route polyline, tagged with its weather verdict
///
/// `weather` is `None` when no provider answered for the point. Created per
/// route query and discarded once the caller consumes the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSample {
    /// The sampled coordinate
    pub point: GeoPoint,
    /// The aggregated verdict, if any provider answered
    pub weather: Option<AggregatedWeather>,
}

impl RouteSample {
    /// Create a sample for a point with its resolved verdict
    #[must_use]
    pub const fn new(point: GeoPoint, weather: Option<AggregatedWeather>) -> Self {
        Self { point, weather }
    }

    /// Whether this sample resolved to a raining verdict
    #[must_use]
    pub fn is_raining(&self) -> bool {
        self.weather.as_ref().is_some_and(|w| w.is_raining)
    }
}
