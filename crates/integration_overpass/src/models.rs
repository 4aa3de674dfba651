//! Overpass wire format and the street geometry it joins into
//!
//! An Overpass `out body` response for a way query carries two element
//! kinds: nodes (id plus coordinate) and ways (id, tags, ordered node
//! references). Joining node references against the node table yields the
//! per-street polylines the rest of the system works with.

use std::collections::HashMap;

use domain::value_objects::GeoPoint;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    pub(crate) elements: Vec<Element>,
}

/// A single element of an Overpass response
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum Element {
    Node {
        id: u64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: u64,
        #[serde(default)]
        tags: Option<WayTags>,
        #[serde(default)]
        nodes: Vec<u64>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct WayTags {
    pub(crate) name: Option<String>,
}

/// A named street as an ordered polyline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Street {
    /// OpenStreetMap way id
    pub id: u64,
    /// Street name from the way's tags
    pub name: String,
    /// Ordered vertices of the street's geometry
    pub geometry: Vec<GeoPoint>,
}

/// All named streets within one bounding box
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreetNetwork {
    /// Streets in response order
    pub streets: Vec<Street>,
}

impl StreetNetwork {
    /// Number of streets in the network
    #[must_use]
    pub fn len(&self) -> usize {
        self.streets.len()
    }

    /// Whether the box contained no usable streets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streets.is_empty()
    }
}

impl From<ApiResponse> for StreetNetwork {
    fn from(response: ApiResponse) -> Self {
        let mut nodes: HashMap<u64, GeoPoint> = HashMap::new();
        for element in &response.elements {
            if let Element::Node { id, lat, lon } = element
                && let Ok(point) = GeoPoint::new(*lat, *lon)
            {
                nodes.insert(*id, point);
            }
        }

        let mut streets = Vec::new();
        for element in response.elements {
            let Element::Way {
                id,
                tags,
                nodes: refs,
            } = element
            else {
                continue;
            };

            let Some(name) = tags.and_then(|t| t.name) else {
                trace!(way = id, "Skipping unnamed way");
                continue;
            };

            let geometry: Vec<GeoPoint> =
                refs.iter().filter_map(|r| nodes.get(r).copied()).collect();
            // A street needs at least a segment to be drawable
            if geometry.len() < 2 {
                trace!(way = id, resolved = geometry.len(), "Skipping degenerate way");
                continue;
            }

            streets.push(Street { id, name, geometry });
        }

        Self { streets }
    }
}
