//! Value Objects - Immutable, identity-less domain primitives

mod geo_bounds;
mod geo_point;
mod point_key;

pub use geo_bounds::{BoundsKey, GeoBounds};
pub use geo_point::GeoPoint;
pub use point_key::PointKey;
