//! Overpass API client for RouteRain
//!
//! Fetches named street geometry for a bounding box from the Overpass API
//! (OpenStreetMap). The public Overpass instances are a shared resource, so
//! the client throttles upstream calls to a minimum interval, coalesces
//! concurrent requests for the same box into a single upstream call, and
//! caches results by quantized bounding box.

pub mod client;
pub mod error;
pub mod models;

pub use client::{OverpassClient, OverpassConfig, StreetCacheStats};
pub use error::OverpassError;
pub use models::{Street, StreetNetwork};
