//! Domain layer for RouteRain
//!
//! Contains the core value objects (coordinates, quantized cache keys,
//! bounding boxes), the weather reading entities, and the weighted rain
//! vote. This layer has no I/O dependencies.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
