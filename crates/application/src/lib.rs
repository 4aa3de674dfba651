//! Application layer - Use cases and orchestration
//!
//! Contains the weather provider port, the aggregation and route weather
//! services, the TTL point cache, and the route sampler.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
