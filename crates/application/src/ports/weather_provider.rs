//! Weather provider port
//!
//! Defines the interface every upstream weather source implements. Each
//! provider normalizes its own wire format into a `ProviderReading`; a
//! provider failure surfaces as a typed error, never as a malformed reading.

use async_trait::async_trait;
use domain::entities::ProviderReading;
use domain::value_objects::GeoPoint;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for a single upstream weather source
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Short provider name, used in logs
    fn name(&self) -> &'static str;

    /// Fetch the provider's current reading for a coordinate
    async fn current_reading(&self, point: GeoPoint)
    -> Result<ProviderReading, ApplicationError>;
}
