//! Entities - Weather readings, verdicts, and route samples

mod route;
mod weather;

pub use route::RouteSample;
pub use weather::{AggregatedWeather, ProviderReading, SourceReading, aggregate};
