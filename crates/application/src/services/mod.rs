//! Application services

mod route_sampler;
mod weather_cache;
mod weather_service;

pub use route_sampler::{DEFAULT_SPACING_DEGREES, RouteSampler};
pub use weather_cache::{WeatherCache, WeatherCacheConfig, WeatherCacheStats};
pub use weather_service::{ConfiguredProvider, RainWeatherService};
