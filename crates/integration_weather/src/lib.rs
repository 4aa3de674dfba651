//! Upstream weather provider clients for RouteRain
//!
//! One HTTP client per provider, each normalizing its own wire format into
//! the `ProviderReading` contract. Network and parse errors surface as a
//! typed `ProviderError`, never as a malformed reading.

pub mod error;
pub mod open_weather_map;
pub mod tomorrow_io;
pub mod weather_api;

pub use error::ProviderError;
pub use open_weather_map::{OpenWeatherMapClient, OpenWeatherMapConfig};
pub use tomorrow_io::{TomorrowIoClient, TomorrowIoConfig};
pub use weather_api::{WeatherApiClient, WeatherApiConfig};
