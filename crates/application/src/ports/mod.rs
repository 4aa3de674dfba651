//! Port definitions - interfaces implemented by integration adapters

mod weather_provider;

pub use weather_provider::WeatherProvider;

#[cfg(test)]
pub use weather_provider::MockWeatherProvider;
