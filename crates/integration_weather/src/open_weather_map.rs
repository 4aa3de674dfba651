//! OpenWeatherMap client
//!
//! HTTP client for the OpenWeatherMap current weather API, normalized to
//! the `ProviderReading` contract. A reading counts as raining when the
//! response carries a `rain` block or its primary condition is `Rain`.

use std::time::Duration;

use application::{ApplicationError, WeatherProvider};
use async_trait::async_trait;
use domain::entities::ProviderReading;
use domain::value_objects::GeoPoint;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ProviderError;

/// Conversion from m/s (OpenWeatherMap metric wind) to km/h
const MS_TO_KMH: f64 = 3.6;

/// OpenWeatherMap client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherMapConfig {
    /// API base URL (default: <https://api.openweathermap.org/data/2.5>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key
    pub api_key: String,

    /// Connection timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

const fn default_timeout() -> u64 {
    10
}

impl OpenWeatherMapConfig {
    /// Configuration with defaults for everything but the key
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: api_key.into(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Raw OpenWeatherMap current weather response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    weather: Vec<Condition>,
    main: MainData,
    wind: Option<WindData>,
    rain: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainData {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct WindData {
    speed: f64,
}

/// OpenWeatherMap HTTP client
#[derive(Debug)]
pub struct OpenWeatherMapClient {
    client: Client,
    config: OpenWeatherMapConfig,
}

impl OpenWeatherMapClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: OpenWeatherMapConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Fetch and normalize the current reading for a coordinate
    async fn fetch_current(&self, point: GeoPoint) -> Result<ProviderReading, ProviderError> {
        let url = format!("{}/weather", self.config.base_url);
        debug!(%point, "Fetching OpenWeatherMap current weather");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", point.latitude().to_string()),
                ("lon", point.longitude().to_string()),
                ("units", "metric".to_string()),
                ("appid", self.config.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        if let Some(err) = ProviderError::from_status(response.status()) {
            return Err(err);
        }

        let api: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(Self::normalize(&api))
    }

    fn normalize(api: &ApiResponse) -> ProviderReading {
        let condition = api.weather.first();
        let is_raining =
            api.rain.is_some() || condition.is_some_and(|c| c.main.eq_ignore_ascii_case("rain"));

        ProviderReading {
            is_raining,
            confidence: None,
            description: condition
                .map_or_else(|| "unknown".to_string(), |c| c.description.clone()),
            temperature: Some(api.main.temp),
            humidity: Some(api.main.humidity),
            wind_speed: api.wind.as_ref().map(|w| w.speed * MS_TO_KMH),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    fn name(&self) -> &'static str {
        "openweathermap"
    }

    #[instrument(skip(self), fields(lat = %point.latitude(), lon = %point.longitude()))]
    async fn current_reading(
        &self,
        point: GeoPoint,
    ) -> Result<ProviderReading, ApplicationError> {
        Ok(self.fetch_current(point).await?)
    }
}
