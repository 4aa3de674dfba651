//! WeatherAPI client
//!
//! HTTP client for the WeatherAPI.com current conditions endpoint. A
//! reading counts as raining when measurable precipitation is reported or
//! the condition text mentions rain.

use std::time::Duration;

use application::{ApplicationError, WeatherProvider};
use async_trait::async_trait;
use domain::entities::ProviderReading;
use domain::value_objects::GeoPoint;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ProviderError;

/// WeatherAPI client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherApiConfig {
    /// API base URL (default: <https://api.weatherapi.com/v1>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key
    pub api_key: String,

    /// Connection timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

const fn default_timeout() -> u64 {
    10
}

impl WeatherApiConfig {
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

/// Raw WeatherAPI current conditions response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    current: CurrentData,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    temp_c: f64,
    humidity: u8,
    wind_kph: f64,
    precip_mm: f64,
    condition: ConditionData,
}

#[derive(Debug, Deserialize)]
struct ConditionData {
    text: String,
}

/// WeatherAPI HTTP client
#[derive(Debug)]
pub struct WeatherApiClient {
    client: Client,
    config: WeatherApiConfig,
}

impl WeatherApiClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: WeatherApiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Fetch and normalize the current reading for a coordinate
    async fn fetch_current(&self, point: GeoPoint) -> Result<ProviderReading, ProviderError> {
        let url = format!("{}/current.json", self.config.base_url);
        debug!(%point, "Fetching WeatherAPI current conditions");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.config.api_key.clone()),
                ("q", format!("{},{}", point.latitude(), point.longitude())),
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
        let current = &api.current;
        let is_raining =
            current.precip_mm > 0.0 || current.condition.text.to_lowercase().contains("rain");

        ProviderReading {
            is_raining,
            confidence: None,
            description: current.condition.text.clone(),
            temperature: Some(current.temp_c),
            humidity: Some(current.humidity),
            wind_speed: Some(current.wind_kph),
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    fn name(&self) -> &'static str {
        "weatherapi"
    }

    #[instrument(skip(self), fields(lat = %point.latitude(), lon = %point.longitude()))]
    async fn current_reading(
        &self,
        point: GeoPoint,
    ) -> Result<ProviderReading, ApplicationError> {
        Ok(self.fetch_current(point).await?)
    }
}
