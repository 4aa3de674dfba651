//! Tomorrow.io client
//!
//! HTTP client for the Tomorrow.io realtime weather endpoint. A reading
//! counts as raining when precipitation intensity is above zero; the
//! reported precipitation probability, when present, becomes the reading's
//! confidence.

use std::time::Duration;

use application::{ApplicationError, WeatherProvider};
use async_trait::async_trait;
use domain::entities::ProviderReading;
use domain::value_objects::GeoPoint;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ProviderError;

/// Conversion from m/s (Tomorrow.io default wind unit) to km/h
const MS_TO_KMH: f64 = 3.6;

/// Tomorrow.io client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomorrowIoConfig {
    /// API base URL (default: <https://api.tomorrow.io/v4>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key
    pub api_key: String,

    /// Connection timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.tomorrow.io/v4".to_string()
}

const fn default_timeout() -> u64 {
    10
}

impl TomorrowIoConfig {
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

/// Raw Tomorrow.io realtime response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: RealtimeData,
}

#[derive(Debug, Deserialize)]
struct RealtimeData {
    values: RealtimeValues,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RealtimeValues {
    #[serde(default)]
    precipitation_intensity: f64,
    precipitation_probability: Option<u8>,
    precipitation_type: Option<u8>,
    temperature: Option<f64>,
    humidity: Option<u8>,
    wind_speed: Option<f64>,
}

/// Tomorrow.io HTTP client
#[derive(Debug)]
pub struct TomorrowIoClient {
    client: Client,
    config: TomorrowIoConfig,
}

impl TomorrowIoClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: TomorrowIoConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Fetch and normalize the current reading for a coordinate
    async fn fetch_current(&self, point: GeoPoint) -> Result<ProviderReading, ProviderError> {
        let url = format!("{}/weather/realtime", self.config.base_url);
        debug!(%point, "Fetching Tomorrow.io realtime weather");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("location", format!("{},{}", point.latitude(), point.longitude())),
                ("apikey", self.config.api_key.clone()),
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
        let values = &api.data.values;

        ProviderReading {
            is_raining: values.precipitation_intensity > 0.0,
            confidence: values.precipitation_probability.map(|p| p.min(100)),
            description: Self::describe(values.precipitation_type),
            temperature: values.temperature,
            humidity: values.humidity,
            wind_speed: values.wind_speed.map(|w| w * MS_TO_KMH),
        }
    }

    /// Human-readable description of the precipitation type code
    fn describe(precipitation_type: Option<u8>) -> String {
        match precipitation_type {
            None | Some(0) => "No precipitation",
            Some(1) => "Rain",
            Some(2) => "Snow",
            Some(3) => "Freezing rain",
            Some(4) => "Ice pellets",
            Some(_) => "Unknown precipitation",
        }
        .to_string()
    }
}

#[async_trait]
impl WeatherProvider for TomorrowIoClient {
    fn name(&self) -> &'static str {
        "tomorrow.io"
    }

    #[instrument(skip(self), fields(lat = %point.latitude(), lon = %point.longitude()))]
    async fn current_reading(
        &self,
        point: GeoPoint,
    ) -> Result<ProviderReading, ApplicationError> {
        Ok(self.fetch_current(point).await?)
    }
}
