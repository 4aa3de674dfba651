//! Integration tests for the provider clients using wiremock
//!
//! These tests verify each client's behavior against a mock HTTP server,
//! covering normalization, status mapping, and query construction.

use application::WeatherProvider;
use domain::value_objects::GeoPoint;
use integration_weather::{
    OpenWeatherMapClient, OpenWeatherMapConfig, ProviderError, TomorrowIoClient, TomorrowIoConfig,
    WeatherApiClient, WeatherApiConfig,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn test_point() -> GeoPoint {
    GeoPoint::new_unchecked(19.076, 72.8777)
}

// ============================================================================
// OpenWeatherMap
// ============================================================================

fn sample_owm_response() -> serde_json::Value {
    serde_json::json!({
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 27.3, "feels_like": 30.1, "pressure": 1006, "humidity": 84},
        "wind": {"speed": 5.0, "deg": 240},
        "rain": {"1h": 0.8},
        "name": "Mumbai"
    })
}

fn owm_client(mock_server: &MockServer) -> OpenWeatherMapClient {
    let config = OpenWeatherMapConfig {
        base_url: mock_server.uri(),
        api_key: "test-key".to_string(),
        timeout_secs: 5,
    };
    #[allow(clippy::expect_used)]
    OpenWeatherMapClient::new(config).expect("Failed to create client")
}

#[tokio::test]
async fn openweathermap_normalizes_rainy_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_owm_response()))
        .mount(&mock_server)
        .await;

    let client = owm_client(&mock_server);
    let reading = client.current_reading(test_point()).await.expect("reading");

    assert!(reading.is_raining);
    assert_eq!(reading.description, "light rain");
    assert_eq!(reading.confidence, None);
    assert!((reading.temperature.unwrap_or_default() - 27.3).abs() < 0.01);
    assert_eq!(reading.humidity, Some(84));
}

#[tokio::test]
async fn openweathermap_sends_key_and_metric_units() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .and(query_param("lat", "19.076"))
        .and(query_param("lon", "72.8777"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_owm_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = owm_client(&mock_server);
    assert!(client.current_reading(test_point()).await.is_ok());
}

#[tokio::test]
async fn openweathermap_server_error_is_retryable_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = owm_client(&mock_server);
    let err = client
        .current_reading(test_point())
        .await
        .expect_err("failure");
    assert!(err.is_retryable());
}

// ============================================================================
// WeatherAPI
// ============================================================================

fn sample_weatherapi_response() -> serde_json::Value {
    serde_json::json!({
        "location": {"name": "Mumbai", "lat": 19.08, "lon": 72.88},
        "current": {
            "temp_c": 29.5,
            "humidity": 79,
            "wind_kph": 16.2,
            "precip_mm": 0.0,
            "condition": {"text": "Partly cloudy", "code": 1003}
        }
    })
}

fn weatherapi_client(mock_server: &MockServer) -> WeatherApiClient {
    let config = WeatherApiConfig {
        base_url: mock_server.uri(),
        api_key: "test-key".to_string(),
        timeout_secs: 5,
    };
    #[allow(clippy::expect_used)]
    WeatherApiClient::new(config).expect("Failed to create client")
}

#[tokio::test]
async fn weatherapi_normalizes_dry_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_weatherapi_response()))
        .mount(&mock_server)
        .await;

    let client = weatherapi_client(&mock_server);
    let reading = client.current_reading(test_point()).await.expect("reading");

    assert!(!reading.is_raining);
    assert_eq!(reading.description, "Partly cloudy");
    assert_eq!(reading.wind_speed, Some(16.2));
}

#[tokio::test]
async fn weatherapi_sends_combined_coordinate_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current.json"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "19.076,72.8777"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_weatherapi_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = weatherapi_client(&mock_server);
    assert!(client.current_reading(test_point()).await.is_ok());
}

#[tokio::test]
async fn weatherapi_invalid_json_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = weatherapi_client(&mock_server);
    let err = client
        .current_reading(test_point())
        .await
        .expect_err("failure");
    assert!(err.to_string().contains("Parse error"));
}

// ============================================================================
// Tomorrow.io
// ============================================================================

fn sample_tomorrow_response() -> serde_json::Value {
    serde_json::json!({
        "data": {
            "time": "2026-08-28T09:00:00Z",
            "values": {
                "precipitationIntensity": 1.4,
                "precipitationProbability": 90,
                "precipitationType": 1,
                "temperature": 24.1,
                "humidity": 93,
                "windSpeed": 3.5
            }
        },
        "location": {"lat": 19.076, "lon": 72.8777}
    })
}

fn tomorrow_client(mock_server: &MockServer) -> TomorrowIoClient {
    let config = TomorrowIoConfig {
        base_url: mock_server.uri(),
        api_key: "test-key".to_string(),
        timeout_secs: 5,
    };
    #[allow(clippy::expect_used)]
    TomorrowIoClient::new(config).expect("Failed to create client")
}

#[tokio::test]
async fn tomorrow_normalizes_rainy_response_with_confidence() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/realtime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_tomorrow_response()))
        .mount(&mock_server)
        .await;

    let client = tomorrow_client(&mock_server);
    let reading = client.current_reading(test_point()).await.expect("reading");

    assert!(reading.is_raining);
    assert_eq!(reading.confidence, Some(90));
    assert_eq!(reading.description, "Rain");
}

#[tokio::test]
async fn tomorrow_rate_limit_surfaces_as_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/realtime"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&mock_server)
        .await;

    let client = tomorrow_client(&mock_server);
    let err = client
        .current_reading(test_point())
        .await
        .expect_err("failure");
    assert!(err.to_string().contains("Rate limit"));
}

#[tokio::test]
async fn tomorrow_sends_location_and_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/realtime"))
        .and(query_param("location", "19.076,72.8777"))
        .and(query_param("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_tomorrow_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = tomorrow_client(&mock_server);
    assert!(client.current_reading(test_point()).await.is_ok());
}

// ============================================================================
// Provider error surface
// ============================================================================

#[tokio::test]
async fn unreachable_host_is_connection_failure() {
    // Port 1 is essentially never listening
    let config = WeatherApiConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        api_key: "test-key".to_string(),
        timeout_secs: 2,
    };
    #[allow(clippy::expect_used)]
    let client = WeatherApiClient::new(config).expect("Failed to create client");

    let err = client
        .current_reading(test_point())
        .await
        .expect_err("failure");
    assert!(err.is_retryable());
}

#[test]
fn provider_error_messages() {
    assert!(
        ProviderError::ServiceUnavailable("HTTP 502".to_string())
            .to_string()
            .contains("502")
    );
    assert_eq!(ProviderError::Timeout.to_string(), "Request timed out");
}
