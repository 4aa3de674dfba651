//! Rain weather aggregation service
//!
//! Resolves rain/dry verdicts for points and routes. Point resolution is
//! cache-first; on a miss every configured provider is queried concurrently,
//! failures are absorbed, and the surviving readings are reduced with the
//! weighted rain vote before the verdict is cached.

use std::sync::Arc;
use std::time::Duration;

use domain::entities::{AggregatedWeather, RouteSample, SourceReading, aggregate};
use domain::value_objects::GeoPoint;
use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::ports::WeatherProvider;
use crate::services::{RouteSampler, WeatherCache};

/// Default upper bound on a single provider fetch
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A provider with its standing in the vote
#[derive(Clone)]
pub struct ConfiguredProvider {
    client: Arc<dyn WeatherProvider>,
    trust: f64,
    priority: bool,
}

impl std::fmt::Debug for ConfiguredProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredProvider")
            .field("name", &self.client.name())
            .field("trust", &self.trust)
            .field("priority", &self.priority)
            .finish()
    }
}

impl ConfiguredProvider {
    /// A provider at standard trust with no priority claim
    #[must_use]
    pub fn new(client: Arc<dyn WeatherProvider>) -> Self {
        Self {
            client,
            trust: 1.0,
            priority: false,
        }
    }

    /// Scale this provider's vote weight by a fixed multiplier
    #[must_use]
    pub const fn with_trust(mut self, trust: f64) -> Self {
        self.trust = trust;
        self
    }

    /// Prefer this provider for descriptive and environmental fields
    #[must_use]
    pub const fn with_priority(mut self) -> Self {
        self.priority = true;
        self
    }
}

/// Aggregates configured providers into rain verdicts for points and routes
#[derive(Debug)]
pub struct RainWeatherService {
    providers: Vec<ConfiguredProvider>,
    cache: WeatherCache,
    sampler: RouteSampler,
    fetch_timeout: Duration,
}

impl RainWeatherService {
    /// Create a service over the given providers, cache, and sampler
    ///
    /// Provider order is significant: it decides the fallback source for
    /// descriptive fields when no priority provider answered.
    #[must_use]
    pub fn new(providers: Vec<ConfiguredProvider>, cache: WeatherCache, sampler: RouteSampler) -> Self {
        Self {
            providers,
            cache,
            sampler,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Override the per-provider fetch timeout
    #[must_use]
    pub const fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Resolve the rain verdict for a coordinate
    ///
    /// Returns `None` when no provider answered; an unknown verdict is a
    /// valid outcome, not an error, and is never cached.
    #[instrument(skip(self), fields(lat = %point.latitude(), lon = %point.longitude()))]
    pub async fn weather_at(&self, point: GeoPoint) -> Option<AggregatedWeather> {
        if let Some(cached) = self.cache.get(&point).await {
            return Some(cached);
        }

        // Buffer every outcome before reducing so the vote sees providers
        // in configuration order, not completion order
        let fetches = self.providers.iter().map(|provider| async move {
            match timeout(self.fetch_timeout, provider.client.current_reading(point)).await {
                Ok(Ok(reading)) => Some(SourceReading {
                    reading,
                    trust: provider.trust,
                    priority: provider.priority,
                }),
                Ok(Err(e)) => {
                    warn!(provider = provider.client.name(), error = %e, "Provider failed, excluded from vote");
                    None
                },
                Err(_) => {
                    warn!(provider = provider.client.name(), "Provider timed out, excluded from vote");
                    None
                },
            }
        });

        let sources: Vec<SourceReading> = join_all(fetches).await.into_iter().flatten().collect();
        debug!(answered = sources.len(), asked = self.providers.len(), "Providers answered");

        let verdict = aggregate(&sources)?;
        self.cache.insert(&point, verdict.clone()).await;
        Some(verdict)
    }

    /// Resolve rain verdicts along a route polyline
    ///
    /// The polyline is thinned by the sampler, every sample is resolved
    /// concurrently, and verdicts are zipped back onto their coordinates by
    /// position, so out-of-order completion cannot mismatch them.
    #[instrument(skip(self, path), fields(vertices = path.len()))]
    pub async fn route_weather(&self, path: &[GeoPoint]) -> Vec<RouteSample> {
        let points = self.sampler.sample(path);
        debug!(samples = points.len(), "Route sampled");

        let verdicts = join_all(points.iter().map(|point| self.weather_at(*point))).await;

        points
            .into_iter()
            .zip(verdicts)
            .map(|(point, weather)| RouteSample::new(point, weather))
            .collect()
    }

    /// Cache statistics for observability
    #[must_use]
    pub fn cache_stats(&self) -> crate::services::WeatherCacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use domain::entities::ProviderReading;

    use super::*;
    use crate::error::ApplicationError;
    use crate::ports::MockWeatherProvider;

    fn reading(is_raining: bool, confidence: Option<u8>, description: &str) -> ProviderReading {
        ProviderReading {
            is_raining,
            confidence,
            description: description.to_string(),
            temperature: None,
            humidity: None,
            wind_speed: None,
        }
    }

    fn mock_provider(
        name: &'static str,
        result: Result<ProviderReading, ApplicationError>,
        times: usize,
    ) -> Arc<dyn WeatherProvider> {
        let mut mock = MockWeatherProvider::new();
        mock.expect_name().return_const(name);
        mock.expect_current_reading()
            .times(times)
            .returning(move |_| match &result {
                Ok(r) => Ok(r.clone()),
                Err(_) => Err(ApplicationError::ExternalService("boom".to_string())),
            });
        Arc::new(mock)
    }

    fn service(providers: Vec<ConfiguredProvider>) -> RainWeatherService {
        RainWeatherService::new(providers, WeatherCache::new(), RouteSampler::default())
    }

    #[tokio::test]
    async fn weighted_vote_across_providers() {
        let providers = vec![
            ConfiguredProvider::new(mock_provider(
                "rainy",
                Ok(reading(true, Some(80), "light rain")),
                1,
            )),
            ConfiguredProvider::new(mock_provider(
                "dry",
                Ok(reading(false, Some(60), "partly cloudy")),
                1,
            )),
        ];

        let service = service(providers);
        let verdict = service
            .weather_at(GeoPoint::new_unchecked(19.0, 72.8))
            .await
            .expect("verdict");

        assert!(verdict.is_raining);
        assert!((verdict.confidence - 57.142_857).abs() < 0.001);
        assert_eq!(verdict.sources, 2);
        assert_eq!(verdict.description, "light rain");
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        // times(1) on the mock pins that only one upstream round trip happens
        let providers = vec![ConfiguredProvider::new(mock_provider(
            "solo",
            Ok(reading(true, None, "rain")),
            1,
        ))];

        let service = service(providers);
        let point = GeoPoint::new_unchecked(19.0, 72.8);

        let first = service.weather_at(point).await.expect("verdict");
        let second = service.weather_at(point).await.expect("cached verdict");
        assert_eq!(first, second);

        let stats = service.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn nearby_point_reuses_the_cached_verdict() {
        let providers = vec![ConfiguredProvider::new(mock_provider(
            "solo",
            Ok(reading(false, None, "clear")),
            1,
        ))];

        let service = service(providers);
        let a = GeoPoint::new_unchecked(19.07601, 72.87769);
        let b = GeoPoint::new_unchecked(19.07599, 72.87771);

        assert!(service.weather_at(a).await.is_some());
        assert!(service.weather_at(b).await.is_some());
    }

    #[tokio::test]
    async fn one_failing_provider_does_not_fail_aggregation() {
        let providers = vec![
            ConfiguredProvider::new(mock_provider(
                "broken",
                Err(ApplicationError::ExternalService("boom".to_string())),
                1,
            )),
            ConfiguredProvider::new(mock_provider("working", Ok(reading(true, None, "rain")), 1)),
        ];

        let service = service(providers);
        let verdict = service
            .weather_at(GeoPoint::new_unchecked(19.0, 72.8))
            .await
            .expect("verdict");

        assert_eq!(verdict.sources, 1);
        assert!(verdict.is_raining);
        // With the first provider absent, the second becomes the fallback
        // source for descriptive fields
        assert_eq!(verdict.description, "rain");
    }

    #[tokio::test]
    async fn all_failures_yield_none_and_cache_nothing() {
        // times(2): the second lookup must reach the provider again because
        // a failed aggregation writes no cache entry
        let providers = vec![ConfiguredProvider::new(mock_provider(
            "broken",
            Err(ApplicationError::ExternalService("boom".to_string())),
            2,
        ))];

        let service = service(providers);
        let point = GeoPoint::new_unchecked(19.0, 72.8);

        assert!(service.weather_at(point).await.is_none());
        assert!(service.weather_at(point).await.is_none());
    }

    #[tokio::test]
    async fn priority_provider_supplies_descriptive_fields() {
        let mut preferred = reading(false, Some(40), "scattered clouds");
        preferred.temperature = Some(29.0);

        let providers = vec![
            ConfiguredProvider::new(mock_provider("first", Ok(reading(true, Some(95), "rain")), 1)),
            ConfiguredProvider::new(mock_provider("preferred", Ok(preferred), 1)).with_priority(),
        ];

        let service = service(providers);
        let verdict = service
            .weather_at(GeoPoint::new_unchecked(19.0, 72.8))
            .await
            .expect("verdict");

        assert_eq!(verdict.description, "scattered clouds");
        assert_eq!(verdict.temperature, Some(29.0));
        // The vote itself is unaffected by priority: 95 rain vs 40 dry
        assert!(verdict.is_raining);
    }

    #[tokio::test]
    async fn trust_multiplier_applies_to_vote() {
        let providers = vec![
            ConfiguredProvider::new(mock_provider("trusted", Ok(reading(true, Some(60), "showers")), 1))
                .with_trust(2.0),
            ConfiguredProvider::new(mock_provider("plain", Ok(reading(false, None, "overcast")), 1)),
        ];

        let service = service(providers);
        let verdict = service
            .weather_at(GeoPoint::new_unchecked(19.0, 72.8))
            .await
            .expect("verdict");

        // 120 rain weight vs 100 dry weight
        assert!(verdict.is_raining);
        assert!((verdict.confidence - 54.545_454).abs() < 0.001);
    }

    /// Provider that never answers within any reasonable budget
    struct StalledProvider;

    #[async_trait]
    impl WeatherProvider for StalledProvider {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn current_reading(
            &self,
            _point: GeoPoint,
        ) -> Result<ProviderReading, ApplicationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(reading(true, None, "never"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_provider_is_treated_as_absent() {
        let providers = vec![
            ConfiguredProvider::new(Arc::new(StalledProvider)),
            ConfiguredProvider::new(mock_provider("fast", Ok(reading(false, None, "clear")), 1)),
        ];

        let service = service(providers).with_fetch_timeout(Duration::from_millis(100));
        let verdict = service
            .weather_at(GeoPoint::new_unchecked(19.0, 72.8))
            .await
            .expect("verdict");

        assert_eq!(verdict.sources, 1);
        assert!(!verdict.is_raining);
    }

    #[tokio::test]
    async fn route_weather_zips_verdicts_positionally() {
        let providers = vec![ConfiguredProvider::new(mock_provider(
            "solo",
            Ok(reading(true, None, "rain")),
            6,
        ))];

        // 100 vertices over ~10km thins to 6 samples
        #[allow(clippy::cast_precision_loss)]
        let path: Vec<GeoPoint> = (0..100)
            .map(|i| GeoPoint::new_unchecked(19.0, 72.0 + 0.09 * (i as f64 / 99.0)))
            .collect();

        let service = service(providers);
        let samples = service.route_weather(&path).await;

        assert_eq!(samples.len(), 6);
        assert_eq!(samples[0].point, path[0]);
        assert_eq!(samples[5].point, path[99]);
        assert!(samples.iter().all(RouteSample::is_raining));
    }

    #[tokio::test]
    async fn empty_route_yields_no_samples() {
        let service = service(vec![]);
        assert!(service.route_weather(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn no_providers_configured_yields_unknown() {
        let service = service(vec![]);
        assert!(
            service
                .weather_at(GeoPoint::new_unchecked(19.0, 72.8))
                .await
                .is_none()
        );
    }
}
