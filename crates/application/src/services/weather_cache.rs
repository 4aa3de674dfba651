//! TTL cache for aggregated weather verdicts
//!
//! Maps quantized point keys to verdicts so nearby queries within the TTL
//! window collapse onto one upstream aggregation. Entries expire after the
//! configured TTL and are evicted by the cache itself; racing writes for the
//! same key are last-write-wins, which is acceptable because concurrent
//! aggregations for one key produce near-identical verdicts.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use domain::entities::AggregatedWeather;
use domain::value_objects::{GeoPoint, PointKey};
use moka::future::Cache;
use tracing::debug;

/// Configuration for the weather verdict cache
#[derive(Debug, Clone, Copy)]
pub struct WeatherCacheConfig {
    /// How long a verdict stays fresh
    pub ttl: Duration,
    /// Maximum number of cached grid slots
    pub max_capacity: u64,
}

impl Default for WeatherCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Counters exposed for observability and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that fell through to aggregation
    pub misses: u64,
    /// Current entry count
    pub entries: u64,
}

/// In-memory TTL cache keyed by quantized coordinates
pub struct WeatherCache {
    cache: Cache<PointKey, AggregatedWeather>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for WeatherCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherCache")
            .field("entries", &self.cache.entry_count())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl WeatherCache {
    /// Create a cache with default configuration (15 minute TTL)
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WeatherCacheConfig::default())
    }

    /// Create a cache with custom TTL and capacity
    #[must_use]
    pub fn with_config(config: WeatherCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up the verdict cached for the point's grid slot
    ///
    /// Returns `None` when the slot is empty or its entry has outlived the
    /// TTL.
    pub async fn get(&self, point: &GeoPoint) -> Option<AggregatedWeather> {
        let key = PointKey::from_point(point);
        if let Some(verdict) = self.cache.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "Weather cache hit");
            Some(verdict)
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "Weather cache miss");
            None
        }
    }

    /// Store a verdict under the point's grid slot, replacing any prior entry
    pub async fn insert(&self, point: &GeoPoint, verdict: AggregatedWeather) {
        let key = PointKey::from_point(point);
        self.cache.insert(key, verdict).await;
        debug!(%key, "Weather cache set");
    }

    /// Current hit/miss/entry counters
    pub fn stats(&self) -> WeatherCacheStats {
        WeatherCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        }
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}
