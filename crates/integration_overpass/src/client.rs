//! Throttled, coalescing Overpass client
//!
//! Upstream calls go through three layers, in order: a TTL cache keyed by
//! quantized bounding box, an in-flight table that collapses concurrent
//! requests for the same box into one shared upstream call, and a global
//! throttle gate enforcing a minimum interval between consecutive calls to
//! the Overpass instance.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use domain::value_objects::{BoundsKey, GeoBounds};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::error::OverpassError;
use crate::models::{ApiResponse, StreetNetwork};

type SharedFetch = Shared<BoxFuture<'static, Result<StreetNetwork, OverpassError>>>;

/// Configuration for the Overpass client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    /// API base URL (default: <https://overpass-api.de/api>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds, also sent as the query timeout (default: 25)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Cache TTL in minutes (default: 60)
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,

    /// Minimum interval between upstream calls in milliseconds (default: 2000)
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

fn default_base_url() -> String {
    "https://overpass-api.de/api".to_string()
}

const fn default_timeout() -> u64 {
    25
}

const fn default_cache_ttl_minutes() -> u64 {
    60
}

const fn default_min_interval_ms() -> u64 {
    2000
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl OverpassConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            min_interval_ms: 0,
            ..Default::default()
        }
    }
}

/// Street geometry cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreetCacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that went upstream (or joined an in-flight call)
    pub misses: u64,
    /// Entries currently cached
    pub entries: u64,
}

/// Overpass street geometry client
pub struct OverpassClient {
    client: Client,
    config: OverpassConfig,
    cache: Cache<BoundsKey, StreetNetwork>,
    last_request: Arc<Mutex<Instant>>,
    in_flight: Arc<parking_lot::Mutex<HashMap<BoundsKey, SharedFetch>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl OverpassClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: OverpassConfig) -> Result<Self, OverpassError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OverpassError::ConnectionFailed(e.to_string()))?;

        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(Duration::from_secs(config.cache_ttl_minutes * 60))
            .build();

        let min_interval = Duration::from_millis(config.min_interval_ms);

        Ok(Self {
            client,
            config,
            cache,
            // Backdated so the first call is not throttled
            last_request: Arc::new(Mutex::new(Instant::now() - min_interval)),
            in_flight: Arc::new(parking_lot::Mutex::new(HashMap::new())),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Fetch the named streets within a bounding box
    ///
    /// Served from cache when a fresh entry exists; otherwise joins any
    /// in-flight fetch for the same quantized box, or starts a new one.
    /// Failures are shared with every joined caller and never cached.
    ///
    /// # Errors
    ///
    /// Returns an error when the upstream call fails or its response
    /// cannot be parsed.
    #[instrument(skip(self), fields(%bounds))]
    pub async fn fetch_streets(&self, bounds: GeoBounds) -> Result<StreetNetwork, OverpassError> {
        let key = bounds.key();

        if let Some(network) = self.cache.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%key, streets = network.len(), "Street cache hit");
            return Ok(network);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let fetch = {
            let mut in_flight = self.in_flight.lock();
            if let Some(existing) = in_flight.get(&key) {
                debug!(%key, "Joining in-flight Overpass request");
                existing.clone()
            } else {
                let fetch = self.start_fetch(bounds, key);
                in_flight.insert(key, fetch.clone());
                fetch
            }
        };

        fetch.await
    }

    /// Cache counters and current size
    #[must_use]
    pub fn cache_stats(&self) -> StreetCacheStats {
        StreetCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        }
    }

    /// Start an upstream fetch that settles the in-flight entry for `key`
    fn start_fetch(&self, bounds: GeoBounds, key: BoundsKey) -> SharedFetch {
        let client = self.client.clone();
        let config = self.config.clone();
        let cache = self.cache.clone();
        let last_request = Arc::clone(&self.last_request);
        let in_flight = Arc::clone(&self.in_flight);

        async move {
            let result = Self::fetch_upstream(&client, &config, &last_request, bounds).await;
            match &result {
                Ok(network) => {
                    cache.insert(key, network.clone()).await;
                    // Flush moka housekeeping so entry_count() reflects the insert
                    cache.run_pending_tasks().await;
                }
                Err(err) => warn!(%key, %err, "Overpass fetch failed"),
            }
            // The entry has settled; later callers go back through the cache
            in_flight.lock().remove(&key);
            result
        }
        .boxed()
        .shared()
    }

    async fn fetch_upstream(
        client: &Client,
        config: &OverpassConfig,
        last_request: &Mutex<Instant>,
        bounds: GeoBounds,
    ) -> Result<StreetNetwork, OverpassError> {
        Self::throttle(last_request, Duration::from_millis(config.min_interval_ms)).await;

        let url = format!("{}/interpreter", config.base_url);
        let query = Self::build_query(config.timeout_secs, bounds);
        debug!(%bounds, "Querying Overpass for street geometry");

        let response = client
            .post(&url)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| OverpassError::from_transport(&e))?;

        if let Some(err) = OverpassError::from_status(response.status()) {
            return Err(err);
        }

        let api: ApiResponse = response
            .json()
            .await
            .map_err(|e| OverpassError::ParseError(e.to_string()))?;

        let network = StreetNetwork::from(api);
        debug!(%bounds, streets = network.len(), "Parsed street network");
        Ok(network)
    }

    /// Enforce the minimum interval between upstream calls
    async fn throttle(last_request: &Mutex<Instant>, min_interval: Duration) {
        let mut last = last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < min_interval {
            let wait = min_interval.saturating_sub(elapsed);
            debug!(?wait, "Throttling Overpass request");
            tokio::time::sleep(wait).await;
        }
        *last = Instant::now();
    }

    /// Overpass QL for all named highway ways in the box, with their nodes
    fn build_query(timeout_secs: u64, bounds: GeoBounds) -> String {
        format!(
            "[out:json][timeout:{timeout_secs}];way[\"highway\"][\"name\"]({},{},{},{});(._;>;);out body;",
            bounds.south(),
            bounds.west(),
            bounds.north(),
            bounds.east()
        )
    }
}

impl fmt::Debug for OverpassClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverpassClient")
            .field("config", &self.config)
            .field("cached_entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}
