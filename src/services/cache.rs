use crate::models::{Campus, TransitRoute};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// In-memory TTL cache of resolved transit routes, keyed by address and campus
///
/// Only found routes are stored; a "no route" answer is looked up again on
/// the next request.
pub struct TransitCache {
    routes: moka::future::Cache<String, TransitRoute>,
    ttl_secs: u64,
}

impl TransitCache {
    /// Create a new cache holding at most `capacity` routes for `ttl_secs`
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let routes = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { routes, ttl_secs }
    }

    pub async fn get(&self, origin: &str, campus: Campus) -> Option<TransitRoute> {
        let key = CacheKey::transit(origin, campus);
        let route = self.routes.get(&key).await;
        if route.is_some() {
            tracing::trace!("Transit cache hit: {}", key);
        } else {
            tracing::trace!("Transit cache miss: {}", key);
        }
        route
    }

    pub async fn insert(&self, origin: &str, campus: Campus, route: TransitRoute) {
        let key = CacheKey::transit(origin, campus);
        self.routes.insert(key, route).await;
    }

    pub async fn invalidate(&self, origin: &str, campus: Campus) {
        self.routes.invalidate(&CacheKey::transit(origin, campus)).await;
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.routes.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Addresses are compared case-insensitively with surrounding whitespace removed
    pub fn transit(origin: &str, campus: Campus) -> String {
        format!("transit:{}:{}", campus.slug(), origin.trim().to_lowercase())
    }
}
