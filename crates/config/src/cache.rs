//! Client-side cache of the backend-owned configuration.
//!
//! Explicit rules instead of ad-hoc storage calls:
//! - a successful fetch **replaces** the cached value (invalidation),
//! - a failed fetch **keeps** the last good value (fallback),
//! - staleness is observable, never silently papered over.
//!
//! The cache itself performs no IO; whoever fetches (the engine's config
//! synchronizer) decides when to call [`ConfigCache::store`].

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::settings::RestaurantConfig;

#[derive(Debug, Clone)]
struct CachedConfig {
    config: RestaurantConfig,
    fetched_at: DateTime<Utc>,
}

/// Shared in-memory cache of the restaurant configuration.
#[derive(Debug, Default)]
pub struct ConfigCache {
    inner: RwLock<Option<CachedConfig>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached value after a successful fetch.
    pub async fn store(&self, config: RestaurantConfig) {
        let mut guard = self.inner.write().await;
        tracing::debug!(
            invoice_sequence = config.billing.invoice_sequence,
            "config cache updated"
        );
        *guard = Some(CachedConfig {
            config,
            fetched_at: Utc::now(),
        });
    }

    /// Last good configuration, if any fetch has ever succeeded.
    pub async fn get(&self) -> Option<RestaurantConfig> {
        self.inner.read().await.as_ref().map(|c| c.config.clone())
    }

    /// When the cached value was fetched.
    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.as_ref().map(|c| c.fetched_at)
    }

    /// Whether the cached value is older than `max_age` (or absent).
    pub async fn is_stale(&self, max_age: Duration) -> bool {
        match self.inner.read().await.as_ref() {
            Some(cached) => Utc::now().signed_duration_since(cached.fetched_at) > max_age,
            None => true,
        }
    }

    /// Drop the cached value (e.g. after a destructive system reset).
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }
}
