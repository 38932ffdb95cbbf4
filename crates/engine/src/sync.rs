//! Sequence/config synchronizer.
//!
//! After any successful issuance the displayed "next document number" must
//! reflect authority-confirmed state, not a client-side guess. The engine
//! re-fetches the configuration through [`ConfigApi`] into the explicit
//! [`ConfigCache`]; the cache's rules (replace on success, keep last-good on
//! failure) live in `comanda-config`.

use std::sync::Arc;

use comanda_client::{CollaboratorError, ConfigApi};
use comanda_config::{ConfigCache, RestaurantConfig, RestaurantConfigPatch};

/// Fetches configuration from the backend into the shared cache.
pub struct ConfigSynchronizer {
    api: Arc<dyn ConfigApi>,
    cache: Arc<ConfigCache>,
}

impl ConfigSynchronizer {
    pub fn new(api: Arc<dyn ConfigApi>, cache: Arc<ConfigCache>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &Arc<ConfigCache> {
        &self.cache
    }

    /// Fetch fresh configuration. On success the cache is replaced; on
    /// failure the last good value stays put and the error is returned.
    pub async fn refresh(&self) -> Result<RestaurantConfig, CollaboratorError> {
        match self.api.get().await {
            Ok(config) => {
                self.cache.store(config.clone()).await;
                Ok(config)
            }
            Err(err) => {
                tracing::warn!(error = %err, "config fetch failed; keeping last good value");
                Err(err)
            }
        }
    }

    /// Cached configuration, if any fetch has succeeded so far.
    pub async fn current(&self) -> Option<RestaurantConfig> {
        self.cache.get().await
    }

    /// Cached configuration, fetching once if the cache is still empty.
    pub async fn current_or_fetch(&self) -> Result<RestaurantConfig, CollaboratorError> {
        if let Some(config) = self.cache.get().await {
            return Ok(config);
        }
        self.refresh().await
    }

    /// Push a partial update to the backend and cache the merged result it
    /// returns.
    pub async fn update(
        &self,
        patch: &RestaurantConfigPatch,
    ) -> Result<RestaurantConfig, CollaboratorError> {
        let config = self.api.update(patch).await?;
        self.cache.store(config.clone()).await;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_config, ScriptedConfigApi};

    #[tokio::test]
    async fn refresh_replaces_cache_on_success() {
        let api = Arc::new(ScriptedConfigApi::new(sample_config()));
        let sync = ConfigSynchronizer::new(api.clone(), Arc::new(ConfigCache::new()));

        let fetched = sync.refresh().await.unwrap();
        assert_eq!(sync.current().await.unwrap(), fetched);

        api.set_invoice_sequence(999);
        let fetched = sync.refresh().await.unwrap();
        assert_eq!(fetched.billing.invoice_sequence, 999);
        assert_eq!(
            sync.current().await.unwrap().billing.invoice_sequence,
            999
        );
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_good_value() {
        let api = Arc::new(ScriptedConfigApi::new(sample_config()));
        let sync = ConfigSynchronizer::new(api.clone(), Arc::new(ConfigCache::new()));
        sync.refresh().await.unwrap();

        api.fail_next_gets(true);
        assert!(sync.refresh().await.is_err());
        // Fallback rule: the cached value survives the failed fetch.
        assert_eq!(sync.current().await.unwrap(), sample_config());
    }

    #[tokio::test]
    async fn current_or_fetch_only_fetches_when_empty() {
        let api = Arc::new(ScriptedConfigApi::new(sample_config()));
        let sync = ConfigSynchronizer::new(api.clone(), Arc::new(ConfigCache::new()));

        sync.current_or_fetch().await.unwrap();
        sync.current_or_fetch().await.unwrap();
        assert_eq!(api.get_calls(), 1);
    }
}
