//! Collaborator clients + engine wiring.

use std::sync::Arc;

use comanda_client::{BillingService, ConfigApi, HttpBillingService, HttpConfigApi};
use comanda_engine::BillingEngine;

/// Shared application services, injected into every handler.
pub struct AppServices {
    pub engine: BillingEngine,
    /// Direct collaborator handle for pass-through reads (bill history).
    pub billing: Arc<dyn BillingService>,
}

impl AppServices {
    pub fn new(billing: Arc<dyn BillingService>, config_api: Arc<dyn ConfigApi>) -> Self {
        Self {
            engine: BillingEngine::new(Arc::clone(&billing), config_api),
            billing,
        }
    }

    /// Production wiring: HTTP clients against the billing backend.
    pub fn from_url(base_url: &str) -> Self {
        let http = reqwest::Client::new();
        let billing: Arc<dyn BillingService> =
            Arc::new(HttpBillingService::new(http.clone(), base_url));
        let config_api: Arc<dyn ConfigApi> = Arc::new(HttpConfigApi::new(http, base_url));
        Self::new(billing, config_api)
    }
}
