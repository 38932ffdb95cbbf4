//! reqwest-backed implementations of the collaborator contracts.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use comanda_billing::{AccessKey, ProcessingStep};
use comanda_config::{RestaurantConfig, RestaurantConfigPatch};

use crate::dto::{
    BillPage, CreditNotePayload, GenerateInvoiceRequest, GenerateInvoiceResponse, ListBillsParams,
    StatusSnapshot,
};
use crate::error::CollaboratorError;
use crate::service::{BillingService, ConfigApi, IssuanceProgress};

/// Error envelope the backend uses: `{ "error": code, "message": text }`,
/// sometimes just `{ "message": text }`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

/// Interpret a response: 2xx decodes the expected body, everything else
/// becomes a `Remote` error carrying the backend's message verbatim.
async fn interpret<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CollaboratorError> {
    let status = response.status();
    if status.is_success() {
        let bytes = response.bytes().await?;
        return serde_json::from_slice(&bytes)
            .map_err(|e| CollaboratorError::Decode(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|env| env.message.or(env.error))
        .unwrap_or(body);
    let message = if message.trim().is_empty() {
        format!("billing backend returned HTTP {}", status.as_u16())
    } else {
        message
    };

    Err(CollaboratorError::Remote {
        status: status.as_u16(),
        message,
    })
}

/// Like [`interpret`], for endpoints whose success body is irrelevant.
async fn interpret_empty(response: reqwest::Response) -> Result<(), CollaboratorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    interpret::<serde_json::Value>(response).await.map(|_| ())
}

/// HTTP client for the billing backend.
#[derive(Debug, Clone)]
pub struct HttpBillingService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBillingService {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl BillingService for HttpBillingService {
    async fn generate_invoice(
        &self,
        request: &GenerateInvoiceRequest,
        progress: &dyn IssuanceProgress,
    ) -> Result<GenerateInvoiceResponse, CollaboratorError> {
        // One round trip covers the backend's generate/sign/submit chain;
        // report each stage as it is entered so the caller's state machine
        // walks the chain in order.
        progress.step(ProcessingStep::Generating);
        let builder = self.http.post(self.url("/billing/invoices")).json(request);

        progress.step(ProcessingStep::Signing);
        progress.step(ProcessingStep::Sending);
        let response = builder.send().await?;

        // Headers are back; the body carries the authority verdict.
        progress.step(ProcessingStep::WaitingAuthorization);
        let parsed: GenerateInvoiceResponse = interpret(response).await?;

        tracing::debug!(
            success = parsed.success,
            access_key = parsed.access_key.as_ref().map(|k| k.as_str()),
            "invoice generation response received"
        );
        Ok(parsed)
    }

    async fn generate_credit_note(
        &self,
        request: &CreditNotePayload,
    ) -> Result<(), CollaboratorError> {
        let response = self
            .http
            .post(self.url("/billing/credit-notes"))
            .json(request)
            .send()
            .await?;
        interpret_empty(response).await
    }

    async fn check_status(
        &self,
        access_key: &AccessKey,
    ) -> Result<StatusSnapshot, CollaboratorError> {
        let response = self
            .http
            .get(self.url(&format!("/billing/status/{}", access_key)))
            .send()
            .await?;
        interpret(response).await
    }

    async fn list_bills(&self, params: &ListBillsParams) -> Result<BillPage, CollaboratorError> {
        let response = self
            .http
            .get(self.url("/billing/invoices"))
            .query(&params.query_pairs())
            .send()
            .await?;
        interpret(response).await
    }

    async fn reset_system(&self) -> Result<(), CollaboratorError> {
        let response = self.http.post(self.url("/billing/reset")).send().await?;
        interpret_empty(response).await
    }
}

/// HTTP client for the backend's configuration endpoint.
#[derive(Debug, Clone)]
pub struct HttpConfigApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpConfigApi {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ConfigApi for HttpConfigApi {
    async fn get(&self) -> Result<RestaurantConfig, CollaboratorError> {
        let response = self.http.get(self.url("/config")).send().await?;
        interpret(response).await
    }

    async fn update(
        &self,
        patch: &RestaurantConfigPatch,
    ) -> Result<RestaurantConfig, CollaboratorError> {
        let response = self
            .http
            .patch(self.url("/config"))
            .json(patch)
            .send()
            .await?;
        interpret(response).await
    }
}
