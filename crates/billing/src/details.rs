//! Customer billing details and pre-network validation.

use serde::{Deserialize, Serialize};

use comanda_core::{DomainError, ValueObject};

/// Identification used for anonymous low-value sales ("consumidor final").
pub const FINAL_CONSUMER_ID: &str = "9999999999999";

/// Regulatory cap for final-consumer sales: $50.00, in cents.
pub const FINAL_CONSUMER_THRESHOLD_CENTS: u64 = 5_000;

/// Customer data captured at issuance time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingDetails {
    pub identification: String,
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
}

impl BillingDetails {
    pub fn is_final_consumer(&self) -> bool {
        self.identification == FINAL_CONSUMER_ID
    }

    /// Hard validation, run before any network call: identification and
    /// display name are required; everything else is advisory.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.identification.trim().is_empty() {
            return Err(DomainError::validation(
                "customer identification is required",
            ));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("customer name is required"));
        }
        Ok(())
    }

    /// Advisory warnings the operator must see before issuing. None of these
    /// block issuance; the operator decides whether to continue.
    pub fn warnings(&self, total_cents: u64) -> Vec<IssueWarning> {
        let mut warnings = Vec::new();

        if self.is_final_consumer() && total_cents > FINAL_CONSUMER_THRESHOLD_CENTS {
            warnings.push(IssueWarning::FinalConsumerThresholdExceeded { total: total_cents });
        }

        if !self.is_final_consumer() {
            let deliverable = self
                .email
                .as_deref()
                .is_some_and(is_plausible_email);
            if !deliverable {
                warnings.push(IssueWarning::NoEmailDelivery);
            }
        }

        warnings
    }
}

impl ValueObject for BillingDetails {}

/// Advisory warning surfaced to the operator before issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueWarning {
    /// Final-consumer sale above the regulatory value cap; allowed, but the
    /// operator must be told.
    FinalConsumerThresholdExceeded { total: u64 },
    /// No usable email on file: the bill will not be delivered automatically.
    NoEmailDelivery,
}

/// Minimal plausibility check: something before and after an `@`, and a dot
/// in the domain part. Full RFC validation is the backend's problem.
fn is_plausible_email(s: &str) -> bool {
    let s = s.trim();
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
}
