use serde::{Deserialize, Serialize};

use comanda_billing::{DocumentNumber, Environment};
use comanda_core::DomainError;

/// Contact information for the restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Tax regime the restaurant operates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxRegime {
    General,
    RimpeEntrepreneur,
    RimpePopular,
}

/// Fiscal configuration for electronic invoicing.
///
/// Owned by the backend. The sequence counters reflect the last persisted
/// documents; they are advanced exclusively server-side on successful
/// issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingConfig {
    /// 13-digit taxpayer registry number.
    pub ruc: String,
    pub legal_name: String,
    pub fiscal_email: Option<String>,
    pub establishment_code: String,
    pub emission_point_code: String,
    pub tax_regime: TaxRegime,
    pub environment: Environment,
    /// Sequence of the last persisted invoice (0 = none yet).
    pub invoice_sequence: u64,
    /// Sequence of the last persisted credit note (0 = none yet).
    pub credit_note_sequence: u64,
}

impl BillingConfig {
    /// Display-only estimate of the next invoice number (`current + 1`).
    ///
    /// Never persist this: the authoritative increment happens server-side,
    /// which is what prevents duplicate numbers across concurrent operators.
    pub fn next_invoice_number(&self) -> Result<DocumentNumber, DomainError> {
        DocumentNumber::new(
            &self.establishment_code,
            &self.emission_point_code,
            self.invoice_sequence + 1,
        )
    }

    /// Display-only estimate of the next credit-note number.
    pub fn next_credit_note_number(&self) -> Result<DocumentNumber, DomainError> {
        DocumentNumber::new(
            &self.establishment_code,
            &self.emission_point_code,
            self.credit_note_sequence + 1,
        )
    }
}

/// The configuration aggregate as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantConfig {
    pub name: String,
    pub contact: ContactInfo,
    pub billing: BillingConfig,
}

/// Partial update for [`ContactInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfoPatch {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update for [`BillingConfig`].
///
/// Deliberately has no sequence fields: counters are advanced exclusively by
/// the backend when it persists a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingConfigPatch {
    pub ruc: Option<String>,
    pub legal_name: Option<String>,
    pub fiscal_email: Option<String>,
    pub establishment_code: Option<String>,
    pub emission_point_code: Option<String>,
    pub tax_regime: Option<TaxRegime>,
    pub environment: Option<Environment>,
}

/// Partial update for [`RestaurantConfig`].
///
/// Nested sub-objects are merged field-wise, never replaced wholesale: a
/// patch that only sets `billing.environment` leaves the rest of the billing
/// section untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RestaurantConfigPatch {
    pub name: Option<String>,
    pub contact: Option<ContactInfoPatch>,
    pub billing: Option<BillingConfigPatch>,
}

impl RestaurantConfig {
    /// Apply a partial update, merging nested sub-objects field-wise.
    pub fn merge(&mut self, patch: RestaurantConfigPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(contact) = patch.contact {
            if let Some(email) = contact.email {
                self.contact.email = Some(email);
            }
            if let Some(phone) = contact.phone {
                self.contact.phone = Some(phone);
            }
            if let Some(address) = contact.address {
                self.contact.address = Some(address);
            }
        }
        if let Some(billing) = patch.billing {
            if let Some(ruc) = billing.ruc {
                self.billing.ruc = ruc;
            }
            if let Some(legal_name) = billing.legal_name {
                self.billing.legal_name = legal_name;
            }
            if let Some(fiscal_email) = billing.fiscal_email {
                self.billing.fiscal_email = Some(fiscal_email);
            }
            if let Some(establishment_code) = billing.establishment_code {
                self.billing.establishment_code = establishment_code;
            }
            if let Some(emission_point_code) = billing.emission_point_code {
                self.billing.emission_point_code = emission_point_code;
            }
            if let Some(tax_regime) = billing.tax_regime {
                self.billing.tax_regime = tax_regime;
            }
            if let Some(environment) = billing.environment {
                self.billing.environment = environment;
            }
        }
    }
}
