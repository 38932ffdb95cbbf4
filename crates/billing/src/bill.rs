use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use comanda_core::{AggregateId, DomainError, Entity};
use comanda_orders::OrderId;

use crate::details::{BillingDetails, FINAL_CONSUMER_ID};
use crate::document::DocumentNumber;

/// Bill identifier, assigned by the billing backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(pub AggregateId);

impl BillId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for BillId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Unique identifier the tax authority assigns to an electronic document.
///
/// 49 digits in the authority's format; the backend generates it, the client
/// only carries it around (status checks, printing).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessKey(String);

impl AccessKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key has the authority's 49-digit shape. Advisory only:
    /// test environments have been seen handing out shorter keys.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 49 && self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl core::fmt::Display for AccessKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issuing environment for electronic documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Test,
    Production,
}

/// Authority-side document status, as reported by the billing backend.
///
/// Serialized with the authority's exact uppercase labels so records round-trip
/// unchanged through the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SriStatus {
    /// Accepted for processing; authorization not yet decided.
    #[serde(rename = "RECIBIDA")]
    Recibida,
    /// Still being processed by the authority.
    #[serde(rename = "EN PROCESO")]
    EnProceso,
    /// Authorized; the document is fiscally valid.
    #[serde(rename = "AUTORIZADO")]
    Autorizado,
    /// Rejected by the authority.
    #[serde(rename = "NO AUTORIZADO")]
    NoAutorizado,
    /// Returned at reception (malformed or inconsistent submission).
    #[serde(rename = "DEVUELTA")]
    Devuelta,
    /// Cancelled through a credit note.
    #[serde(rename = "CANCELADA")]
    Cancelada,
}

impl SriStatus {
    /// Whether the authority may still authorize this document.
    pub fn is_open(self) -> bool {
        matches!(self, SriStatus::Recibida | SriStatus::EnProceso)
    }
}

impl core::fmt::Display for SriStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            SriStatus::Recibida => "RECIBIDA",
            SriStatus::EnProceso => "EN PROCESO",
            SriStatus::Autorizado => "AUTORIZADO",
            SriStatus::NoAutorizado => "NO AUTORIZADO",
            SriStatus::Devuelta => "DEVUELTA",
            SriStatus::Cancelada => "CANCELADA",
        };
        f.write_str(s)
    }
}

/// A bill as persisted by the billing backend.
///
/// The backend owns creation and every mutation; the client holds bills as
/// records and only enforces read-side rules (credit-note eligibility,
/// immutability expectations after authorization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: BillId,
    pub order_id: OrderId,
    pub document_number: DocumentNumber,
    #[serde(flatten)]
    pub customer: BillingDetails,
    /// Amounts in smallest currency unit (e.g., cents).
    pub subtotal: u64,
    pub tax: u64,
    pub total: u64,
    pub sri_status: SriStatus,
    pub access_key: Option<AccessKey>,
    pub environment: Environment,
    pub has_credit_note: bool,
    pub issued_at: DateTime<Utc>,
}

impl Bill {
    pub fn is_authorized(&self) -> bool {
        self.sri_status == SriStatus::Autorizado
    }

    /// Client-side credit-note eligibility, checked before any network call:
    /// the bill must be authorized, not already cancelled through a credit
    /// note, and not issued to the anonymous final-consumer identity.
    pub fn credit_note_eligibility(&self) -> Result<(), DomainError> {
        if self.sri_status != SriStatus::Autorizado {
            return Err(DomainError::invariant(format!(
                "only authorized bills can be cancelled (status is {})",
                self.sri_status
            )));
        }
        if self.has_credit_note {
            return Err(DomainError::conflict(
                "bill already has a credit note",
            ));
        }
        if self.customer.identification == FINAL_CONSUMER_ID {
            return Err(DomainError::invariant(
                "final-consumer bills cannot receive a credit note",
            ));
        }
        Ok(())
    }
}

impl Entity for Bill {
    type Id = BillId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authorized_bill() -> Bill {
        Bill {
            id: BillId::new(AggregateId::new()),
            order_id: OrderId::new(AggregateId::new()),
            document_number: DocumentNumber::new("001", "001", 42).unwrap(),
            customer: BillingDetails {
                identification: "0912345678".to_string(),
                name: "Maria Paredes".to_string(),
                address: Some("Av. 9 de Octubre".to_string()),
                email: Some("maria@example.com".to_string()),
            },
            subtotal: 5000,
            tax: 750,
            total: 5750,
            sri_status: SriStatus::Autorizado,
            access_key: Some(AccessKey::new(
                "0102202601099999999900110010010000000421234567811",
            )),
            environment: Environment::Test,
            has_credit_note: false,
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn authorized_bill_is_eligible_for_credit_note() {
        assert!(authorized_bill().credit_note_eligibility().is_ok());
    }

    #[test]
    fn rejects_credit_note_when_already_credit_noted() {
        let mut bill = authorized_bill();
        bill.has_credit_note = true;
        assert!(matches!(
            bill.credit_note_eligibility().unwrap_err(),
            DomainError::Conflict(_)
        ));
    }

    #[test]
    fn rejects_credit_note_for_unauthorized_bill() {
        let mut bill = authorized_bill();
        bill.sri_status = SriStatus::Recibida;
        assert!(bill.credit_note_eligibility().is_err());
    }

    #[test]
    fn rejects_credit_note_for_final_consumer() {
        let mut bill = authorized_bill();
        bill.customer.identification = FINAL_CONSUMER_ID.to_string();
        assert!(bill.credit_note_eligibility().is_err());
    }

    #[test]
    fn sri_status_round_trips_authority_labels() {
        let json = serde_json::to_string(&SriStatus::EnProceso).unwrap();
        assert_eq!(json, "\"EN PROCESO\"");
        let back: SriStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SriStatus::EnProceso);
    }

    #[test]
    fn bill_serializes_camel_case() {
        let bill = authorized_bill();
        let value = serde_json::to_value(&bill).unwrap();
        assert!(value.get("documentNumber").is_some());
        assert!(value.get("sriStatus").is_some());
        assert!(value.get("hasCreditNote").is_some());
        assert!(value.get("identification").is_some());
    }
}
