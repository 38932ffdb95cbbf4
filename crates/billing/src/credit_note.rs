//! Credit notes: regulator reason codes and the cancellation request.

use serde::{Deserialize, Serialize};

use comanda_core::DomainError;

use crate::bill::BillId;

/// Regulator-enumerated credit-note reason codes ('01'..'07').
///
/// The label is mandated text; free-form detail goes in the request's
/// `description` and is appended to the label, never substituted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    #[serde(rename = "01")]
    MerchandiseReturn,
    #[serde(rename = "02")]
    OperationVoided,
    #[serde(rename = "03")]
    PostEmissionDiscount,
    #[serde(rename = "04")]
    CustomerDataError,
    #[serde(rename = "05")]
    QuantityError,
    #[serde(rename = "06")]
    PriceError,
    #[serde(rename = "07")]
    Other,
}

impl ReasonCode {
    pub const ALL: [ReasonCode; 7] = [
        ReasonCode::MerchandiseReturn,
        ReasonCode::OperationVoided,
        ReasonCode::PostEmissionDiscount,
        ReasonCode::CustomerDataError,
        ReasonCode::QuantityError,
        ReasonCode::PriceError,
        ReasonCode::Other,
    ];

    /// Two-digit regulator code.
    pub fn code(self) -> &'static str {
        match self {
            ReasonCode::MerchandiseReturn => "01",
            ReasonCode::OperationVoided => "02",
            ReasonCode::PostEmissionDiscount => "03",
            ReasonCode::CustomerDataError => "04",
            ReasonCode::QuantityError => "05",
            ReasonCode::PriceError => "06",
            ReasonCode::Other => "07",
        }
    }

    /// Regulator-mandated reason label.
    pub fn label(self) -> &'static str {
        match self {
            ReasonCode::MerchandiseReturn => "Devolución de mercadería",
            ReasonCode::OperationVoided => "Anulación de la operación",
            ReasonCode::PostEmissionDiscount => "Descuento posterior a la emisión",
            ReasonCode::CustomerDataError => "Error en datos del cliente",
            ReasonCode::QuantityError => "Error en cantidades facturadas",
            ReasonCode::PriceError => "Error en precios facturados",
            ReasonCode::Other => "Otros",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        ReasonCode::ALL
            .into_iter()
            .find(|r| r.code() == code)
            .ok_or_else(|| {
                DomainError::validation(format!("unknown credit note reason code: {code}"))
            })
    }
}

/// Request to cancel an authorized bill with a credit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditNoteRequest {
    pub bill_id: BillId,
    pub reason: ReasonCode,
    /// Optional free text, appended to the regulator label.
    pub description: Option<String>,
    /// Tax rate of the original bill, whole percent.
    pub tax_rate: u8,
}

impl CreditNoteRequest {
    /// The reason text submitted to the backend: the mandated label, plus the
    /// operator's detail when present.
    pub fn reason_text(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(detail) if !detail.is_empty() => {
                format!("{}: {}", self.reason.label(), detail)
            }
            _ => self.reason.label().to_string(),
        }
    }
}
