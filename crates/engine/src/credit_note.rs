//! Credit-note issuance: cancelling an authorized bill.
//!
//! All preconditions are enforced client-side **before** any network call;
//! the backend re-checks them, but the operator gets an immediate answer and
//! the authority is never bothered with a request that cannot succeed.

use comanda_billing::{Bill, CreditNoteRequest};
use comanda_client::CreditNotePayload;
use comanda_core::DomainError;

use crate::error::EngineError;
use crate::BillingEngine;

impl BillingEngine {
    /// Cancel `bill` with a credit note.
    ///
    /// Preconditions (checked locally, zero network calls on failure): the
    /// bill is authorized, has no credit note yet, and was not issued to the
    /// final-consumer identity. On success the backend marks the bill
    /// cancelled; the client only reflects that after a refetch, never
    /// optimistically. Failures carry the collaborator's message verbatim
    /// and are never retried here.
    pub async fn issue_credit_note(
        &self,
        bill: &Bill,
        request: &CreditNoteRequest,
    ) -> Result<(), EngineError> {
        if request.bill_id != bill.id {
            return Err(DomainError::invariant("credit note references a different bill").into());
        }
        bill.credit_note_eligibility()?;

        let _guard = self.in_flight.try_acquire(&bill.id.to_string())?;

        let payload = CreditNotePayload {
            bill_id: bill.id,
            // Regulator label, with the operator's detail appended.
            reason: request.reason_text(),
            custom_description: request
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            tax_rate: request.tax_rate,
        };

        tracing::info!(bill_id = %bill.id, reason = %payload.reason, "issuing credit note");
        self.billing.generate_credit_note(&payload).await?;

        // The backend advanced the credit-note sequence; refresh so the
        // displayed next number is authority-confirmed.
        if let Err(err) = self.sync.refresh().await {
            tracing::warn!(error = %err, "config refresh after credit note failed");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_config, ScriptedBilling, ScriptedConfigApi};
    use comanda_billing::{
        AccessKey, BillId, BillingDetails, DocumentNumber, Environment, ReasonCode, SriStatus,
        FINAL_CONSUMER_ID,
    };
    use comanda_client::CollaboratorError;
    use comanda_core::AggregateId;
    use comanda_orders::OrderId;
    use chrono::Utc;
    use std::sync::Arc;

    fn authorized_bill() -> Bill {
        Bill {
            id: BillId::new(AggregateId::new()),
            order_id: OrderId::new(AggregateId::new()),
            document_number: DocumentNumber::new("001", "001", 124).unwrap(),
            customer: BillingDetails {
                identification: "0912345678".to_string(),
                name: "Cliente".to_string(),
                address: None,
                email: None,
            },
            subtotal: 5000,
            tax: 750,
            total: 5750,
            sri_status: SriStatus::Autorizado,
            access_key: Some(AccessKey::new(crate::testing::TEST_ACCESS_KEY)),
            environment: Environment::Test,
            has_credit_note: false,
            issued_at: Utc::now(),
        }
    }

    fn request_for(bill: &Bill, reason: ReasonCode) -> CreditNoteRequest {
        CreditNoteRequest {
            bill_id: bill.id,
            reason,
            description: None,
            tax_rate: 15,
        }
    }

    fn engine(billing: Arc<ScriptedBilling>, config: Arc<ScriptedConfigApi>) -> BillingEngine {
        BillingEngine::new(billing, config)
    }

    #[tokio::test]
    async fn issues_credit_note_and_refreshes_config() {
        let billing = Arc::new(ScriptedBilling::default());
        let config = Arc::new(ScriptedConfigApi::new(sample_config()));
        let engine = engine(billing.clone(), config.clone());

        let bill = authorized_bill();
        let request = CreditNoteRequest {
            bill_id: bill.id,
            reason: ReasonCode::MerchandiseReturn,
            description: Some("plato equivocado".to_string()),
            tax_rate: 15,
        };
        engine.issue_credit_note(&bill, &request).await.unwrap();

        assert_eq!(billing.credit_note_calls(), 1);
        assert_eq!(config.get_calls(), 1);

        let payload = billing.last_credit_note_payload().unwrap();
        assert_eq!(payload.reason, "Devolución de mercadería: plato equivocado");
        assert_eq!(payload.custom_description.as_deref(), Some("plato equivocado"));
    }

    #[tokio::test]
    async fn rejects_bill_that_already_has_a_credit_note_without_network_call() {
        let billing = Arc::new(ScriptedBilling::default());
        let engine = engine(billing.clone(), Arc::new(ScriptedConfigApi::default()));

        let mut bill = authorized_bill();
        bill.has_credit_note = true;

        let err = engine
            .issue_credit_note(&bill, &request_for(&bill, ReasonCode::Other))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Domain(DomainError::Conflict(_))));
        assert_eq!(billing.credit_note_calls(), 0);
    }

    #[tokio::test]
    async fn rejects_final_consumer_bill_without_network_call() {
        let billing = Arc::new(ScriptedBilling::default());
        let engine = engine(billing.clone(), Arc::new(ScriptedConfigApi::default()));

        let mut bill = authorized_bill();
        bill.customer.identification = FINAL_CONSUMER_ID.to_string();

        let err = engine
            .issue_credit_note(&bill, &request_for(&bill, ReasonCode::Other))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain(DomainError::InvariantViolation(_))
        ));
        assert_eq!(billing.credit_note_calls(), 0);
    }

    #[tokio::test]
    async fn rejects_unauthorized_bill_without_network_call() {
        let billing = Arc::new(ScriptedBilling::default());
        let engine = engine(billing.clone(), Arc::new(ScriptedConfigApi::default()));

        let mut bill = authorized_bill();
        bill.sri_status = SriStatus::Recibida;

        assert!(engine
            .issue_credit_note(&bill, &request_for(&bill, ReasonCode::Other))
            .await
            .is_err());
        assert_eq!(billing.credit_note_calls(), 0);
    }

    #[tokio::test]
    async fn collaborator_failure_is_surfaced_verbatim_without_retry() {
        let billing = Arc::new(ScriptedBilling::default());
        billing.push_credit_note_result(Err(CollaboratorError::Remote {
            status: 422,
            message: "SECUENCIAL REGISTRADO".to_string(),
        }));
        let engine = engine(billing.clone(), Arc::new(ScriptedConfigApi::default()));

        let bill = authorized_bill();
        let err = engine
            .issue_credit_note(&bill, &request_for(&bill, ReasonCode::PriceError))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "SECUENCIAL REGISTRADO");
        assert_eq!(billing.credit_note_calls(), 1);
    }

    #[tokio::test]
    async fn mismatched_bill_id_is_an_invariant_violation() {
        let billing = Arc::new(ScriptedBilling::default());
        let engine = engine(billing.clone(), Arc::new(ScriptedConfigApi::default()));

        let bill = authorized_bill();
        let mut request = request_for(&bill, ReasonCode::Other);
        request.bill_id = BillId::new(AggregateId::new());

        assert!(engine.issue_credit_note(&bill, &request).await.is_err());
        assert_eq!(billing.credit_note_calls(), 0);
    }
}
