//! Scripted collaborator doubles for engine tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use comanda_billing::{
    AccessKey, BillId, BillingDetails, Environment, IssuanceState, ProcessingStep, SriStatus,
};
use comanda_client::{
    BillPage, BillingService, CollaboratorError, ConfigApi, CreditNotePayload,
    GenerateInvoiceRequest, GenerateInvoiceResponse, IssuanceProgress, ListBillsParams,
    Pagination, SriResponsePayload, StatusSnapshot,
};
use comanda_config::{
    BillingConfig, ContactInfo, RestaurantConfig, RestaurantConfigPatch, TaxRegime,
};
use comanda_core::{Aggregate, AggregateId};
use comanda_orders::{AddItem, CreateOrder, Order, OrderCommand, OrderId, OrderType};

use crate::orchestrator::IssuanceObserver;

fn lock<'a, T>(mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) const TEST_ACCESS_KEY: &str = "1102202601099999999900110010010000001241234567818";

/// Order totalling $57.50 (2 x $15.00 + 1 x $27.50).
pub(crate) fn sample_order() -> Order {
    let id = OrderId::new(AggregateId::new());
    let mut order = Order::empty(id);
    let created = order
        .handle(&OrderCommand::CreateOrder(CreateOrder {
            order_id: id,
            customer_name: "Mesa 4".to_string(),
            order_type: OrderType::DineIn,
            order_number: Some("A-014".to_string()),
            occurred_at: Utc::now(),
        }))
        .expect("create order");
    order.apply(&created[0]);

    for (name, quantity, unit_price) in [("Parrillada", 2i64, 1_500u64), ("Cazuela", 1, 2_750)] {
        let events = order
            .handle(&OrderCommand::AddItem(AddItem {
                order_id: id,
                name: name.to_string(),
                quantity,
                unit_price,
                occurred_at: Utc::now(),
            }))
            .expect("add item");
        order.apply(&events[0]);
    }
    order
}

pub(crate) fn sample_details(identification: &str) -> BillingDetails {
    BillingDetails {
        identification: identification.to_string(),
        name: "Cliente de Prueba".to_string(),
        address: None,
        email: Some("cliente@example.com".to_string()),
    }
}

pub(crate) fn authorized_response() -> GenerateInvoiceResponse {
    GenerateInvoiceResponse {
        success: true,
        invoice_id: Some(BillId::new(AggregateId::new())),
        access_key: Some(AccessKey::new(TEST_ACCESS_KEY)),
        sri_response: Some(SriResponsePayload {
            estado: Some(SriStatus::Autorizado),
            fecha_autorizacion: Some(Utc::now()),
            mensaje: None,
        }),
    }
}

pub(crate) fn pending_response() -> GenerateInvoiceResponse {
    GenerateInvoiceResponse {
        success: true,
        invoice_id: Some(BillId::new(AggregateId::new())),
        access_key: Some(AccessKey::new(TEST_ACCESS_KEY)),
        sri_response: Some(SriResponsePayload {
            estado: Some(SriStatus::Recibida),
            fecha_autorizacion: None,
            mensaje: None,
        }),
    }
}

pub(crate) fn rejected_response(message: &str) -> GenerateInvoiceResponse {
    GenerateInvoiceResponse {
        success: false,
        invoice_id: None,
        access_key: None,
        sri_response: Some(SriResponsePayload {
            estado: Some(SriStatus::NoAutorizado),
            fecha_autorizacion: None,
            mensaje: Some(message.to_string()),
        }),
    }
}

pub(crate) fn sample_config() -> RestaurantConfig {
    RestaurantConfig {
        name: "La Fogata".to_string(),
        contact: ContactInfo::default(),
        billing: BillingConfig {
            ruc: "0999999999001".to_string(),
            legal_name: "La Fogata S.A.".to_string(),
            fiscal_email: Some("facturas@lafogata.ec".to_string()),
            establishment_code: "001".to_string(),
            emission_point_code: "001".to_string(),
            tax_regime: TaxRegime::General,
            environment: Environment::Test,
            invoice_sequence: 123,
            credit_note_sequence: 7,
        },
    }
}

/// Scripted [`BillingService`] with call counters and an optional hold that
/// keeps invoice calls open until released (for in-flight tests).
#[derive(Default)]
pub(crate) struct ScriptedBilling {
    invoice_responses: Mutex<VecDeque<Result<GenerateInvoiceResponse, CollaboratorError>>>,
    credit_note_results: Mutex<VecDeque<Result<(), CollaboratorError>>>,
    status_snapshots: Mutex<VecDeque<Result<StatusSnapshot, CollaboratorError>>>,
    reset_results: Mutex<VecDeque<Result<(), CollaboratorError>>>,
    invoice_calls: AtomicUsize,
    credit_note_calls: AtomicUsize,
    status_calls: AtomicUsize,
    reset_calls: AtomicUsize,
    hold: AtomicBool,
    entered: Notify,
    release: Notify,
    last_credit_note: Mutex<Option<CreditNotePayload>>,
}

impl ScriptedBilling {
    pub(crate) fn push_invoice_response(
        &self,
        response: Result<GenerateInvoiceResponse, CollaboratorError>,
    ) {
        lock(&self.invoice_responses).push_back(response);
    }

    pub(crate) fn push_credit_note_result(&self, result: Result<(), CollaboratorError>) {
        lock(&self.credit_note_results).push_back(result);
    }

    pub(crate) fn push_status_snapshot(&self, snapshot: StatusSnapshot) {
        lock(&self.status_snapshots).push_back(Ok(snapshot));
    }

    pub(crate) fn push_reset_result(&self, result: Result<(), CollaboratorError>) {
        lock(&self.reset_results).push_back(result);
    }

    pub(crate) fn invoice_calls(&self) -> usize {
        self.invoice_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn credit_note_calls(&self) -> usize {
        self.credit_note_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn hold_invoice_calls(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn wait_until_held(&self) {
        self.entered.notified().await;
    }

    pub(crate) fn release_held_calls(&self) {
        self.hold.store(false, Ordering::SeqCst);
        self.release.notify_waiters();
    }

    pub(crate) fn last_credit_note_payload(&self) -> Option<CreditNotePayload> {
        lock(&self.last_credit_note).clone()
    }
}

// Captured payloads for assertions.
impl ScriptedBilling {
    fn record_credit_note(&self, payload: &CreditNotePayload) {
        *lock(&self.last_credit_note) = Some(payload.clone());
    }
}

#[async_trait]
impl BillingService for ScriptedBilling {
    async fn generate_invoice(
        &self,
        _request: &GenerateInvoiceRequest,
        progress: &dyn IssuanceProgress,
    ) -> Result<GenerateInvoiceResponse, CollaboratorError> {
        self.invoice_calls.fetch_add(1, Ordering::SeqCst);

        if self.hold.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        for step in [
            ProcessingStep::Generating,
            ProcessingStep::Signing,
            ProcessingStep::Sending,
            ProcessingStep::WaitingAuthorization,
        ] {
            progress.step(step);
        }

        lock(&self.invoice_responses)
            .pop_front()
            .expect("test did not script an invoice response")
    }

    async fn generate_credit_note(
        &self,
        request: &CreditNotePayload,
    ) -> Result<(), CollaboratorError> {
        self.credit_note_calls.fetch_add(1, Ordering::SeqCst);
        self.record_credit_note(request);
        lock(&self.credit_note_results).pop_front().unwrap_or(Ok(()))
    }

    async fn check_status(
        &self,
        _access_key: &AccessKey,
    ) -> Result<StatusSnapshot, CollaboratorError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.status_snapshots)
            .pop_front()
            .expect("test did not script a status snapshot")
    }

    async fn list_bills(&self, _params: &ListBillsParams) -> Result<BillPage, CollaboratorError> {
        Ok(BillPage {
            data: Vec::new(),
            pagination: Pagination { total: 0 },
        })
    }

    async fn reset_system(&self) -> Result<(), CollaboratorError> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.reset_results).pop_front().unwrap_or(Ok(()))
    }
}

/// Scripted [`ConfigApi`] serving a mutable configuration snapshot.
pub(crate) struct ScriptedConfigApi {
    config: Mutex<RestaurantConfig>,
    fail_gets: AtomicBool,
    get_calls: AtomicUsize,
}

impl Default for ScriptedConfigApi {
    fn default() -> Self {
        Self::new(sample_config())
    }
}

impl ScriptedConfigApi {
    pub(crate) fn new(config: RestaurantConfig) -> Self {
        Self {
            config: Mutex::new(config),
            fail_gets: AtomicBool::new(false),
            get_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_invoice_sequence(&self, sequence: u64) {
        lock(&self.config).billing.invoice_sequence = sequence;
    }

    pub(crate) fn fail_next_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigApi for ScriptedConfigApi {
    async fn get(&self) -> Result<RestaurantConfig, CollaboratorError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Remote {
                status: 503,
                message: "config service unavailable".to_string(),
            });
        }
        Ok(lock(&self.config).clone())
    }

    async fn update(
        &self,
        patch: &RestaurantConfigPatch,
    ) -> Result<RestaurantConfig, CollaboratorError> {
        let mut config = lock(&self.config);
        config.merge(patch.clone());
        Ok(config.clone())
    }
}

/// Observer recording every state change for sequence assertions.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    states: Mutex<Vec<IssuanceState>>,
}

impl RecordingObserver {
    pub(crate) fn state_names(&self) -> Vec<String> {
        lock(&self.states)
            .iter()
            .map(|state| {
                match state {
                    IssuanceState::Idle => "idle",
                    IssuanceState::Validating => "validating",
                    IssuanceState::Generating => "generating",
                    IssuanceState::Signing => "signing",
                    IssuanceState::Sending => "sending",
                    IssuanceState::WaitingAuthorization => "waiting_authorization",
                    IssuanceState::Authorized { .. } => "authorized",
                    IssuanceState::Pending { .. } => "pending",
                    IssuanceState::Error { .. } => "error",
                }
                .to_string()
            })
            .collect()
    }
}

impl IssuanceObserver for RecordingObserver {
    fn state_changed(&self, state: &IssuanceState) {
        lock(&self.states).push(state.clone());
    }
}
