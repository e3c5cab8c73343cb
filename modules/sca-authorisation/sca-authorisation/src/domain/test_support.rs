//! Test doubles and builders shared by the domain tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sca_authorisation_sdk::{
    Authorisation, AuthenticationBackend, AuthorisationCodeResult, AuthorisationType,
    AvailableScaMethods, BackendError, BusinessObject, BusinessObjectProvider, ChallengeData,
    ConsentKind, ConsentObject, CurrencyConversionInfo, DecoupledOutcome, ExecutionResult,
    OtpFormat, PaymentKind, PaymentObject, PsuAuthentication, PsuCredentials, PsuIdData,
    RedirectConfirmation, ScaApproach, ScaConfirmation, ScaContext, ScaMethod, ScaStatus,
    TransactionStatus,
};
use secrecy::ExposeSecret;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::approach::AuthorisationCommon;
use super::backends::AuthenticationBackends;
use super::processor::{AuthorisationProcessor, ExemptionPolicy};
use super::service::Service;
use crate::config::{ExemptionConfig, ScaAuthorisationConfig};
use crate::infra::storage::InMemoryAuthorisationStore;

pub const PAYMENT_ID: &str = "payment-1";
pub const PERIODIC_PAYMENT_ID: &str = "payment-periodic";
pub const CONSENT_ID: &str = "consent-1";
pub const PSU_ID: &str = "alice";
pub const PASSWORD: &str = "12345";

// ============================================================================
// Fixtures
// ============================================================================

pub fn sms_method() -> ScaMethod {
    ScaMethod {
        authentication_method_id: "sms".to_owned(),
        authentication_type: "SMS_OTP".to_owned(),
        authentication_version: None,
        name: Some("SMS to +49 170 ***123".to_owned()),
        explanation: None,
        decoupled: false,
    }
}

pub fn chip_method() -> ScaMethod {
    ScaMethod {
        authentication_method_id: "chip".to_owned(),
        authentication_type: "CHIP_OTP".to_owned(),
        authentication_version: None,
        name: Some("chipTAN".to_owned()),
        explanation: None,
        decoupled: false,
    }
}

pub fn push_method() -> ScaMethod {
    ScaMethod {
        authentication_method_id: "push".to_owned(),
        authentication_type: "PUSH_OTP".to_owned(),
        authentication_version: None,
        name: Some("Banking app".to_owned()),
        explanation: None,
        decoupled: true,
    }
}

pub fn challenge() -> ChallengeData {
    ChallengeData {
        data: vec!["Enter the TAN sent to your phone".to_owned()],
        otp_max_length: Some(6),
        otp_format: Some(OtpFormat::Integer),
        ..ChallengeData::default()
    }
}

pub fn payment(payment_id: &str, kind: PaymentKind) -> BusinessObject {
    BusinessObject::Payment(PaymentObject {
        payment_id: payment_id.to_owned(),
        kind,
        payment_product: "sepa-credit-transfers".to_owned(),
        transaction_status: TransactionStatus::Rcvd,
        psu_data: vec![PsuIdData::new(PSU_ID)],
        multilevel_sca_required: false,
        instructed_amount: None,
    })
}

pub fn account_consent(consent_id: &str) -> BusinessObject {
    BusinessObject::Consent(ConsentObject {
        consent_id: consent_id.to_owned(),
        kind: ConsentKind::Account,
        psu_data: vec![PsuIdData::new(PSU_ID)],
        multilevel_sca_required: false,
    })
}

pub fn credentials() -> PsuCredentials {
    PsuCredentials::new(PASSWORD)
}

/// A stored record as the processor sees it at the start of a call.
pub fn authorisation(status: ScaStatus, approach: ScaApproach) -> Authorisation {
    let now = OffsetDateTime::now_utc();
    Authorisation {
        id: Uuid::new_v4(),
        parent_id: PAYMENT_ID.to_owned(),
        authorisation_type: AuthorisationType::PaymentCreation,
        sca_status: status,
        sca_approach: Some(approach),
        psu_data: Some(PsuIdData::new(PSU_ID)),
        chosen_sca_method: None,
        available_sca_methods: Vec::new(),
        challenge_data: None,
        redirect_uri: None,
        created_at: now,
        expires_at: now + Duration::minutes(15),
    }
}

// ============================================================================
// Mock authentication backend
// ============================================================================

/// Backend operation recorded by [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Authenticate { psu_id: Option<String> },
    ListMethods,
    RequestCode { method_id: String },
    Verify(ScaConfirmation),
    ExecuteWithoutSca,
    ProceedDecoupled { method_id: Option<String> },
    ConfirmRedirect { code: String },
    CurrencyConversion,
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "authenticate",
            Self::ListMethods => "list_methods",
            Self::RequestCode { .. } => "request_code",
            Self::Verify(_) => "verify",
            Self::ExecuteWithoutSca => "execute_without_sca",
            Self::ProceedDecoupled { .. } => "proceed_decoupled",
            Self::ConfirmRedirect { .. } => "confirm_redirect",
            Self::CurrencyConversion => "currency_conversion",
        }
    }
}

/// Scripted backend that records every call.
///
/// Checks the password against [`PASSWORD`] unless an authentication result
/// is scripted explicitly.
pub struct MockBackend {
    authenticate: Mutex<Option<Result<PsuAuthentication, BackendError>>>,
    methods: Mutex<Result<AvailableScaMethods, BackendError>>,
    code: Mutex<Result<AuthorisationCodeResult, BackendError>>,
    verify: Mutex<Result<ExecutionResult, BackendError>>,
    execute: Mutex<Result<ExecutionResult, BackendError>>,
    decoupled: Mutex<Result<DecoupledOutcome, BackendError>>,
    redirect: Mutex<Result<RedirectConfirmation, BackendError>>,
    conversion: Mutex<Result<Option<CurrencyConversionInfo>, BackendError>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            authenticate: Mutex::new(None),
            methods: Mutex::new(Ok(AvailableScaMethods::default())),
            code: Mutex::new(Ok(AuthorisationCodeResult {
                challenge_data: Some(challenge()),
                ..AuthorisationCodeResult::default()
            })),
            verify: Mutex::new(Ok(ExecutionResult::new(TransactionStatus::Acsc))),
            execute: Mutex::new(Ok(ExecutionResult::new(TransactionStatus::Acsc))),
            decoupled: Mutex::new(Ok(DecoupledOutcome {
                sca_status: ScaStatus::ScaMethodSelected,
                psu_message: Some("Please confirm in your banking app".to_owned()),
            })),
            redirect: Mutex::new(Ok(RedirectConfirmation {
                sca_status: ScaStatus::Finalised,
                transaction_status: Some(TransactionStatus::Acsc),
                psu_message: None,
            })),
            conversion: Mutex::new(Ok(None)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_methods(self, methods: Vec<ScaMethod>) -> Self {
        self.set_methods(Ok(AvailableScaMethods {
            methods,
            sca_exempted: false,
        }));
        self
    }

    pub fn with_authentication(self, result: Result<PsuAuthentication, BackendError>) -> Self {
        *self.authenticate.lock().unwrap() = Some(result);
        self
    }

    pub fn with_code(self, result: Result<AuthorisationCodeResult, BackendError>) -> Self {
        *self.code.lock().unwrap() = result;
        self
    }

    pub fn with_verify(self, result: Result<ExecutionResult, BackendError>) -> Self {
        self.set_verify(result);
        self
    }

    pub fn with_execution(self, result: Result<ExecutionResult, BackendError>) -> Self {
        *self.execute.lock().unwrap() = result;
        self
    }

    pub fn with_decoupled(self, result: Result<DecoupledOutcome, BackendError>) -> Self {
        *self.decoupled.lock().unwrap() = result;
        self
    }

    pub fn with_redirect(self, result: Result<RedirectConfirmation, BackendError>) -> Self {
        *self.redirect.lock().unwrap() = result;
        self
    }

    pub fn with_conversion(
        self,
        result: Result<Option<CurrencyConversionInfo>, BackendError>,
    ) -> Self {
        *self.conversion.lock().unwrap() = result;
        self
    }

    pub fn set_methods(&self, result: Result<AvailableScaMethods, BackendError>) {
        *self.methods.lock().unwrap() = result;
    }

    pub fn set_verify(&self, result: Result<ExecutionResult, BackendError>) {
        *self.verify.lock().unwrap() = result;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name() == name)
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AuthenticationBackend for MockBackend {
    async fn authenticate_psu(
        &self,
        _ctx: &ScaContext,
        psu_data: &PsuIdData,
        credentials: &PsuCredentials,
        _object: &BusinessObject,
    ) -> Result<PsuAuthentication, BackendError> {
        self.record(Call::Authenticate {
            psu_id: psu_data.psu_id.clone(),
        });
        if let Some(result) = self.authenticate.lock().unwrap().clone() {
            return result;
        }
        if credentials.password().expose_secret() == PASSWORD {
            Ok(PsuAuthentication::default())
        } else {
            Err(BackendError::PsuCredentialsInvalid)
        }
    }

    async fn list_sca_methods(
        &self,
        _ctx: &ScaContext,
        _object: &BusinessObject,
    ) -> Result<AvailableScaMethods, BackendError> {
        self.record(Call::ListMethods);
        self.methods.lock().unwrap().clone()
    }

    async fn request_authorisation_code(
        &self,
        _ctx: &ScaContext,
        authentication_method_id: &str,
        _object: &BusinessObject,
    ) -> Result<AuthorisationCodeResult, BackendError> {
        self.record(Call::RequestCode {
            method_id: authentication_method_id.to_owned(),
        });
        self.code.lock().unwrap().clone()
    }

    async fn verify_and_execute(
        &self,
        _ctx: &ScaContext,
        confirmation: &ScaConfirmation,
        _object: &BusinessObject,
    ) -> Result<ExecutionResult, BackendError> {
        self.record(Call::Verify(confirmation.clone()));
        self.verify.lock().unwrap().clone()
    }

    async fn execute_without_sca(
        &self,
        _ctx: &ScaContext,
        _object: &BusinessObject,
    ) -> Result<ExecutionResult, BackendError> {
        self.record(Call::ExecuteWithoutSca);
        self.execute.lock().unwrap().clone()
    }

    async fn proceed_decoupled(
        &self,
        _ctx: &ScaContext,
        authentication_method_id: Option<&str>,
        _object: &BusinessObject,
    ) -> Result<DecoupledOutcome, BackendError> {
        self.record(Call::ProceedDecoupled {
            method_id: authentication_method_id.map(str::to_owned),
        });
        self.decoupled.lock().unwrap().clone()
    }

    async fn confirm_redirect(
        &self,
        _ctx: &ScaContext,
        confirmation_code: &str,
        _object: &BusinessObject,
    ) -> Result<RedirectConfirmation, BackendError> {
        self.record(Call::ConfirmRedirect {
            code: confirmation_code.to_owned(),
        });
        self.redirect.lock().unwrap().clone()
    }

    async fn currency_conversion_info(
        &self,
        _ctx: &ScaContext,
        _object: &BusinessObject,
    ) -> Result<Option<CurrencyConversionInfo>, BackendError> {
        self.record(Call::CurrencyConversion);
        self.conversion.lock().unwrap().clone()
    }
}

// ============================================================================
// Mock business object provider
// ============================================================================

/// In-memory payments and consents that record the parent side effects.
#[derive(Default)]
pub struct MockObjects {
    objects: Mutex<HashMap<String, BusinessObject>>,
    transaction_updates: Mutex<Vec<(String, TransactionStatus)>>,
    multilevel_marks: Mutex<Vec<String>>,
}

impl MockObjects {
    /// A single payment, a periodic payment and an account consent.
    pub fn with_defaults() -> Self {
        Self::default()
            .with_object(payment(PAYMENT_ID, PaymentKind::Single))
            .with_object(payment(PERIODIC_PAYMENT_ID, PaymentKind::Periodic))
            .with_object(account_consent(CONSENT_ID))
    }

    pub fn with_object(self, object: BusinessObject) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(object.id().to_owned(), object);
        self
    }

    pub fn object(&self, id: &str) -> Option<BusinessObject> {
        self.objects.lock().unwrap().get(id).cloned()
    }

    pub fn transaction_updates(&self) -> Vec<(String, TransactionStatus)> {
        self.transaction_updates.lock().unwrap().clone()
    }

    pub fn multilevel_marks(&self) -> Vec<String> {
        self.multilevel_marks.lock().unwrap().clone()
    }
}

#[async_trait]
impl BusinessObjectProvider for MockObjects {
    async fn get_business_object(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Option<BusinessObject>, BackendError> {
        let object = self.object(parent_id);
        Ok(object.filter(|o| match o {
            BusinessObject::Payment(_) => authorisation_type.is_payment(),
            BusinessObject::Consent(_) => !authorisation_type.is_payment(),
        }))
    }

    async fn update_transaction_status(
        &self,
        payment_id: &str,
        transaction_status: TransactionStatus,
    ) -> Result<(), BackendError> {
        let mut objects = self.objects.lock().unwrap();
        let Some(BusinessObject::Payment(payment)) = objects.get_mut(payment_id) else {
            return Err(BackendError::NotFound(payment_id.to_owned()));
        };
        payment.transaction_status = transaction_status;
        self.transaction_updates
            .lock()
            .unwrap()
            .push((payment_id.to_owned(), transaction_status));
        Ok(())
    }

    async fn mark_multilevel_sca_required(&self, payment_id: &str) -> Result<(), BackendError> {
        let mut objects = self.objects.lock().unwrap();
        let Some(BusinessObject::Payment(payment)) = objects.get_mut(payment_id) else {
            return Err(BackendError::NotFound(payment_id.to_owned()));
        };
        payment.multilevel_sca_required = true;
        self.multilevel_marks
            .lock()
            .unwrap()
            .push(payment_id.to_owned());
        Ok(())
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn processor(backend: Arc<MockBackend>) -> AuthorisationProcessor {
    AuthorisationProcessor::new(
        AuthenticationBackends::uniform(backend),
        ExemptionPolicy::from(&ExemptionConfig::default()),
    )
}

pub fn common_with(backend: MockBackend, objects: MockObjects) -> Arc<AuthorisationCommon> {
    let backend = Arc::new(backend);
    Arc::new(AuthorisationCommon::new(
        Arc::new(InMemoryAuthorisationStore::new()),
        Arc::new(objects),
        Arc::new(processor(backend)),
        Duration::minutes(15),
    ))
}

/// Fully wired service over the in-memory store and the mocks.
pub struct Harness {
    pub service: Service,
    pub store: Arc<InMemoryAuthorisationStore>,
    pub backend: Arc<MockBackend>,
    pub objects: Arc<MockObjects>,
}

pub fn harness(backend: MockBackend) -> Harness {
    harness_with(backend, &ScaAuthorisationConfig::default())
}

pub fn harness_with(backend: MockBackend, config: &ScaAuthorisationConfig) -> Harness {
    let store = Arc::new(InMemoryAuthorisationStore::new());
    let backend = Arc::new(backend);
    let objects = Arc::new(MockObjects::with_defaults());
    let service = Service::with_backend(config, store.clone(), backend.clone(), objects.clone())
        .expect("valid test configuration");
    Harness {
        service,
        store,
        backend,
        objects,
    }
}
