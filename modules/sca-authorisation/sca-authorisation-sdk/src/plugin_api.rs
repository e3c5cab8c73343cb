//! Plugin API traits for the bank side of the SCA flow.
//!
//! A bank integration implements [`AuthenticationBackend`] (talks to the
//! core-banking system) and [`BusinessObjectProvider`] (reads and annotates
//! payments and consents). The core only orchestrates; it never
//! authenticates a PSU or moves money itself.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{
    AuthorisationId, AuthorisationType, BusinessObject, ChallengeData, CurrencyConversionInfo,
    PsuCredentials, PsuIdData, ScaApproach, ScaMethod, ScaStatus, TransactionStatus,
};

/// Call context handed to every backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaContext {
    pub authorisation_id: AuthorisationId,
    pub authorisation_type: AuthorisationType,
    pub sca_approach: ScaApproach,
    pub psu_data: Option<PsuIdData>,
}

/// Successful first-factor authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PsuAuthentication {
    /// The bank waives SCA for this operation.
    pub sca_exempted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableScaMethods {
    pub methods: Vec<ScaMethod>,
    pub sca_exempted: bool,
}

/// Result of requesting an authentication code for a chosen method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorisationCodeResult {
    pub chosen_sca_method: Option<ScaMethod>,
    pub challenge_data: Option<ChallengeData>,
    pub sca_exempted: bool,
    pub psu_message: Option<String>,
}

impl AuthorisationCodeResult {
    /// Neither a method, a challenge nor an exemption: nothing the PSU could act on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chosen_sca_method.is_none() && self.challenge_data.is_none() && !self.sca_exempted
    }
}

/// Second-factor confirmation presented to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaConfirmation {
    /// TAN/OTP entered by the PSU.
    AuthenticationCode(String),
    /// The PSU confirmed on the out-of-band channel.
    Decoupled,
}

/// Result of executing the protected operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub transaction_status: TransactionStatus,
    /// The bank applied an SCA exemption to this execution.
    pub sca_exempted: bool,
    pub currency_conversion: Option<CurrencyConversionInfo>,
    pub psu_message: Option<String>,
}

impl ExecutionResult {
    #[must_use]
    pub fn new(transaction_status: TransactionStatus) -> Self {
        Self {
            transaction_status,
            sca_exempted: false,
            currency_conversion: None,
            psu_message: None,
        }
    }
}

/// Result of starting an out-of-band authorisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoupledOutcome {
    pub sca_status: ScaStatus,
    pub psu_message: Option<String>,
}

/// Backend view of a redirect authorisation after the PSU returned from the
/// bank page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectConfirmation {
    pub sca_status: ScaStatus,
    pub transaction_status: Option<TransactionStatus>,
    pub psu_message: Option<String>,
}

/// Core-banking capability the processor drives.
///
/// Implementations are selected per payment kind / consent kind.
#[async_trait]
pub trait AuthenticationBackend: Send + Sync {
    /// Check PSU id and password.
    ///
    /// # Errors
    ///
    /// - `PsuCredentialsInvalid` if the bank rejects the credentials
    /// - `Technical` for connectivity or internal failures
    async fn authenticate_psu(
        &self,
        ctx: &ScaContext,
        psu_data: &PsuIdData,
        credentials: &PsuCredentials,
        object: &BusinessObject,
    ) -> Result<PsuAuthentication, BackendError>;

    /// SCA methods the authenticated PSU may use for this object.
    ///
    /// # Errors
    ///
    /// `Technical` for connectivity or internal failures.
    async fn list_sca_methods(
        &self,
        ctx: &ScaContext,
        object: &BusinessObject,
    ) -> Result<AvailableScaMethods, BackendError>;

    /// Generate and send an authentication code for the chosen method.
    ///
    /// # Errors
    ///
    /// - `Format` if the method cannot be used
    /// - `Technical` for connectivity or internal failures
    async fn request_authorisation_code(
        &self,
        ctx: &ScaContext,
        authentication_method_id: &str,
        object: &BusinessObject,
    ) -> Result<AuthorisationCodeResult, BackendError>;

    /// Verify the second factor and execute the operation.
    ///
    /// # Errors
    ///
    /// - `ScaInvalid` if the code is wrong; `attempts_exhausted` ends the flow
    /// - `Technical` for connectivity or internal failures
    async fn verify_and_execute(
        &self,
        ctx: &ScaContext,
        confirmation: &ScaConfirmation,
        object: &BusinessObject,
    ) -> Result<ExecutionResult, BackendError>;

    /// Execute the operation when no SCA is needed or an exemption applies.
    ///
    /// # Errors
    ///
    /// `Technical` for connectivity or internal failures.
    async fn execute_without_sca(
        &self,
        ctx: &ScaContext,
        object: &BusinessObject,
    ) -> Result<ExecutionResult, BackendError>;

    /// Start an out-of-band authorisation and return immediately.
    ///
    /// # Errors
    ///
    /// `Technical` for connectivity or internal failures.
    async fn proceed_decoupled(
        &self,
        ctx: &ScaContext,
        authentication_method_id: Option<&str>,
        object: &BusinessObject,
    ) -> Result<DecoupledOutcome, BackendError>;

    /// Check the redirect confirmation code and report the outcome the bank
    /// already recorded for this authorisation.
    ///
    /// # Errors
    ///
    /// - `ScaInvalid` if the confirmation code does not match
    /// - `Technical` for connectivity or internal failures
    async fn confirm_redirect(
        &self,
        ctx: &ScaContext,
        confirmation_code: &str,
        object: &BusinessObject,
    ) -> Result<RedirectConfirmation, BackendError>;

    /// Current conversion figures for a payment. `None` when no conversion applies.
    ///
    /// # Errors
    ///
    /// `Technical` for connectivity or internal failures.
    async fn currency_conversion_info(
        &self,
        ctx: &ScaContext,
        object: &BusinessObject,
    ) -> Result<Option<CurrencyConversionInfo>, BackendError>;
}

/// Read access to payments and consents plus the two parent-level side
/// effects the SCA flow produces.
#[async_trait]
pub trait BusinessObjectProvider: Send + Sync {
    /// # Errors
    ///
    /// `Technical` for connectivity or internal failures.
    async fn get_business_object(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Option<BusinessObject>, BackendError>;

    /// # Errors
    ///
    /// `NotFound` if the payment is unknown.
    async fn update_transaction_status(
        &self,
        payment_id: &str,
        transaction_status: TransactionStatus,
    ) -> Result<(), BackendError>;

    /// Flag the payment as needing authorisation from further PSUs.
    ///
    /// # Errors
    ///
    /// `NotFound` if the payment is unknown.
    async fn mark_multilevel_sca_required(&self, payment_id: &str) -> Result<(), BackendError>;
}
