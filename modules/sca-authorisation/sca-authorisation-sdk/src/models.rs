//! Domain models for the SCA authorisation module.
//!
//! Names and wire values follow the Berlin Group `NextGenPSD2` vocabulary
//! (`scaStatus`, `transactionStatus`, `authenticationMethodId`, ...).

use std::fmt;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Identifier of an authorisation sub-resource.
pub type AuthorisationId = Uuid;

/// SCA delivery approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaApproach {
    /// In-band challenge/response through the TPP interface.
    Embedded,
    /// Browser redirect to a bank-hosted page.
    Redirect,
    /// Out-of-band confirmation on a separate PSU device.
    Decoupled,
}

impl ScaApproach {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Embedded => "EMBEDDED",
            Self::Redirect => "REDIRECT",
            Self::Decoupled => "DECOUPLED",
        }
    }
}

impl fmt::Display for ScaApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of an authorisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaStatus {
    Received,
    PsuIdentified,
    PsuAuthenticated,
    ScaMethodSelected,
    /// Reserved for approaches that need an explicit start signal. Never
    /// produced by the processor.
    Started,
    Finalised,
    Failed,
    Exempted,
}

impl ScaStatus {
    /// `FINALISED`, `FAILED` and `EXEMPTED` end the flow.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finalised | Self::Failed | Self::Exempted)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::PsuIdentified => "psuIdentified",
            Self::PsuAuthenticated => "psuAuthenticated",
            Self::ScaMethodSelected => "scaMethodSelected",
            Self::Started => "started",
            Self::Finalised => "finalised",
            Self::Failed => "failed",
            Self::Exempted => "exempted",
        }
    }
}

impl fmt::Display for ScaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an authorisation authorises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorisationType {
    PaymentCreation,
    PaymentCancellation,
    Consent,
    FundsConfirmationConsent,
}

impl AuthorisationType {
    #[must_use]
    pub const fn is_payment(self) -> bool {
        matches!(self, Self::PaymentCreation | Self::PaymentCancellation)
    }
}

/// Payment service kind. Each kind is served by its own backend handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Single,
    Periodic,
    Bulk,
    /// Payment initiated with a raw (non-JSON) body such as pain.001.
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentKind {
    Account,
    FundsConfirmation,
}

/// ISO 20022 payment transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Accc,
    Accp,
    Acsc,
    Acsp,
    Actc,
    Acwc,
    Acwp,
    Acfc,
    Rcvd,
    Pdng,
    Rjct,
    Canc,
    /// Partially accepted technical correct: one of several PSUs has
    /// authorised, the others are still pending.
    Patc,
    Part,
}

impl TransactionStatus {
    #[must_use]
    pub const fn is_partially_authorised(self) -> bool {
        matches!(self, Self::Patc)
    }
}

/// PSU identification as supplied in `PSU-ID`/`PSU-Corporate-ID` headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsuIdData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psu_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psu_id_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psu_corporate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psu_corporate_id_type: Option<String>,
}

impl PsuIdData {
    #[must_use]
    pub fn new(psu_id: impl Into<String>) -> Self {
        Self {
            psu_id: Some(psu_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.psu_id.as_deref().is_none_or(str::is_empty)
            && self.psu_corporate_id.as_deref().is_none_or(str::is_empty)
    }

    /// Two identities conflict only when both carry a PSU id and the ids differ.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        match (self.psu_id.as_deref(), other.psu_id.as_deref()) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}

/// PSU secret used for the first authentication factor.
///
/// `Debug` redacts the password.
#[derive(Debug, Clone)]
pub struct PsuCredentials {
    password: SecretString,
}

impl PsuCredentials {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: SecretString::from(password.into()),
        }
    }

    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

/// An SCA method offered by the bank (`authenticationObject`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaMethod {
    pub authentication_method_id: String,
    /// `SMS_OTP`, `CHIP_OTP`, `PHOTO_OTP`, `PUSH_OTP`, ...
    pub authentication_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// The method confirms out of band (push to a banking app and similar).
    #[serde(default)]
    pub decoupled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpFormat {
    Characters,
    Integer,
}

/// Challenge presented to the PSU for the chosen SCA method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_format: Option<OtpFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_information: Option<String>,
}

/// TPP redirect URIs (`TPP-Redirect-URI`, `TPP-Nok-Redirect-URI`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TppRedirectUri {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nok_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub currency: String,
    pub amount: Decimal,
}

/// Currency conversion figures for payments that convert currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConversionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_conversion_fee: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_total_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_interbank_settlement_amount: Option<Amount>,
}

/// Stored authorisation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorisation {
    pub id: AuthorisationId,
    /// Payment or consent this authorisation belongs to.
    pub parent_id: String,
    pub authorisation_type: AuthorisationType,
    pub sca_status: ScaStatus,
    /// Committed at creation. `None` only for defective records.
    pub sca_approach: Option<ScaApproach>,
    pub psu_data: Option<PsuIdData>,
    pub chosen_sca_method: Option<ScaMethod>,
    #[serde(default)]
    pub available_sca_methods: Vec<ScaMethod>,
    pub challenge_data: Option<ChallengeData>,
    pub redirect_uri: Option<TppRedirectUri>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Data needed to create a new authorisation record.
///
/// The store assigns the id and creation time and always starts the record
/// in [`ScaStatus::Received`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuthorisation {
    pub parent_id: String,
    pub authorisation_type: AuthorisationType,
    pub psu_data: Option<PsuIdData>,
    pub sca_approach: ScaApproach,
    pub redirect_uri: Option<TppRedirectUri>,
    pub expires_at: OffsetDateTime,
}

/// Fields to write back after one processor transition.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorisationPatch {
    /// Status read at the start of the call. Stores reject the patch when the
    /// stored status no longer matches.
    pub expected_status: Option<ScaStatus>,
    pub sca_status: Option<ScaStatus>,
    pub sca_approach: Option<ScaApproach>,
    pub psu_data: Option<PsuIdData>,
    pub chosen_sca_method: Option<ScaMethod>,
    pub available_sca_methods: Option<Vec<ScaMethod>>,
    pub challenge_data: Option<ChallengeData>,
}

impl AuthorisationPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sca_status.is_none()
            && self.sca_approach.is_none()
            && self.psu_data.is_none()
            && self.chosen_sca_method.is_none()
            && self.available_sca_methods.is_none()
            && self.challenge_data.is_none()
    }

    /// Apply the patch to a record in place. `expected_status` is not checked here.
    pub fn apply_to(self, authorisation: &mut Authorisation) {
        if let Some(status) = self.sca_status {
            authorisation.sca_status = status;
        }
        if let Some(approach) = self.sca_approach {
            authorisation.sca_approach = Some(approach);
        }
        if let Some(psu_data) = self.psu_data {
            authorisation.psu_data = Some(psu_data);
        }
        if let Some(method) = self.chosen_sca_method {
            authorisation.chosen_sca_method = Some(method);
        }
        if let Some(methods) = self.available_sca_methods {
            authorisation.available_sca_methods = methods;
        }
        if let Some(challenge) = self.challenge_data {
            authorisation.challenge_data = Some(challenge);
        }
    }
}

/// Payment protected by a payment authorisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentObject {
    pub payment_id: String,
    pub kind: PaymentKind,
    /// `sepa-credit-transfers`, `instant-sepa-credit-transfers`, ...
    pub payment_product: String,
    pub transaction_status: TransactionStatus,
    #[serde(default)]
    pub psu_data: Vec<PsuIdData>,
    #[serde(default)]
    pub multilevel_sca_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructed_amount: Option<Amount>,
}

/// Consent protected by a consent authorisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentObject {
    pub consent_id: String,
    pub kind: ConsentKind,
    #[serde(default)]
    pub psu_data: Vec<PsuIdData>,
    #[serde(default)]
    pub multilevel_sca_required: bool,
}

/// The object an SCA flow protects. Read-only to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
pub enum BusinessObject {
    Payment(PaymentObject),
    Consent(ConsentObject),
}

impl BusinessObject {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Payment(p) => &p.payment_id,
            Self::Consent(c) => &c.consent_id,
        }
    }

    #[must_use]
    pub fn as_payment(&self) -> Option<&PaymentObject> {
        match self {
            Self::Payment(p) => Some(p),
            Self::Consent(_) => None,
        }
    }
}

/// Request to create an authorisation under a payment or consent.
#[derive(Debug, Clone)]
pub struct CreateAuthorisationRequest {
    pub parent_id: String,
    pub authorisation_type: AuthorisationType,
    pub psu_data: Option<PsuIdData>,
    pub credentials: Option<PsuCredentials>,
    /// `TPP-Redirect-Preferred` header.
    pub tpp_redirect_preferred: Option<bool>,
    /// `TPP-Decoupled-Preferred` header.
    pub tpp_decoupled_preferred: Option<bool>,
    pub redirect_uri: Option<TppRedirectUri>,
}

impl CreateAuthorisationRequest {
    #[must_use]
    pub fn new(parent_id: impl Into<String>, authorisation_type: AuthorisationType) -> Self {
        Self {
            parent_id: parent_id.into(),
            authorisation_type,
            psu_data: None,
            credentials: None,
            tpp_redirect_preferred: None,
            tpp_decoupled_preferred: None,
            redirect_uri: None,
        }
    }

    #[must_use]
    pub fn with_psu_data(mut self, psu_data: PsuIdData) -> Self {
        self.psu_data = Some(psu_data);
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: PsuCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn with_preferences(mut self, redirect: Option<bool>, decoupled: Option<bool>) -> Self {
        self.tpp_redirect_preferred = redirect;
        self.tpp_decoupled_preferred = decoupled;
        self
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: TppRedirectUri) -> Self {
        self.redirect_uri = Some(redirect_uri);
        self
    }
}

/// PSU-facing update of an existing authorisation.
///
/// Which fields matter depends on the authorisation's current status.
#[derive(Debug, Clone)]
pub struct UpdateAuthorisationRequest {
    pub parent_id: String,
    pub authorisation_id: AuthorisationId,
    pub psu_data: Option<PsuIdData>,
    pub credentials: Option<PsuCredentials>,
    /// Only identify the PSU; skip authentication.
    pub update_psu_identification: bool,
    pub authentication_method_id: Option<String>,
    /// TAN/OTP entered by the PSU.
    pub sca_authentication_data: Option<String>,
    /// Redirect confirmation code handed back to the TPP after the bank page.
    pub confirmation_code: Option<String>,
}

impl UpdateAuthorisationRequest {
    #[must_use]
    pub fn new(parent_id: impl Into<String>, authorisation_id: AuthorisationId) -> Self {
        Self {
            parent_id: parent_id.into(),
            authorisation_id,
            psu_data: None,
            credentials: None,
            update_psu_identification: false,
            authentication_method_id: None,
            sca_authentication_data: None,
            confirmation_code: None,
        }
    }

    #[must_use]
    pub fn identify_psu(mut self, psu_data: PsuIdData) -> Self {
        self.psu_data = Some(psu_data);
        self.update_psu_identification = true;
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, psu_data: PsuIdData, credentials: PsuCredentials) -> Self {
        self.psu_data = Some(psu_data);
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn with_method(mut self, authentication_method_id: impl Into<String>) -> Self {
        self.authentication_method_id = Some(authentication_method_id.into());
        self
    }

    #[must_use]
    pub fn with_authentication_data(mut self, sca_authentication_data: impl Into<String>) -> Self {
        self.sca_authentication_data = Some(sca_authentication_data.into());
        self
    }

    #[must_use]
    pub fn with_confirmation_code(mut self, confirmation_code: impl Into<String>) -> Self {
        self.confirmation_code = Some(confirmation_code.into());
        self
    }
}

/// Outcome of a create or update call as seen by the orchestration layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorisationResponse {
    pub authorisation_id: AuthorisationId,
    pub parent_id: String,
    pub authorisation_type: AuthorisationType,
    pub sca_status: ScaStatus,
    pub sca_approach: ScaApproach,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psu_data: Option<PsuIdData>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_sca_methods: Vec<ScaMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_sca_method: Option<ScaMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_data: Option<ChallengeData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_conversion: Option<CurrencyConversionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psu_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_status: Option<TransactionStatus>,
    pub multilevel_sca_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAuthorisationResponse {
    #[serde(flatten)]
    pub authorisation: AuthorisationResponse,
    /// Link to the bank-hosted SCA page (redirect approach only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sca_redirect_link: Option<String>,
}
