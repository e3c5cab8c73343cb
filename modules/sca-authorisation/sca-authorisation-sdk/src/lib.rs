//! SCA Authorisation SDK
//!
//! This crate provides the public API for the `sca_authorisation` module:
//!
//! - [`ScaAuthorisationClient`] - Public API trait for the payment/consent layer
//! - [`AuthenticationBackend`] / [`BusinessObjectProvider`] - Plugin API traits
//!   implemented by a bank integration
//! - [`AuthorisationStore`] - Persistence contract for authorisation records
//! - [`models`] - Authorisation, SCA method, request and response models
//! - [`ScaError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use sca_authorisation_sdk::{AuthorisationType, CreateAuthorisationRequest};
//!
//! let created = sca
//!     .create_authorisation(CreateAuthorisationRequest::new("payment-1", AuthorisationType::PaymentCreation))
//!     .await?;
//! println!("{}", created.authorisation.sca_status);
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;
pub mod store_api;

// Re-export main types at crate root
pub use api::ScaAuthorisationClient;
pub use error::{BackendError, ErrorCode, ScaError, StoreError};
pub use models::{
    Amount, Authorisation, AuthorisationId, AuthorisationPatch, AuthorisationResponse,
    AuthorisationType, BusinessObject, ChallengeData, ConsentKind, ConsentObject,
    CreateAuthorisationRequest, CreateAuthorisationResponse, CurrencyConversionInfo,
    NewAuthorisation, OtpFormat, PaymentKind, PaymentObject, PsuCredentials, PsuIdData,
    ScaApproach, ScaMethod, ScaStatus, TppRedirectUri, TransactionStatus,
    UpdateAuthorisationRequest,
};
pub use plugin_api::{
    AuthenticationBackend, AuthorisationCodeResult, AvailableScaMethods, BusinessObjectProvider,
    DecoupledOutcome, ExecutionResult, PsuAuthentication, RedirectConfirmation, ScaConfirmation,
    ScaContext,
};
pub use store_api::AuthorisationStore;
