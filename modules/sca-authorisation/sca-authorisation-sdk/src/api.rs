//! Public API trait for the SCA authorisation module.
//!
//! The payment and consent orchestration layers use this trait to create
//! authorisation sub-resources and to forward PSU updates to them.

use async_trait::async_trait;

use crate::error::ScaError;
use crate::models::{
    AuthorisationId, AuthorisationResponse, AuthorisationType, CreateAuthorisationRequest,
    CreateAuthorisationResponse, ScaApproach, ScaStatus, UpdateAuthorisationRequest,
};

/// Public API trait for the SCA authorisation module.
///
/// ```ignore
/// let created = sca
///     .create_authorisation(CreateAuthorisationRequest::new(payment_id, AuthorisationType::PaymentCreation))
///     .await?;
///
/// let authenticated = sca
///     .update_authorisation(
///         UpdateAuthorisationRequest::new(payment_id, created.authorisation.authorisation_id)
///             .with_credentials(PsuIdData::new("alice"), PsuCredentials::new("secret")),
///     )
///     .await?;
/// ```
#[async_trait]
pub trait ScaAuthorisationClient: Send + Sync {
    /// Create an authorisation for a payment or consent.
    ///
    /// The SCA approach is resolved once here from the bank's supported
    /// approaches and the TPP preference headers.
    ///
    /// # Errors
    ///
    /// - `ResourceUnknown` if the parent payment/consent does not exist
    /// - `Technical` if a collaborator is unavailable
    /// - any error of the first processor step when the request carries PSU data
    async fn create_authorisation(
        &self,
        request: CreateAuthorisationRequest,
    ) -> Result<CreateAuthorisationResponse, ScaError>;

    /// Advance a payment-creation or consent authorisation by one step.
    ///
    /// # Errors
    ///
    /// - `ResourceUnknown` for an unknown authorisation or parent
    /// - `StatusInvalid` if the authorisation is already terminal
    /// - `PsuCredentialsInvalid`, `ScaInvalid`, `ScaMethodUnknown`, `Format`
    ///   for PSU-side failures
    /// - `Technical` / `Conflict` for retryable failures
    async fn update_authorisation(
        &self,
        request: UpdateAuthorisationRequest,
    ) -> Result<AuthorisationResponse, ScaError>;

    /// Advance a payment-cancellation authorisation by one step.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_authorisation`].
    async fn update_cancellation_authorisation(
        &self,
        request: UpdateAuthorisationRequest,
    ) -> Result<AuthorisationResponse, ScaError>;

    /// # Errors
    ///
    /// `ResourceUnknown` if the authorisation does not exist under `parent_id`.
    async fn get_authorisation_sca_status(
        &self,
        parent_id: &str,
        authorisation_id: AuthorisationId,
    ) -> Result<ScaStatus, ScaError>;

    /// Approach committed for the authorisation.
    ///
    /// # Errors
    ///
    /// - `ResourceUnknown` if the authorisation does not exist
    /// - `Internal` if the authorisation has no approach recorded
    async fn get_authorisation_sca_approach(
        &self,
        authorisation_id: AuthorisationId,
    ) -> Result<ScaApproach, ScaError>;

    /// Ids of all authorisations of the given type under a parent.
    ///
    /// # Errors
    ///
    /// `Technical` if the store is unavailable.
    async fn get_sub_resource_ids(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Vec<AuthorisationId>, ScaError>;
}
