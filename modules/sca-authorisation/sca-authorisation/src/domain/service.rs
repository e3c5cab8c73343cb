use std::sync::Arc;

use sca_authorisation_sdk::{
    AuthenticationBackend, AuthorisationId, AuthorisationResponse, AuthorisationStore,
    AuthorisationType, BusinessObjectProvider, CreateAuthorisationRequest,
    CreateAuthorisationResponse, ScaApproach, ScaStatus, UpdateAuthorisationRequest,
};
use time::Duration;

use super::approach::AuthorisationCommon;
use super::approach_resolver::{ApproachResolver, SupportedApproaches};
use super::backends::AuthenticationBackends;
use super::dispatcher::ChainDispatcher;
use super::error::DomainError;
use super::processor::{AuthorisationProcessor, ExemptionPolicy, ProcessorRequest};
use crate::config::ScaAuthorisationConfig;

/// Entry point an update arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateEntry {
    Authorisation,
    Cancellation,
}

// ============================================================================
// Service Implementation
// ============================================================================

/// SCA authorisation service: resolves the approach, dispatches to the
/// approach service and persists the outcome.
pub struct Service {
    common: Arc<AuthorisationCommon>,
    resolver: ApproachResolver,
    dispatcher: ChainDispatcher,
}

impl Service {
    /// # Errors
    ///
    /// `Configuration` if the configuration does not validate.
    pub fn new(
        config: &ScaAuthorisationConfig,
        store: Arc<dyn AuthorisationStore>,
        backends: AuthenticationBackends,
        objects: Arc<dyn BusinessObjectProvider>,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        let supported = SupportedApproaches::new(&config.sca_approaches)?;
        let expiration = Duration::seconds(
            i64::try_from(config.authorisation_expiration_secs).map_err(|_| {
                DomainError::configuration("authorisation_expiration_secs is out of range")
            })?,
        );

        let processor = Arc::new(AuthorisationProcessor::new(
            backends,
            ExemptionPolicy::from(&config.exemption),
        ));
        let common = Arc::new(AuthorisationCommon::new(
            store.clone(),
            objects,
            processor,
            expiration,
        ));
        let dispatcher = ChainDispatcher::with_all(&common, config.redirect.clone());

        Ok(Self {
            common,
            resolver: ApproachResolver::new(supported, store),
            dispatcher,
        })
    }

    /// Service with one backend for every payment and consent kind.
    ///
    /// # Errors
    ///
    /// `Configuration` if the configuration does not validate.
    pub fn with_backend(
        config: &ScaAuthorisationConfig,
        store: Arc<dyn AuthorisationStore>,
        backend: Arc<dyn AuthenticationBackend>,
        objects: Arc<dyn BusinessObjectProvider>,
    ) -> Result<Self, DomainError> {
        Self::new(config, store, AuthenticationBackends::uniform(backend), objects)
    }

    /// # Errors
    ///
    /// - `ParentNotFound` if the payment or consent does not exist
    /// - any error of the approach service's create step
    #[tracing::instrument(
        skip_all,
        fields(parent_id = %request.parent_id, authorisation_type = ?request.authorisation_type)
    )]
    pub async fn create_authorisation(
        &self,
        request: &CreateAuthorisationRequest,
    ) -> Result<CreateAuthorisationResponse, DomainError> {
        let object = self
            .common
            .load_object(&request.parent_id, request.authorisation_type)
            .await?;
        let approach = self.resolver.resolve(
            request.tpp_redirect_preferred,
            request.tpp_decoupled_preferred,
        );

        let created = self
            .dispatcher
            .dispatch_create(approach, request, &object)
            .await?;

        tracing::info!(
            authorisation_id = %created.authorisation.authorisation_id,
            sca_status = %created.authorisation.sca_status,
            sca_approach = %created.authorisation.sca_approach,
            "authorisation created"
        );
        Ok(created)
    }

    /// Advance a payment-creation or consent authorisation.
    ///
    /// # Errors
    ///
    /// - `AuthorisationNotFound` for an unknown id, a foreign parent or a
    ///   cancellation authorisation
    /// - `Rejected` for PSU-facing failures decided by the processor
    /// - `Store` / `Backend` for collaborator failures
    pub async fn update_authorisation(
        &self,
        request: &UpdateAuthorisationRequest,
    ) -> Result<AuthorisationResponse, DomainError> {
        self.update(request, UpdateEntry::Authorisation).await
    }

    /// Advance a payment-cancellation authorisation.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_authorisation`], with `AuthorisationNotFound`
    /// for any authorisation that is not a cancellation.
    pub async fn update_cancellation_authorisation(
        &self,
        request: &UpdateAuthorisationRequest,
    ) -> Result<AuthorisationResponse, DomainError> {
        self.update(request, UpdateEntry::Cancellation).await
    }

    #[tracing::instrument(
        skip_all,
        fields(authorisation_id = %request.authorisation_id, entry = ?entry)
    )]
    async fn update(
        &self,
        request: &UpdateAuthorisationRequest,
        entry: UpdateEntry,
    ) -> Result<AuthorisationResponse, DomainError> {
        let authorisation = self.common.load(request.authorisation_id).await?;
        let expected_entry = if authorisation.authorisation_type
            == AuthorisationType::PaymentCancellation
        {
            UpdateEntry::Cancellation
        } else {
            UpdateEntry::Authorisation
        };
        if authorisation.parent_id != request.parent_id || expected_entry != entry {
            return Err(DomainError::AuthorisationNotFound(authorisation.id));
        }

        let approach = self.resolver.approach_of(authorisation.id).await?;
        let object = self
            .common
            .load_object(&authorisation.parent_id, authorisation.authorisation_type)
            .await?;

        let processor_request = ProcessorRequest {
            approach,
            authorisation: &authorisation,
            update: request,
            object: &object,
        };
        let response = match entry {
            UpdateEntry::Authorisation => {
                self.dispatcher.dispatch_update(processor_request).await?
            }
            UpdateEntry::Cancellation => {
                self.dispatcher
                    .dispatch_cancellation_update(processor_request)
                    .await?
            }
        };

        let from = authorisation.sca_status;
        let updated = self.common.settle(&authorisation, &object, response).await?;
        tracing::info!(
            from = %from,
            to = %updated.sca_status,
            sca_approach = %updated.sca_approach,
            "authorisation updated"
        );
        Ok(updated)
    }

    /// # Errors
    ///
    /// `AuthorisationNotFound` if the authorisation does not exist under
    /// `parent_id`.
    pub async fn get_authorisation_sca_status(
        &self,
        parent_id: &str,
        authorisation_id: AuthorisationId,
    ) -> Result<ScaStatus, DomainError> {
        let approach = self.resolver.approach_of(authorisation_id).await?;
        self.dispatcher
            .service(approach)?
            .get_sca_status(parent_id, authorisation_id)
            .await
    }

    /// # Errors
    ///
    /// - `AuthorisationNotFound` if the authorisation does not exist
    /// - `ApproachMissing` if it has no approach recorded
    pub async fn get_authorisation_sca_approach(
        &self,
        authorisation_id: AuthorisationId,
    ) -> Result<ScaApproach, DomainError> {
        self.resolver.approach_of(authorisation_id).await
    }

    /// # Errors
    ///
    /// `Store` if the store is unavailable.
    pub async fn get_sub_resource_ids(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Vec<AuthorisationId>, DomainError> {
        self.dispatcher
            .service(self.resolver.supported().first())?
            .get_sub_resource_ids(parent_id, authorisation_type)
            .await
    }
}
