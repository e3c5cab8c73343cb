use std::sync::Arc;

use sca_authorisation_sdk::{
    Authorisation, AuthorisationId, AuthorisationResponse, AuthorisationStore, AuthorisationType,
    BusinessObject, BusinessObjectProvider, CreateAuthorisationRequest,
    CreateAuthorisationResponse, ExecutionResult, NewAuthorisation, PaymentObject, ScaApproach,
    ScaContext, ScaStatus, UpdateAuthorisationRequest,
};
use time::{Duration, OffsetDateTime};

use crate::domain::error::DomainError;
use crate::domain::processor::{AuthorisationProcessor, ProcessorRequest, ProcessorResponse};

/// Logic shared by all approach services: record creation, loading,
/// persisting a step and the parent side effects.
pub struct AuthorisationCommon {
    store: Arc<dyn AuthorisationStore>,
    objects: Arc<dyn BusinessObjectProvider>,
    processor: Arc<AuthorisationProcessor>,
    expiration: Duration,
}

impl AuthorisationCommon {
    #[must_use]
    pub fn new(
        store: Arc<dyn AuthorisationStore>,
        objects: Arc<dyn BusinessObjectProvider>,
        processor: Arc<AuthorisationProcessor>,
        expiration: Duration,
    ) -> Self {
        Self {
            store,
            objects,
            processor,
            expiration,
        }
    }

    #[must_use]
    pub fn processor(&self) -> &AuthorisationProcessor {
        &self.processor
    }

    /// # Errors
    ///
    /// `AuthorisationNotFound` if no record has this id.
    pub async fn load(
        &self,
        authorisation_id: AuthorisationId,
    ) -> Result<Authorisation, DomainError> {
        self.store
            .get(authorisation_id)
            .await?
            .ok_or(DomainError::AuthorisationNotFound(authorisation_id))
    }

    /// # Errors
    ///
    /// `ParentNotFound` if the provider knows no such payment or consent.
    pub async fn load_object(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<BusinessObject, DomainError> {
        self.objects
            .get_business_object(parent_id, authorisation_type)
            .await?
            .ok_or_else(|| DomainError::ParentNotFound {
                parent_id: parent_id.to_owned(),
                authorisation_type,
            })
    }

    /// Persist a new record in `RECEIVED` with the approach committed.
    ///
    /// # Errors
    ///
    /// `Store` if the record cannot be written.
    pub async fn create_record(
        &self,
        request: &CreateAuthorisationRequest,
        approach: ScaApproach,
    ) -> Result<Authorisation, DomainError> {
        let new = NewAuthorisation {
            parent_id: request.parent_id.clone(),
            authorisation_type: request.authorisation_type,
            psu_data: request.psu_data.clone().filter(|p| !p.is_empty()),
            sca_approach: approach,
            redirect_uri: request.redirect_uri.clone(),
            expires_at: OffsetDateTime::now_utc() + self.expiration,
        };
        Ok(self.store.create(new).await?)
    }

    /// Create a record and, when the request already identifies the PSU, run
    /// the first processor step on it.
    ///
    /// # Errors
    ///
    /// Any error of record creation or of the first step.
    pub async fn create_and_drive(
        &self,
        request: &CreateAuthorisationRequest,
        object: &BusinessObject,
        approach: ScaApproach,
    ) -> Result<CreateAuthorisationResponse, DomainError> {
        let record = self.create_record(request, approach).await?;

        let Some(psu_data) = record.psu_data.clone() else {
            return Ok(CreateAuthorisationResponse {
                authorisation: record_response(&record, approach),
                sca_redirect_link: None,
            });
        };

        let update = UpdateAuthorisationRequest::new(record.parent_id.clone(), record.id);
        let update = if let Some(credentials) = &request.credentials {
            update.with_credentials(psu_data, credentials.clone())
        } else {
            update.identify_psu(psu_data)
        };
        let response = self
            .processor
            .process(ProcessorRequest {
                approach,
                authorisation: &record,
                update: &update,
                object,
            })
            .await?;

        Ok(CreateAuthorisationResponse {
            authorisation: self.settle(&record, object, response).await?,
            sca_redirect_link: None,
        })
    }

    /// Persist one step, apply its side effects and build the caller's view.
    ///
    /// # Errors
    ///
    /// - `Rejected` if the step carried an error (after persisting `FAILED`
    ///   where the step requires it)
    /// - `Store` if the record cannot be written or was updated concurrently
    #[tracing::instrument(
        skip_all,
        fields(
            authorisation_id = %before.id,
            sca_status = %response.sca_status,
            sca_approach = %response.sca_approach
        )
    )]
    pub async fn settle(
        &self,
        before: &Authorisation,
        object: &BusinessObject,
        response: ProcessorResponse,
    ) -> Result<AuthorisationResponse, DomainError> {
        if let Some(patch) = response.to_patch(before) {
            self.store.update(before.id, patch).await?;
        }
        if let Some(error) = response.error {
            return Err(DomainError::Rejected(error));
        }

        let multilevel_sca_required = response.multilevel_sca_required(before.authorisation_type);
        if let (Some(execution), Some(payment)) = (&response.execution, object.as_payment()) {
            self.apply_payment_side_effects(payment, execution, multilevel_sca_required)
                .await;
        }

        let psu_data = response
            .psu_data
            .clone()
            .or_else(|| before.psu_data.clone());
        let ctx = ScaContext {
            authorisation_id: before.id,
            authorisation_type: before.authorisation_type,
            sca_approach: response.sca_approach,
            psu_data: psu_data.clone(),
        };
        let executed_conversion = response
            .execution
            .as_ref()
            .and_then(|e| e.currency_conversion.clone());
        let currency_conversion = match self.processor.currency_conversion_info(&ctx, object).await
        {
            Ok(info) => info.or(executed_conversion),
            Err(e) => {
                tracing::warn!(error = %e, "currency conversion query failed");
                executed_conversion
            }
        };

        Ok(AuthorisationResponse {
            authorisation_id: before.id,
            parent_id: before.parent_id.clone(),
            authorisation_type: before.authorisation_type,
            sca_status: response.sca_status,
            sca_approach: response.sca_approach,
            psu_data,
            available_sca_methods: response.available_sca_methods.unwrap_or_default(),
            chosen_sca_method: response.chosen_sca_method,
            challenge_data: response.challenge_data,
            currency_conversion,
            psu_message: response.psu_message,
            transaction_status: response.execution.map(|e| e.transaction_status),
            multilevel_sca_required,
        })
    }

    async fn apply_payment_side_effects(
        &self,
        payment: &PaymentObject,
        execution: &ExecutionResult,
        multilevel_sca_required: bool,
    ) {
        if let Err(e) = self
            .objects
            .update_transaction_status(&payment.payment_id, execution.transaction_status)
            .await
        {
            tracing::warn!(
                payment_id = %payment.payment_id,
                error = %e,
                "failed to record transaction status on payment"
            );
        }

        if multilevel_sca_required && !payment.multilevel_sca_required {
            tracing::info!(payment_id = %payment.payment_id, "payment requires multilevel SCA");
            if let Err(e) = self
                .objects
                .mark_multilevel_sca_required(&payment.payment_id)
                .await
            {
                tracing::warn!(
                    payment_id = %payment.payment_id,
                    error = %e,
                    "failed to flag payment for multilevel SCA"
                );
            }
        }
    }

    /// # Errors
    ///
    /// `Store` if the store is unavailable.
    pub async fn sub_resource_ids(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Vec<AuthorisationId>, DomainError> {
        Ok(self
            .store
            .list_by_parent(parent_id, authorisation_type)
            .await?)
    }

    /// # Errors
    ///
    /// `AuthorisationNotFound` if the record does not exist under `parent_id`.
    pub async fn sca_status(
        &self,
        parent_id: &str,
        authorisation_id: AuthorisationId,
    ) -> Result<ScaStatus, DomainError> {
        let authorisation = self.load(authorisation_id).await?;
        if authorisation.parent_id != parent_id {
            return Err(DomainError::AuthorisationNotFound(authorisation_id));
        }
        Ok(authorisation.sca_status)
    }
}

/// Caller's view of a record that no step has touched yet.
#[must_use]
pub fn record_response(record: &Authorisation, approach: ScaApproach) -> AuthorisationResponse {
    AuthorisationResponse {
        authorisation_id: record.id,
        parent_id: record.parent_id.clone(),
        authorisation_type: record.authorisation_type,
        sca_status: record.sca_status,
        sca_approach: approach,
        psu_data: record.psu_data.clone(),
        available_sca_methods: record.available_sca_methods.clone(),
        chosen_sca_method: record.chosen_sca_method.clone(),
        challenge_data: record.challenge_data.clone(),
        currency_conversion: None,
        psu_message: None,
        transaction_status: None,
        multilevel_sca_required: false,
    }
}
