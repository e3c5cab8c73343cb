//! Local (in-process) client for the SCA authorisation module.

use std::sync::Arc;

use async_trait::async_trait;
use sca_authorisation_sdk::{
    AuthorisationId, AuthorisationResponse, AuthorisationType, CreateAuthorisationRequest,
    CreateAuthorisationResponse, ScaApproach, ScaAuthorisationClient, ScaError, ScaStatus,
    UpdateAuthorisationRequest,
};

use super::{DomainError, Service};

/// Local client wrapping the service.
///
/// Handed out by the module during `init()`.
pub struct ScaAuthorisationLocalClient {
    svc: Arc<Service>,
}

impl ScaAuthorisationLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> ScaError {
    if e.is_rejection() {
        tracing::debug!(operation = op, error = %e, "sca_authorisation call rejected");
    } else {
        tracing::error!(operation = op, error = ?e, "sca_authorisation call failed");
    }
    e.into()
}

#[async_trait]
impl ScaAuthorisationClient for ScaAuthorisationLocalClient {
    async fn create_authorisation(
        &self,
        request: CreateAuthorisationRequest,
    ) -> Result<CreateAuthorisationResponse, ScaError> {
        self.svc
            .create_authorisation(&request)
            .await
            .map_err(|e| log_and_convert("create_authorisation", e))
    }

    async fn update_authorisation(
        &self,
        request: UpdateAuthorisationRequest,
    ) -> Result<AuthorisationResponse, ScaError> {
        self.svc
            .update_authorisation(&request)
            .await
            .map_err(|e| log_and_convert("update_authorisation", e))
    }

    async fn update_cancellation_authorisation(
        &self,
        request: UpdateAuthorisationRequest,
    ) -> Result<AuthorisationResponse, ScaError> {
        self.svc
            .update_cancellation_authorisation(&request)
            .await
            .map_err(|e| log_and_convert("update_cancellation_authorisation", e))
    }

    async fn get_authorisation_sca_status(
        &self,
        parent_id: &str,
        authorisation_id: AuthorisationId,
    ) -> Result<ScaStatus, ScaError> {
        self.svc
            .get_authorisation_sca_status(parent_id, authorisation_id)
            .await
            .map_err(|e| log_and_convert("get_authorisation_sca_status", e))
    }

    async fn get_authorisation_sca_approach(
        &self,
        authorisation_id: AuthorisationId,
    ) -> Result<ScaApproach, ScaError> {
        self.svc
            .get_authorisation_sca_approach(authorisation_id)
            .await
            .map_err(|e| log_and_convert("get_authorisation_sca_approach", e))
    }

    async fn get_sub_resource_ids(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Vec<AuthorisationId>, ScaError> {
        self.svc
            .get_sub_resource_ids(parent_id, authorisation_type)
            .await
            .map_err(|e| log_and_convert("get_sub_resource_ids", e))
    }
}
