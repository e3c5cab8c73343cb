use std::sync::Arc;

use async_trait::async_trait;
use sca_authorisation_sdk::{
    AuthorisationId, AuthorisationType, BusinessObject, CreateAuthorisationRequest,
    CreateAuthorisationResponse, ScaApproach, ScaStatus,
};

use super::{AuthorisationApproachService, AuthorisationCommon};
use crate::domain::error::DomainError;
use crate::domain::processor::{ProcessorRequest, ProcessorResponse};

/// In-band challenge/response through the TPP interface.
pub struct EmbeddedAuthorisationService {
    common: Arc<AuthorisationCommon>,
}

impl EmbeddedAuthorisationService {
    #[must_use]
    pub fn new(common: Arc<AuthorisationCommon>) -> Self {
        Self { common }
    }
}

#[async_trait]
impl AuthorisationApproachService for EmbeddedAuthorisationService {
    fn sca_approach(&self) -> ScaApproach {
        ScaApproach::Embedded
    }

    async fn create_authorisation(
        &self,
        request: &CreateAuthorisationRequest,
        object: &BusinessObject,
    ) -> Result<CreateAuthorisationResponse, DomainError> {
        self.common
            .create_and_drive(request, object, ScaApproach::Embedded)
            .await
    }

    async fn update_authorisation(
        &self,
        request: ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        self.common.processor().process(request).await
    }

    async fn update_cancellation_authorisation(
        &self,
        request: ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        self.common.processor().process(request).await
    }

    async fn get_sub_resource_ids(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Vec<AuthorisationId>, DomainError> {
        self.common
            .sub_resource_ids(parent_id, authorisation_type)
            .await
    }

    async fn get_sca_status(
        &self,
        parent_id: &str,
        authorisation_id: AuthorisationId,
    ) -> Result<ScaStatus, DomainError> {
        self.common.sca_status(parent_id, authorisation_id).await
    }
}
