use std::sync::Arc;

use async_trait::async_trait;
use sca_authorisation_sdk::{
    AuthorisationId, AuthorisationType, BusinessObject, CreateAuthorisationRequest,
    CreateAuthorisationResponse, ScaApproach, ScaStatus,
};

use super::{AuthorisationApproachService, AuthorisationCommon};
use crate::domain::error::DomainError;
use crate::domain::processor::{ProcessorRequest, ProcessorResponse};

/// Out-of-band confirmation on a separate PSU device.
///
/// Updates run through the same processor as embedded ones; the processor
/// hands the challenge off instead of requesting a code in-band.
pub struct DecoupledAuthorisationService {
    common: Arc<AuthorisationCommon>,
}

impl DecoupledAuthorisationService {
    #[must_use]
    pub fn new(common: Arc<AuthorisationCommon>) -> Self {
        Self { common }
    }
}

#[async_trait]
impl AuthorisationApproachService for DecoupledAuthorisationService {
    fn sca_approach(&self) -> ScaApproach {
        ScaApproach::Decoupled
    }

    async fn create_authorisation(
        &self,
        request: &CreateAuthorisationRequest,
        object: &BusinessObject,
    ) -> Result<CreateAuthorisationResponse, DomainError> {
        self.common
            .create_and_drive(request, object, ScaApproach::Decoupled)
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
