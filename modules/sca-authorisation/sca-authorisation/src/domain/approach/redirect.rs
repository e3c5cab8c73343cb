use std::sync::Arc;

use async_trait::async_trait;
use sca_authorisation_sdk::{
    AuthorisationId, AuthorisationType, BusinessObject, CreateAuthorisationRequest,
    CreateAuthorisationResponse, ScaApproach, ScaError, ScaStatus,
};

use super::common::record_response;
use super::{AuthorisationApproachService, AuthorisationCommon};
use crate::config::RedirectConfig;
use crate::domain::error::DomainError;
use crate::domain::processor::{AuthorisationProcessor, ProcessorRequest, ProcessorResponse};

/// Browser redirect to a bank-hosted SCA page.
pub struct RedirectAuthorisationService {
    common: Arc<AuthorisationCommon>,
    config: RedirectConfig,
}

impl RedirectAuthorisationService {
    #[must_use]
    pub fn new(common: Arc<AuthorisationCommon>, config: RedirectConfig) -> Self {
        Self { common, config }
    }

    async fn update(
        &self,
        request: ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        let Some(code) = request.update.confirmation_code.as_deref() else {
            return self.common.processor().process(request).await;
        };
        if let Some(refused) = AuthorisationProcessor::redirect_status_refusal(&request)? {
            return Ok(refused);
        }
        if !self.config.confirmation_required {
            return Ok(ProcessorResponse::rejected(
                &request,
                ScaError::format("authorisation confirmation is not enabled"),
            ));
        }
        self.common.processor().confirm_redirect(request, code).await
    }
}

#[async_trait]
impl AuthorisationApproachService for RedirectAuthorisationService {
    fn sca_approach(&self) -> ScaApproach {
        ScaApproach::Redirect
    }

    /// The PSU authenticates on the bank page, so no step runs here even when
    /// the request carries PSU data.
    async fn create_authorisation(
        &self,
        request: &CreateAuthorisationRequest,
        _object: &BusinessObject,
    ) -> Result<CreateAuthorisationResponse, DomainError> {
        let record = self
            .common
            .create_record(request, ScaApproach::Redirect)
            .await?;
        let link = self
            .config
            .render_link(&record.id.to_string(), &record.parent_id);
        Ok(CreateAuthorisationResponse {
            authorisation: record_response(&record, ScaApproach::Redirect),
            sca_redirect_link: Some(link),
        })
    }

    async fn update_authorisation(
        &self,
        request: ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        self.update(request).await
    }

    async fn update_cancellation_authorisation(
        &self,
        request: ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        self.update(request).await
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

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use sca_authorisation_sdk::{PaymentKind, UpdateAuthorisationRequest};

    use super::*;
    use crate::domain::test_support::{
        MockBackend, MockObjects, PAYMENT_ID, authorisation, common_with, payment,
    };

    fn without_confirmation() -> RedirectAuthorisationService {
        RedirectAuthorisationService::new(
            common_with(MockBackend::new(), MockObjects::with_defaults()),
            RedirectConfig {
                confirmation_required: false,
                ..RedirectConfig::default()
            },
        )
    }

    async fn confirm(
        service: &RedirectAuthorisationService,
        status: ScaStatus,
    ) -> Result<ProcessorResponse, DomainError> {
        let auth = authorisation(status, ScaApproach::Redirect);
        let update =
            UpdateAuthorisationRequest::new(PAYMENT_ID, auth.id).with_confirmation_code("code-1");
        let object = payment(PAYMENT_ID, PaymentKind::Single);
        service
            .update_authorisation(ProcessorRequest {
                approach: ScaApproach::Redirect,
                authorisation: &auth,
                update: &update,
                object: &object,
            })
            .await
    }

    #[tokio::test]
    async fn terminal_status_wins_over_disabled_confirmation() {
        let service = without_confirmation();

        for status in [ScaStatus::Finalised, ScaStatus::Failed, ScaStatus::Exempted] {
            let response = confirm(&service, status).await.unwrap();
            assert_eq!(response.sca_status, status);
            assert_eq!(response.error, Some(ScaError::StatusInvalid { status }));
        }
    }

    #[tokio::test]
    async fn started_status_wins_over_disabled_confirmation() {
        let err = confirm(&without_confirmation(), ScaStatus::Started)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unsupported(_)));
    }

    #[tokio::test]
    async fn open_status_with_disabled_confirmation_is_malformed() {
        let response = confirm(&without_confirmation(), ScaStatus::Received)
            .await
            .unwrap();
        assert_eq!(response.sca_status, ScaStatus::Received);
        assert!(matches!(response.error, Some(ScaError::Format { .. })));
    }
}
