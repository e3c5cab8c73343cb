//! Routes a request to the service of the authorisation's approach.

use std::sync::Arc;

use sca_authorisation_sdk::{
    BusinessObject, CreateAuthorisationRequest, CreateAuthorisationResponse, ScaApproach,
};

use super::approach::{
    AuthorisationApproachService, AuthorisationCommon, DecoupledAuthorisationService,
    EmbeddedAuthorisationService, RedirectAuthorisationService,
};
use super::error::DomainError;
use super::processor::{ProcessorRequest, ProcessorResponse};
use crate::config::RedirectConfig;

/// One slot per approach. The set of approaches is fixed by the protocol, so
/// there is no open registration.
#[derive(Default)]
pub struct ChainDispatcher {
    embedded: Option<EmbeddedAuthorisationService>,
    decoupled: Option<DecoupledAuthorisationService>,
    redirect: Option<RedirectAuthorisationService>,
}

impl ChainDispatcher {
    /// Dispatcher with all three approach services.
    ///
    /// Decoupled is always present: an embedded authorisation switches to it
    /// when the PSU picks a decoupled method.
    #[must_use]
    pub fn with_all(common: &Arc<AuthorisationCommon>, redirect: RedirectConfig) -> Self {
        Self::default()
            .with_embedded(EmbeddedAuthorisationService::new(common.clone()))
            .with_decoupled(DecoupledAuthorisationService::new(common.clone()))
            .with_redirect(RedirectAuthorisationService::new(common.clone(), redirect))
    }

    #[must_use]
    pub fn with_embedded(mut self, service: EmbeddedAuthorisationService) -> Self {
        self.embedded = Some(service);
        self
    }

    #[must_use]
    pub fn with_decoupled(mut self, service: DecoupledAuthorisationService) -> Self {
        self.decoupled = Some(service);
        self
    }

    #[must_use]
    pub fn with_redirect(mut self, service: RedirectAuthorisationService) -> Self {
        self.redirect = Some(service);
        self
    }

    /// # Errors
    ///
    /// `ApproachNotRegistered` if no service is registered for `approach`.
    pub fn service(
        &self,
        approach: ScaApproach,
    ) -> Result<&dyn AuthorisationApproachService, DomainError> {
        let service: Option<&dyn AuthorisationApproachService> = match approach {
            ScaApproach::Embedded => self
                .embedded
                .as_ref()
                .map(|s| s as &dyn AuthorisationApproachService),
            ScaApproach::Decoupled => self
                .decoupled
                .as_ref()
                .map(|s| s as &dyn AuthorisationApproachService),
            ScaApproach::Redirect => self
                .redirect
                .as_ref()
                .map(|s| s as &dyn AuthorisationApproachService),
        };
        service.ok_or(DomainError::ApproachNotRegistered(approach))
    }

    /// # Errors
    ///
    /// `ApproachNotRegistered`, or any error of the approach service.
    pub async fn dispatch_create(
        &self,
        approach: ScaApproach,
        request: &CreateAuthorisationRequest,
        object: &BusinessObject,
    ) -> Result<CreateAuthorisationResponse, DomainError> {
        self.service(approach)?
            .create_authorisation(request, object)
            .await
    }

    /// # Errors
    ///
    /// `ApproachNotRegistered`, or any error of the approach service.
    pub async fn dispatch_update(
        &self,
        request: ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        self.service(request.approach)?
            .update_authorisation(request)
            .await
    }

    /// # Errors
    ///
    /// `ApproachNotRegistered`, or any error of the approach service.
    pub async fn dispatch_cancellation_update(
        &self,
        request: ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        self.service(request.approach)?
            .update_cancellation_authorisation(request)
            .await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::domain::test_support::{MockBackend, MockObjects, common_with};

    #[test]
    fn each_slot_reports_its_approach() {
        let common = common_with(MockBackend::new(), MockObjects::with_defaults());
        let dispatcher = ChainDispatcher::with_all(&common, RedirectConfig::default());
        for approach in [
            ScaApproach::Embedded,
            ScaApproach::Decoupled,
            ScaApproach::Redirect,
        ] {
            assert_eq!(dispatcher.service(approach).unwrap().sca_approach(), approach);
        }
    }

    #[test]
    fn unregistered_approach_is_a_configuration_defect() {
        let common = common_with(MockBackend::new(), MockObjects::with_defaults());
        let dispatcher =
            ChainDispatcher::default().with_embedded(EmbeddedAuthorisationService::new(common));
        assert!(dispatcher.service(ScaApproach::Embedded).is_ok());
        assert!(matches!(
            dispatcher.service(ScaApproach::Redirect),
            Err(DomainError::ApproachNotRegistered(ScaApproach::Redirect))
        ));
    }
}
