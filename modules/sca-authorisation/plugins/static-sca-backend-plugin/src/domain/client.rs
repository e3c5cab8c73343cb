//! Client implementation for the static SCA backend plugin.
//!
//! Implements `AuthenticationBackend` using the domain service.

use async_trait::async_trait;
use sca_authorisation_sdk::{
    AuthenticationBackend, AuthorisationCodeResult, AvailableScaMethods, BackendError,
    BusinessObject, CurrencyConversionInfo, DecoupledOutcome, ExecutionResult, PsuAuthentication,
    PsuCredentials, PsuIdData, RedirectConfirmation, ScaConfirmation, ScaContext,
};

use super::service::Service;

#[async_trait]
impl AuthenticationBackend for Service {
    async fn authenticate_psu(
        &self,
        _ctx: &ScaContext,
        psu_data: &PsuIdData,
        credentials: &PsuCredentials,
        _object: &BusinessObject,
    ) -> Result<PsuAuthentication, BackendError> {
        self.authenticate(psu_data, credentials)
    }

    async fn list_sca_methods(
        &self,
        ctx: &ScaContext,
        _object: &BusinessObject,
    ) -> Result<AvailableScaMethods, BackendError> {
        self.methods(ctx.psu_data.as_ref())
    }

    async fn request_authorisation_code(
        &self,
        ctx: &ScaContext,
        authentication_method_id: &str,
        _object: &BusinessObject,
    ) -> Result<AuthorisationCodeResult, BackendError> {
        self.request_code(ctx.psu_data.as_ref(), authentication_method_id)
    }

    async fn verify_and_execute(
        &self,
        ctx: &ScaContext,
        confirmation: &ScaConfirmation,
        _object: &BusinessObject,
    ) -> Result<ExecutionResult, BackendError> {
        self.verify(ctx.authorisation_id, confirmation)
    }

    async fn execute_without_sca(
        &self,
        ctx: &ScaContext,
        _object: &BusinessObject,
    ) -> Result<ExecutionResult, BackendError> {
        Service::execute_without_sca(self, ctx.psu_data.as_ref())
    }

    async fn proceed_decoupled(
        &self,
        ctx: &ScaContext,
        authentication_method_id: Option<&str>,
        _object: &BusinessObject,
    ) -> Result<DecoupledOutcome, BackendError> {
        Service::proceed_decoupled(self, ctx.psu_data.as_ref(), authentication_method_id)
    }

    async fn confirm_redirect(
        &self,
        _ctx: &ScaContext,
        confirmation_code: &str,
        _object: &BusinessObject,
    ) -> Result<RedirectConfirmation, BackendError> {
        Service::confirm_redirect(self, confirmation_code)
    }

    async fn currency_conversion_info(
        &self,
        _ctx: &ScaContext,
        _object: &BusinessObject,
    ) -> Result<Option<CurrencyConversionInfo>, BackendError> {
        Ok(self.currency_conversion())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use sca_authorisation_sdk::{AuthorisationType, ScaApproach, ScaStatus};
    use uuid::Uuid;

    use super::*;
    use crate::config::StaticScaBackendConfig;

    fn ctx() -> ScaContext {
        ScaContext {
            authorisation_id: Uuid::new_v4(),
            authorisation_type: AuthorisationType::PaymentCreation,
            sca_approach: ScaApproach::Embedded,
            psu_data: Some(PsuIdData::new("alice")),
        }
    }

    fn payment() -> BusinessObject {
        StaticScaBackendConfig::default()
            .business_objects()
            .remove(0)
    }

    #[tokio::test]
    async fn plugin_trait_lists_configured_methods() {
        let service = Service::from_config(&StaticScaBackendConfig::default());
        let backend: &dyn AuthenticationBackend = &service;

        let methods = backend.list_sca_methods(&ctx(), &payment()).await.unwrap();
        assert_eq!(methods.methods.len(), 2);
        assert!(methods.methods.iter().any(|m| m.decoupled));
    }

    #[tokio::test]
    async fn plugin_trait_decoupled_names_the_channel() {
        let service = Service::from_config(&StaticScaBackendConfig::default());
        let backend: &dyn AuthenticationBackend = &service;

        let outcome = backend
            .proceed_decoupled(&ctx(), Some("push"), &payment())
            .await
            .unwrap();
        assert_eq!(outcome.sca_status, ScaStatus::ScaMethodSelected);
        assert_eq!(
            outcome.psu_message.as_deref(),
            Some("Please confirm the operation in Banking app")
        );
    }

    #[tokio::test]
    async fn plugin_trait_unknown_psu_is_rejected() {
        let service = Service::from_config(&StaticScaBackendConfig::default());
        let backend: &dyn AuthenticationBackend = &service;
        let ctx = ScaContext {
            psu_data: Some(PsuIdData::new("eve")),
            ..ctx()
        };

        let result = backend.execute_without_sca(&ctx, &payment()).await;
        assert_eq!(result, Err(BackendError::PsuCredentialsInvalid));
    }
}
