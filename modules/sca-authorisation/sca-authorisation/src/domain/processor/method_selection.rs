//! `PSU_AUTHENTICATED`: method selection and code request.

use sca_authorisation_sdk::{ScaContext, ScaError, ScaMethod, ScaStatus};

use super::{
    AuthorisationProcessor, ProcessorRequest, ProcessorResponse, backend_failure, context,
};
use crate::domain::error::DomainError;

impl AuthorisationProcessor {
    pub(super) async fn select_method(
        &self,
        request: &ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        let Some(method_id) = request
            .update
            .authentication_method_id
            .as_deref()
            .filter(|id| !id.is_empty())
        else {
            return Ok(ProcessorResponse::rejected(
                request,
                ScaError::format("authenticationMethodId is missing"),
            ));
        };

        let Some(method) = request
            .authorisation
            .available_sca_methods
            .iter()
            .find(|m| m.authentication_method_id == method_id)
            .cloned()
        else {
            return Ok(ProcessorResponse::rejected(
                request,
                ScaError::ScaMethodUnknown {
                    method_id: method_id.to_owned(),
                },
            ));
        };

        let ctx = context(request, None);
        self.choose_method(request, &ctx, method).await
    }

    /// Act on a chosen method: hand decoupled methods to the out-of-band
    /// channel, request a code for all others.
    pub(super) async fn choose_method(
        &self,
        request: &ProcessorRequest<'_>,
        ctx: &ScaContext,
        method: ScaMethod,
    ) -> Result<ProcessorResponse, DomainError> {
        if method.decoupled {
            tracing::debug!(
                method_id = %method.authentication_method_id,
                "decoupled method chosen, switching approach"
            );
            return self.start_decoupled(request, ctx, Some(method)).await;
        }

        let code = match self
            .backend(request)
            .request_authorisation_code(ctx, &method.authentication_method_id, request.object)
            .await
        {
            Ok(code) => code,
            Err(e) => return Ok(backend_failure(request, e)),
        };

        if code.is_empty() {
            return Ok(ProcessorResponse::rejected(
                request,
                ScaError::format("authorisation code result is empty"),
            ));
        }

        if code.sca_exempted && self.exemption.qualifies(request.object) {
            return Ok(self
                .execute_without_sca(request, ctx, true)
                .await
                .with_chosen_method(method));
        }

        Ok(
            ProcessorResponse::transition(ScaStatus::ScaMethodSelected, request.approach)
                .with_chosen_method(code.chosen_sca_method.unwrap_or(method))
                .with_challenge(code.challenge_data)
                .with_psu_message(code.psu_message),
        )
    }
}
