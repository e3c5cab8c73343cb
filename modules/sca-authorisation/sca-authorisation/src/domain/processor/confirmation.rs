//! `SCA_METHOD_SELECTED`: second-factor verification and execution, plus
//! the redirect confirmation step.

use sca_authorisation_sdk::{
    BackendError, ExecutionResult, ScaApproach, ScaConfirmation, ScaError, ScaStatus,
};

use super::{
    AuthorisationProcessor, ProcessorRequest, ProcessorResponse, backend_failure, context,
};
use crate::domain::error::DomainError;

impl AuthorisationProcessor {
    pub(super) async fn confirm(
        &self,
        request: &ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        let confirmation = if request.approach == ScaApproach::Decoupled {
            ScaConfirmation::Decoupled
        } else {
            let Some(code) = request
                .update
                .sca_authentication_data
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
            else {
                return Ok(ProcessorResponse::rejected(
                    request,
                    ScaError::format("scaAuthenticationData is missing"),
                ));
            };
            ScaConfirmation::AuthenticationCode(code.to_owned())
        };

        let ctx = context(request, None);
        match self
            .backend(request)
            .verify_and_execute(&ctx, &confirmation, request.object)
            .await
        {
            Ok(result) => {
                tracing::debug!(
                    transaction_status = ?result.transaction_status,
                    "second factor verified, operation executed"
                );
                Ok(
                    ProcessorResponse::transition(ScaStatus::Finalised, request.approach)
                        .with_execution(result),
                )
            }
            Err(e) => Ok(backend_failure(request, e)),
        }
    }

    /// Refusal for a redirect authorisation that can no longer be confirmed:
    /// a terminal one is rejected and the reserved `STARTED` one is an error.
    ///
    /// # Errors
    ///
    /// `Unsupported` for the reserved `STARTED` status.
    pub fn redirect_status_refusal(
        request: &ProcessorRequest<'_>,
    ) -> Result<Option<ProcessorResponse>, DomainError> {
        let status = request.authorisation.sca_status;
        if status.is_terminal() {
            return Ok(Some(ProcessorResponse::rejected(
                request,
                ScaError::StatusInvalid { status },
            )));
        }
        if status == ScaStatus::Started {
            return Err(DomainError::unsupported(
                "redirect authorisation is in the reserved STARTED status",
            ));
        }
        Ok(None)
    }

    /// Map the outcome the bank recorded while the PSU was on its SCA page
    /// onto a step response. Does not run the state machine.
    ///
    /// # Errors
    ///
    /// `Unsupported` if the authorisation or the backend reports the reserved
    /// `STARTED` status.
    #[tracing::instrument(
        skip_all,
        fields(
            authorisation_id = %request.authorisation.id,
            sca_status = %request.authorisation.sca_status,
            sca_approach = %request.approach
        )
    )]
    pub async fn confirm_redirect(
        &self,
        request: ProcessorRequest<'_>,
        confirmation_code: &str,
    ) -> Result<ProcessorResponse, DomainError> {
        if let Some(refused) = Self::redirect_status_refusal(&request)? {
            return Ok(refused);
        }

        let code = confirmation_code.trim();
        if code.is_empty() {
            return Ok(ProcessorResponse::rejected(
                &request,
                ScaError::format("confirmation code is empty"),
            ));
        }

        let ctx = context(&request, None);
        let confirmed = match self
            .backend(&request)
            .confirm_redirect(&ctx, code, request.object)
            .await
        {
            Ok(confirmed) => confirmed,
            Err(BackendError::ScaInvalid { .. }) => {
                tracing::info!("redirect confirmation code rejected");
                return Ok(ProcessorResponse::failed(
                    &request,
                    ScaError::ScaInvalid {
                        attempts_exhausted: true,
                    },
                ));
            }
            Err(e) => return Ok(backend_failure(&request, e)),
        };
        if confirmed.sca_status == ScaStatus::Started {
            return Err(DomainError::unsupported(
                "redirect backend reported the reserved STARTED status",
            ));
        }

        let mut response =
            ProcessorResponse::transition(confirmed.sca_status, request.approach)
                .with_psu_message(confirmed.psu_message);
        if let Some(transaction_status) = confirmed.transaction_status {
            response = response.with_execution(ExecutionResult::new(transaction_status));
        }
        tracing::debug!(to = %response.sca_status, "redirect confirmation mapped");
        Ok(response)
    }
}
