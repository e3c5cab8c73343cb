//! Authorisation state machine.
//!
//! One [`AuthorisationProcessor::process`] call performs at most one
//! transition, driven by the status read at the start of the call:
//!
//! | status                        | step                                            |
//! |-------------------------------|-------------------------------------------------|
//! | `RECEIVED` / `PSU_IDENTIFIED` | identify or authenticate the PSU, list methods  |
//! | `PSU_AUTHENTICATED`           | select a method, request a code or go decoupled |
//! | `SCA_METHOD_SELECTED`         | verify the second factor and execute            |
//! | terminal                      | rejected with `STATUS_INVALID`                  |
//!
//! The processor holds no state between calls. Persisting the outcome is the
//! caller's job (see [`ProcessorResponse::to_patch`]).

mod authentication;
mod confirmation;
mod method_selection;
mod response;


use sca_authorisation_sdk::{
    AuthenticationBackend, BackendError, BusinessObject, CurrencyConversionInfo, PaymentKind,
    PsuIdData, ScaApproach, ScaContext, ScaError, ScaMethod, ScaStatus,
};

pub use response::{ProcessorRequest, ProcessorResponse};

use super::backends::AuthenticationBackends;
use super::error::DomainError;
use crate::config::ExemptionConfig;

/// Which protected objects may settle in `EXEMPTED`.
#[derive(Debug, Clone)]
pub struct ExemptionPolicy {
    eligible_payment_kinds: Vec<PaymentKind>,
    consents_eligible: bool,
}

impl ExemptionPolicy {
    #[must_use]
    pub fn qualifies(&self, object: &BusinessObject) -> bool {
        match object {
            BusinessObject::Payment(p) => self.eligible_payment_kinds.contains(&p.kind),
            BusinessObject::Consent(_) => self.consents_eligible,
        }
    }
}

impl From<&ExemptionConfig> for ExemptionPolicy {
    fn from(cfg: &ExemptionConfig) -> Self {
        Self {
            eligible_payment_kinds: cfg.eligible_payment_kinds.clone(),
            consents_eligible: cfg.consents_eligible,
        }
    }
}

pub struct AuthorisationProcessor {
    backends: AuthenticationBackends,
    exemption: ExemptionPolicy,
}

impl AuthorisationProcessor {
    #[must_use]
    pub fn new(backends: AuthenticationBackends, exemption: ExemptionPolicy) -> Self {
        Self {
            backends,
            exemption,
        }
    }

    /// Advance the authorisation by one step.
    ///
    /// PSU-facing failures come back as a response with `error` set; the
    /// response status tells whether the record fails or stays as it was.
    ///
    /// # Errors
    ///
    /// `Unsupported` when the authorisation, or the backend, reports the
    /// reserved `STARTED` status.
    #[tracing::instrument(
        skip_all,
        fields(
            authorisation_id = %request.authorisation.id,
            sca_status = %request.authorisation.sca_status,
            sca_approach = %request.approach
        )
    )]
    pub async fn process(
        &self,
        request: ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        let status = request.authorisation.sca_status;
        let response = match status {
            ScaStatus::Finalised | ScaStatus::Failed | ScaStatus::Exempted => {
                ProcessorResponse::rejected(&request, ScaError::StatusInvalid { status })
            }
            ScaStatus::Started => {
                return Err(DomainError::unsupported(format!(
                    "authorisation {} is in the reserved STARTED status",
                    request.authorisation.id
                )));
            }
            ScaStatus::Received | ScaStatus::PsuIdentified => {
                self.authenticate(&request).await?
            }
            ScaStatus::PsuAuthenticated => self.select_method(&request).await?,
            ScaStatus::ScaMethodSelected => self.confirm(&request).await?,
        };

        tracing::debug!(
            to = %response.sca_status,
            approach = %response.sca_approach,
            error = ?response.error,
            "authorisation step processed"
        );
        Ok(response)
    }

    /// Conversion figures for a payment, queried on every transition.
    ///
    /// # Errors
    ///
    /// `Backend` if the backend query fails.
    pub async fn currency_conversion_info(
        &self,
        ctx: &ScaContext,
        object: &BusinessObject,
    ) -> Result<Option<CurrencyConversionInfo>, DomainError> {
        if object.as_payment().is_none() {
            return Ok(None);
        }
        Ok(self
            .backends
            .for_object(object)
            .currency_conversion_info(ctx, object)
            .await?)
    }

    fn backend(&self, request: &ProcessorRequest<'_>) -> &dyn AuthenticationBackend {
        self.backends.for_object(request.object)
    }

    /// Run the protected operation without a second factor.
    async fn execute_without_sca(
        &self,
        request: &ProcessorRequest<'_>,
        ctx: &ScaContext,
        exemption_granted: bool,
    ) -> ProcessorResponse {
        let exempt = exemption_granted && self.exemption.qualifies(request.object);
        match self
            .backend(request)
            .execute_without_sca(ctx, request.object)
            .await
        {
            Ok(result) => {
                let status = if exempt && result.sca_exempted {
                    ScaStatus::Exempted
                } else {
                    ScaStatus::Finalised
                };
                tracing::debug!(
                    transaction_status = ?result.transaction_status,
                    exempt,
                    "executed without SCA"
                );
                ProcessorResponse::transition(status, ctx.sca_approach).with_execution(result)
            }
            Err(e) => backend_failure(request, e),
        }
    }

    /// Hand the challenge to the out-of-band channel and return at once.
    async fn start_decoupled(
        &self,
        request: &ProcessorRequest<'_>,
        ctx: &ScaContext,
        method: Option<ScaMethod>,
    ) -> Result<ProcessorResponse, DomainError> {
        let ctx = ScaContext {
            sca_approach: ScaApproach::Decoupled,
            ..ctx.clone()
        };
        let method_id = method.as_ref().map(|m| m.authentication_method_id.as_str());
        let outcome = match self
            .backend(request)
            .proceed_decoupled(&ctx, method_id, request.object)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return Ok(backend_failure(request, e)),
        };
        if outcome.sca_status == ScaStatus::Started {
            return Err(DomainError::unsupported(
                "decoupled backend reported the reserved STARTED status",
            ));
        }

        let mut response =
            ProcessorResponse::transition(outcome.sca_status, ScaApproach::Decoupled)
                .with_psu_message(outcome.psu_message);
        if let Some(method) = method {
            response = response.with_chosen_method(method);
        }
        Ok(response)
    }
}

/// Map a backend failure onto the step outcome. Rejected credentials and
/// exhausted SCA attempts fail the authorisation, anything else leaves it as
/// it was.
fn backend_failure(request: &ProcessorRequest<'_>, e: BackendError) -> ProcessorResponse {
    match e {
        BackendError::PsuCredentialsInvalid
        | BackendError::ScaInvalid {
            attempts_exhausted: true,
        } => ProcessorResponse::failed(request, e.into()),
        e => ProcessorResponse::rejected(request, e.into()),
    }
}

fn context(request: &ProcessorRequest<'_>, psu_data: Option<PsuIdData>) -> ScaContext {
    ScaContext {
        authorisation_id: request.authorisation.id,
        authorisation_type: request.authorisation.authorisation_type,
        sca_approach: request.approach,
        psu_data: psu_data.or_else(|| request.authorisation.psu_data.clone()),
    }
}
