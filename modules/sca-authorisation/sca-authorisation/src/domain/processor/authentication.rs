//! `RECEIVED` / `PSU_IDENTIFIED`: PSU identification and authentication.

use sca_authorisation_sdk::{BackendError, ScaApproach, ScaError, ScaStatus};

use super::{
    AuthorisationProcessor, ProcessorRequest, ProcessorResponse, backend_failure, context,
};
use crate::domain::error::DomainError;

impl AuthorisationProcessor {
    pub(super) async fn authenticate(
        &self,
        request: &ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError> {
        let update = request.update;
        let stored = request
            .authorisation
            .psu_data
            .as_ref()
            .filter(|p| !p.is_empty());
        let incoming = update.psu_data.as_ref().filter(|p| !p.is_empty());

        if let (Some(stored), Some(incoming)) = (stored, incoming)
            && stored.conflicts_with(incoming)
        {
            tracing::warn!("PSU identity does not match the one bound to the authorisation");
            return Ok(ProcessorResponse::rejected(
                request,
                ScaError::PsuCredentialsInvalid,
            ));
        }

        let Some(psu_data) = incoming.or(stored).cloned() else {
            return Ok(ProcessorResponse::rejected(
                request,
                ScaError::format("PSU identification is missing"),
            ));
        };

        if update.update_psu_identification && update.credentials.is_none() {
            return Ok(
                ProcessorResponse::transition(ScaStatus::PsuIdentified, request.approach)
                    .with_psu_data(psu_data),
            );
        }

        let Some(credentials) = update.credentials.as_ref() else {
            return Ok(ProcessorResponse::rejected(
                request,
                ScaError::format("PSU password is missing"),
            ));
        };

        let ctx = context(request, Some(psu_data.clone()));
        let backend = self.backend(request);
        let authentication = match backend
            .authenticate_psu(&ctx, &psu_data, credentials, request.object)
            .await
        {
            Ok(authentication) => authentication,
            Err(BackendError::PsuCredentialsInvalid) => {
                tracing::info!("PSU credentials rejected by the bank");
                return Ok(
                    ProcessorResponse::failed(request, ScaError::PsuCredentialsInvalid)
                        .with_psu_data(psu_data),
                );
            }
            Err(e) => return Ok(backend_failure(request, e)),
        };

        let authenticated =
            ProcessorResponse::transition(ScaStatus::PsuAuthenticated, request.approach)
                .with_psu_data(psu_data);

        if request.approach == ScaApproach::Decoupled {
            return Ok(self
                .start_decoupled(request, &ctx, None)
                .await?
                .merged_with(authenticated));
        }

        if authentication.sca_exempted && self.exemption.qualifies(request.object) {
            return Ok(self
                .execute_without_sca(request, &ctx, true)
                .await
                .merged_with(authenticated));
        }

        let available = match backend.list_sca_methods(&ctx, request.object).await {
            Ok(available) => available,
            Err(e) => return Ok(backend_failure(request, e)),
        };
        tracing::debug!(methods = available.methods.len(), "SCA methods listed");

        match available.methods.as_slice() {
            [] => Ok(self
                .execute_without_sca(request, &ctx, available.sca_exempted)
                .await
                .merged_with(authenticated)),
            [only] => {
                let only = only.clone();
                let selected = self.choose_method(request, &ctx, only).await?;
                Ok(selected.merged_with(authenticated.with_available_methods(available.methods)))
            }
            _ => Ok(authenticated.with_available_methods(available.methods)),
        }
    }
}
