//! Per-approach authorisation services.
//!
//! Embedded and decoupled authorisations run every update through the
//! processor. Redirect authorisations add a redirect link on creation and a
//! confirmation step after the PSU returns from the bank page.

mod common;
mod decoupled;
mod embedded;
mod redirect;

use async_trait::async_trait;
use sca_authorisation_sdk::{
    AuthorisationId, AuthorisationType, BusinessObject, CreateAuthorisationRequest,
    CreateAuthorisationResponse, ScaApproach, ScaStatus,
};

pub use common::AuthorisationCommon;
pub use decoupled::DecoupledAuthorisationService;
pub use embedded::EmbeddedAuthorisationService;
pub use redirect::RedirectAuthorisationService;

use super::error::DomainError;
use super::processor::{ProcessorRequest, ProcessorResponse};

/// Capability set shared by the three approach services.
#[async_trait]
pub trait AuthorisationApproachService: Send + Sync {
    fn sca_approach(&self) -> ScaApproach;

    async fn create_authorisation(
        &self,
        request: &CreateAuthorisationRequest,
        object: &BusinessObject,
    ) -> Result<CreateAuthorisationResponse, DomainError>;

    async fn update_authorisation(
        &self,
        request: ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError>;

    async fn update_cancellation_authorisation(
        &self,
        request: ProcessorRequest<'_>,
    ) -> Result<ProcessorResponse, DomainError>;

    async fn get_sub_resource_ids(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Vec<AuthorisationId>, DomainError>;

    async fn get_sca_status(
        &self,
        parent_id: &str,
        authorisation_id: AuthorisationId,
    ) -> Result<ScaStatus, DomainError>;
}
