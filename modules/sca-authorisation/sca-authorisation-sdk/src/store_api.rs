//! Persistence contract for authorisation records.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{
    Authorisation, AuthorisationId, AuthorisationPatch, AuthorisationType, NewAuthorisation,
    ScaApproach,
};

/// Authorisation record store.
///
/// The store is the only synchronisation point between concurrent updates of
/// the same authorisation: `update` must apply a patch atomically and honour
/// `AuthorisationPatch::expected_status`.
#[async_trait]
pub trait AuthorisationStore: Send + Sync {
    /// Persist a new record in status `RECEIVED`.
    ///
    /// # Errors
    ///
    /// `Unavailable` if the store cannot be reached.
    async fn create(&self, new: NewAuthorisation) -> Result<Authorisation, StoreError>;

    /// # Errors
    ///
    /// `Unavailable` if the store cannot be reached.
    async fn get(&self, id: AuthorisationId) -> Result<Option<Authorisation>, StoreError>;

    /// # Errors
    ///
    /// - `NotFound` if no record has this id
    /// - `Conflict` if `expected_status` is set and does not match
    /// - `Unavailable` if the store cannot be reached
    async fn update(
        &self,
        id: AuthorisationId,
        patch: AuthorisationPatch,
    ) -> Result<Authorisation, StoreError>;

    /// Ids of all records under `parent_id` with the given type, oldest first.
    ///
    /// # Errors
    ///
    /// `Unavailable` if the store cannot be reached.
    async fn list_by_parent(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Vec<AuthorisationId>, StoreError>;

    /// # Errors
    ///
    /// - `NotFound` if no record has this id
    /// - `Unavailable` if the store cannot be reached
    async fn get_sca_approach(&self, id: AuthorisationId)
    -> Result<Option<ScaApproach>, StoreError>;
}
