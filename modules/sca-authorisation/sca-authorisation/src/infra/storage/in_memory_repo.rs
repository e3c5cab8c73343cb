use async_trait::async_trait;
use dashmap::DashMap;
use sca_authorisation_sdk::{
    Authorisation, AuthorisationId, AuthorisationPatch, AuthorisationStore, AuthorisationType,
    NewAuthorisation, ScaApproach, ScaStatus, StoreError,
};
use time::OffsetDateTime;
use uuid::Uuid;

/// Process-local authorisation store.
///
/// Each record is patched under its map shard lock, so the
/// `expected_status` check and the write are atomic per authorisation.
#[derive(Default)]
pub struct InMemoryAuthorisationStore {
    records: DashMap<AuthorisationId, Authorisation>,
}

impl InMemoryAuthorisationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AuthorisationStore for InMemoryAuthorisationStore {
    async fn create(&self, new: NewAuthorisation) -> Result<Authorisation, StoreError> {
        let authorisation = Authorisation {
            id: Uuid::new_v4(),
            parent_id: new.parent_id,
            authorisation_type: new.authorisation_type,
            sca_status: ScaStatus::Received,
            sca_approach: Some(new.sca_approach),
            psu_data: new.psu_data,
            chosen_sca_method: None,
            available_sca_methods: Vec::new(),
            challenge_data: None,
            redirect_uri: new.redirect_uri,
            created_at: OffsetDateTime::now_utc(),
            expires_at: new.expires_at,
        };
        self.records.insert(authorisation.id, authorisation.clone());
        Ok(authorisation)
    }

    async fn get(&self, id: AuthorisationId) -> Result<Option<Authorisation>, StoreError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn update(
        &self,
        id: AuthorisationId,
        patch: AuthorisationPatch,
    ) -> Result<Authorisation, StoreError> {
        let mut record = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(expected) = patch.expected_status
            && record.sca_status != expected
        {
            return Err(StoreError::Conflict {
                id,
                expected,
                actual: record.sca_status,
            });
        }
        patch.apply_to(record.value_mut());
        Ok(record.value().clone())
    }

    async fn list_by_parent(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Vec<AuthorisationId>, StoreError> {
        let mut matching: Vec<(OffsetDateTime, AuthorisationId)> = self
            .records
            .iter()
            .filter(|r| r.parent_id == parent_id && r.authorisation_type == authorisation_type)
            .map(|r| (r.created_at, r.id))
            .collect();
        matching.sort_unstable();
        Ok(matching.into_iter().map(|(_, id)| id).collect())
    }

    async fn get_sca_approach(
        &self,
        id: AuthorisationId,
    ) -> Result<Option<ScaApproach>, StoreError> {
        self.records
            .get(&id)
            .map(|r| r.sca_approach)
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use sca_authorisation_sdk::PsuIdData;
    use time::Duration;

    use super::*;

    fn new_authorisation(
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> NewAuthorisation {
        NewAuthorisation {
            parent_id: parent_id.to_owned(),
            authorisation_type,
            psu_data: Some(PsuIdData::new("alice")),
            sca_approach: ScaApproach::Embedded,
            redirect_uri: None,
            expires_at: OffsetDateTime::now_utc() + Duration::minutes(15),
        }
    }

    #[tokio::test]
    async fn create_starts_in_received_with_approach_committed() {
        let store = InMemoryAuthorisationStore::new();
        let created = store
            .create(new_authorisation("payment-1", AuthorisationType::PaymentCreation))
            .await
            .unwrap();

        assert_eq!(created.sca_status, ScaStatus::Received);
        assert_eq!(
            store.get_sca_approach(created.id).await.unwrap(),
            Some(ScaApproach::Embedded)
        );
        assert_eq!(store.get(created.id).await.unwrap(), Some(created));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn stale_expected_status_is_a_conflict() {
        let store = InMemoryAuthorisationStore::new();
        let created = store
            .create(new_authorisation("payment-1", AuthorisationType::PaymentCreation))
            .await
            .unwrap();

        let advance = AuthorisationPatch {
            expected_status: Some(ScaStatus::Received),
            sca_status: Some(ScaStatus::PsuAuthenticated),
            ..AuthorisationPatch::default()
        };
        store.update(created.id, advance.clone()).await.unwrap();

        let err = store.update(created.id, advance).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                id: created.id,
                expected: ScaStatus::Received,
                actual: ScaStatus::PsuAuthenticated,
            }
        );
        assert_eq!(
            store.get(created.id).await.unwrap().unwrap().sca_status,
            ScaStatus::PsuAuthenticated
        );
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = InMemoryAuthorisationStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.get(id).await.unwrap(), None);
        assert_eq!(
            store.get_sca_approach(id).await.unwrap_err(),
            StoreError::NotFound(id)
        );
        assert_eq!(
            store
                .update(id, AuthorisationPatch::default())
                .await
                .unwrap_err(),
            StoreError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn list_by_parent_filters_parent_and_type() {
        let store = InMemoryAuthorisationStore::new();
        let first = store
            .create(new_authorisation("payment-1", AuthorisationType::PaymentCreation))
            .await
            .unwrap();
        let second = store
            .create(new_authorisation("payment-1", AuthorisationType::PaymentCreation))
            .await
            .unwrap();
        store
            .create(new_authorisation("payment-1", AuthorisationType::PaymentCancellation))
            .await
            .unwrap();
        store
            .create(new_authorisation("payment-2", AuthorisationType::PaymentCreation))
            .await
            .unwrap();

        let ids = store
            .list_by_parent("payment-1", AuthorisationType::PaymentCreation)
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&first.id));
        assert!(ids.contains(&second.id));
    }
}
