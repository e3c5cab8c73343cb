//! In-memory payments and consents.

use async_trait::async_trait;
use dashmap::DashMap;
use sca_authorisation_sdk::{
    AuthorisationType, BackendError, BusinessObject, BusinessObjectProvider, TransactionStatus,
};

/// Serves the configured payments and consents and records the transaction
/// status and multilevel flag the SCA flow sets on payments.
#[derive(Default)]
pub struct StaticObjectProvider {
    objects: DashMap<String, BusinessObject>,
}

impl StaticObjectProvider {
    #[must_use]
    pub fn new(objects: impl IntoIterator<Item = BusinessObject>) -> Self {
        Self {
            objects: objects
                .into_iter()
                .map(|o| (o.id().to_owned(), o))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<BusinessObject> {
        self.objects.get(id).map(|o| o.value().clone())
    }
}

#[async_trait]
impl BusinessObjectProvider for StaticObjectProvider {
    async fn get_business_object(
        &self,
        parent_id: &str,
        authorisation_type: AuthorisationType,
    ) -> Result<Option<BusinessObject>, BackendError> {
        Ok(self.get(parent_id).filter(|o| match o {
            BusinessObject::Payment(_) => authorisation_type.is_payment(),
            BusinessObject::Consent(_) => !authorisation_type.is_payment(),
        }))
    }

    async fn update_transaction_status(
        &self,
        payment_id: &str,
        transaction_status: TransactionStatus,
    ) -> Result<(), BackendError> {
        let mut object = self
            .objects
            .get_mut(payment_id)
            .ok_or_else(|| BackendError::NotFound(payment_id.to_owned()))?;
        let BusinessObject::Payment(payment) = object.value_mut() else {
            return Err(BackendError::NotFound(payment_id.to_owned()));
        };
        tracing::debug!(
            payment_id,
            from = ?payment.transaction_status,
            to = ?transaction_status,
            "payment transaction status updated"
        );
        payment.transaction_status = transaction_status;
        Ok(())
    }

    async fn mark_multilevel_sca_required(&self, payment_id: &str) -> Result<(), BackendError> {
        let mut object = self
            .objects
            .get_mut(payment_id)
            .ok_or_else(|| BackendError::NotFound(payment_id.to_owned()))?;
        let BusinessObject::Payment(payment) = object.value_mut() else {
            return Err(BackendError::NotFound(payment_id.to_owned()));
        };
        payment.multilevel_sca_required = true;
        Ok(())
    }
}
