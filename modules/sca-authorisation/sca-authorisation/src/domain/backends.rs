//! Authentication backend per payment kind and consent kind.

use std::sync::Arc;

use sca_authorisation_sdk::{AuthenticationBackend, BusinessObject, ConsentKind, PaymentKind};

/// Table of backends, one per kind of protected object.
#[derive(Clone)]
pub struct AuthenticationBackends {
    single: Arc<dyn AuthenticationBackend>,
    periodic: Arc<dyn AuthenticationBackend>,
    bulk: Arc<dyn AuthenticationBackend>,
    raw: Arc<dyn AuthenticationBackend>,
    account_consent: Arc<dyn AuthenticationBackend>,
    funds_confirmation_consent: Arc<dyn AuthenticationBackend>,
}

impl AuthenticationBackends {
    /// Same backend for every kind.
    #[must_use]
    pub fn uniform(backend: Arc<dyn AuthenticationBackend>) -> Self {
        Self {
            single: backend.clone(),
            periodic: backend.clone(),
            bulk: backend.clone(),
            raw: backend.clone(),
            account_consent: backend.clone(),
            funds_confirmation_consent: backend,
        }
    }

    #[must_use]
    pub fn with_payment_backend(
        mut self,
        kind: PaymentKind,
        backend: Arc<dyn AuthenticationBackend>,
    ) -> Self {
        match kind {
            PaymentKind::Single => self.single = backend,
            PaymentKind::Periodic => self.periodic = backend,
            PaymentKind::Bulk => self.bulk = backend,
            PaymentKind::Raw => self.raw = backend,
        }
        self
    }

    #[must_use]
    pub fn with_consent_backend(
        mut self,
        kind: ConsentKind,
        backend: Arc<dyn AuthenticationBackend>,
    ) -> Self {
        match kind {
            ConsentKind::Account => self.account_consent = backend,
            ConsentKind::FundsConfirmation => self.funds_confirmation_consent = backend,
        }
        self
    }

    #[must_use]
    pub fn for_object(&self, object: &BusinessObject) -> &dyn AuthenticationBackend {
        let backend = match object {
            BusinessObject::Payment(p) => match p.kind {
                PaymentKind::Single => &self.single,
                PaymentKind::Periodic => &self.periodic,
                PaymentKind::Bulk => &self.bulk,
                PaymentKind::Raw => &self.raw,
            },
            BusinessObject::Consent(c) => match c.kind {
                ConsentKind::Account => &self.account_consent,
                ConsentKind::FundsConfirmation => &self.funds_confirmation_consent,
            },
        };
        backend.as_ref()
    }
}

impl std::fmt::Debug for AuthenticationBackends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationBackends").finish_non_exhaustive()
    }
}
