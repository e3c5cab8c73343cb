//! SCA authorisation module.

use std::sync::{Arc, OnceLock};

use sca_authorisation_sdk::{AuthorisationStore, BusinessObjectProvider, ScaAuthorisationClient};
use tracing::info;

use crate::config::ScaAuthorisationConfig;
use crate::domain::{AuthenticationBackends, ScaAuthorisationLocalClient, Service};

/// Collaborators the module is wired with.
pub struct ModuleDeps {
    pub store: Arc<dyn AuthorisationStore>,
    pub backends: AuthenticationBackends,
    pub objects: Arc<dyn BusinessObjectProvider>,
}

/// SCA authorisation module.
///
/// This module:
/// 1. Validates the configuration
/// 2. Builds the processor, the approach services and the dispatcher
/// 3. Hands out an `ScaAuthorisationClient` for the payment and consent layers
#[derive(Default)]
pub struct ScaAuthorisationModule {
    service: OnceLock<Arc<Service>>,
}

impl ScaAuthorisationModule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the module was
    /// already initialised.
    #[tracing::instrument(skip_all, fields(approaches))]
    pub fn init(
        &self,
        cfg: &ScaAuthorisationConfig,
        deps: ModuleDeps,
    ) -> anyhow::Result<Arc<dyn ScaAuthorisationClient>> {
        let approaches = cfg
            .sca_approaches
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(",");
        tracing::Span::current().record("approaches", approaches.as_str());
        info!(
            approaches = %approaches,
            expiration_secs = cfg.authorisation_expiration_secs,
            "Initializing sca_authorisation"
        );

        let svc = Arc::new(Service::new(cfg, deps.store, deps.backends, deps.objects)?);
        let api: Arc<dyn ScaAuthorisationClient> =
            Arc::new(ScaAuthorisationLocalClient::new(svc.clone()));

        self.service
            .set(svc)
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;

        info!("sca_authorisation initialized");
        Ok(api)
    }

    #[must_use]
    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.get().cloned()
    }
}
