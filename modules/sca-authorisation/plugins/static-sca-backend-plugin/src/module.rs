//! Static SCA backend plugin module.

use std::sync::{Arc, OnceLock};

use sca_authorisation_sdk::{AuthenticationBackend, BusinessObject, BusinessObjectProvider};
use tracing::info;

use crate::config::StaticScaBackendConfig;
use crate::domain::{Service, StaticObjectProvider};

/// Clients the plugin hands to the SCA authorisation module.
#[derive(Clone)]
pub struct PluginClients {
    pub backend: Arc<dyn AuthenticationBackend>,
    pub objects: Arc<dyn BusinessObjectProvider>,
}

/// Static SCA backend plugin module.
///
/// Serves configured PSUs, SCA methods, payments and consents in place of a
/// core banking system.
#[derive(Default)]
pub struct StaticScaBackendPlugin {
    service: OnceLock<Arc<Service>>,
    objects: OnceLock<Arc<StaticObjectProvider>>,
}

impl StaticScaBackendPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns an error if the plugin was already initialised.
    pub fn init(&self, cfg: &StaticScaBackendConfig) -> anyhow::Result<PluginClients> {
        info!("Initializing static_sca_backend_plugin");
        tracing::warn!(
            "Static SCA backend accepts a fixed TAN for every PSU. \
             Do NOT use it in production."
        );

        info!(
            psu_count = cfg.psus.len(),
            payment_count = cfg.payments.len(),
            consent_count = cfg.consents.len(),
            max_failed_attempts = cfg.max_failed_attempts,
            "Loaded plugin configuration"
        );

        let service = Arc::new(Service::from_config(cfg));
        let objects = Arc::new(StaticObjectProvider::new(cfg.business_objects()));
        self.service
            .set(service.clone())
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;
        self.objects
            .set(objects.clone())
            .map_err(|_| anyhow::anyhow!("Object provider already initialized"))?;

        info!("Static SCA backend plugin initialized");
        Ok(PluginClients {
            backend: service,
            objects,
        })
    }

    /// Current state of a configured payment or consent.
    #[must_use]
    pub fn business_object(&self, id: &str) -> Option<BusinessObject> {
        self.objects.get().and_then(|o| o.get(id))
    }
}
