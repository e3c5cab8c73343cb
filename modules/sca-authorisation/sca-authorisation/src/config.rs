//! Configuration for the SCA authorisation module.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use sca_authorisation_sdk::{PaymentKind, ScaApproach};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::error::DomainError;

/// Environment prefix for overrides, e.g.
/// `SCA__MODULES__SCA_AUTHORISATION__CONFIG__AUTHORISATION_EXPIRATION_SECS=60`.
pub const ENV_PREFIX: &str = "SCA__";

/// Module name under `modules.<name>.config` in the YAML file.
pub const MODULE_NAME: &str = "sca_authorisation";

/// Placeholders accepted by [`RedirectConfig::link_template`].
pub const AUTHORISATION_ID_PLACEHOLDER: &str = "{authorisation-id}";
pub const PARENT_ID_PLACEHOLDER: &str = "{parent-id}";

/// Module configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaAuthorisationConfig {
    /// Approaches the bank supports, in order of preference.
    pub sca_approaches: Vec<ScaApproach>,

    /// Lifetime of a new authorisation record.
    pub authorisation_expiration_secs: u64,

    pub exemption: ExemptionConfig,

    pub redirect: RedirectConfig,
}

impl Default for ScaAuthorisationConfig {
    fn default() -> Self {
        Self {
            sca_approaches: vec![
                ScaApproach::Embedded,
                ScaApproach::Redirect,
                ScaApproach::Decoupled,
            ],
            authorisation_expiration_secs: 900,
            exemption: ExemptionConfig::default(),
            redirect: RedirectConfig::default(),
        }
    }
}

/// Which objects may end in `EXEMPTED` when the bank waives SCA.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExemptionConfig {
    pub eligible_payment_kinds: Vec<PaymentKind>,
    pub consents_eligible: bool,
}

impl Default for ExemptionConfig {
    fn default() -> Self {
        Self {
            eligible_payment_kinds: vec![PaymentKind::Single, PaymentKind::Bulk, PaymentKind::Raw],
            consents_eligible: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedirectConfig {
    /// Bank SCA page. `{authorisation-id}` and `{parent-id}` are substituted.
    pub link_template: String,

    /// Accept the confirmation-code step after the PSU returns from the bank
    /// page. When disabled a confirmation code is rejected as malformed,
    /// unless the authorisation is terminal or `STARTED`.
    pub confirmation_required: bool,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            link_template: "https://bank.example.com/sca/{authorisation-id}?parent={parent-id}"
                .to_owned(),
            confirmation_required: true,
        }
    }
}

impl RedirectConfig {
    #[must_use]
    pub fn render_link(&self, authorisation_id: &str, parent_id: &str) -> String {
        self.link_template
            .replace(AUTHORISATION_ID_PLACEHOLDER, authorisation_id)
            .replace(PARENT_ID_PLACEHOLDER, parent_id)
    }
}

impl ScaAuthorisationConfig {
    /// # Errors
    ///
    /// `Configuration` if no approach is configured, an approach is listed
    /// twice, the expiration is zero or the redirect link template lacks the
    /// authorisation id placeholder.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.sca_approaches.is_empty() {
            return Err(DomainError::configuration(
                "sca_approaches must name at least one approach",
            ));
        }
        for (i, approach) in self.sca_approaches.iter().enumerate() {
            if self.sca_approaches[..i].contains(approach) {
                return Err(DomainError::configuration(format!(
                    "sca_approaches lists {approach} more than once"
                )));
            }
        }
        if self.authorisation_expiration_secs == 0 {
            return Err(DomainError::configuration(
                "authorisation_expiration_secs must be greater than zero",
            ));
        }
        if self.sca_approaches.contains(&ScaApproach::Redirect)
            && !self
                .redirect
                .link_template
                .contains(AUTHORISATION_ID_PLACEHOLDER)
        {
            return Err(DomainError::configuration(format!(
                "redirect.link_template must contain {AUTHORISATION_ID_PLACEHOLDER}"
            )));
        }
        Ok(())
    }
}

/// YAML file layered with `SCA__` environment overrides.
#[must_use]
pub fn config_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extract `modules.<module>.config`, falling back to defaults when the
/// section is absent.
///
/// # Errors
///
/// Returns an error if the section exists but does not deserialize.
pub fn module_config<T>(figment: &Figment, module: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    let key = format!("modules.{module}.config");
    if figment.find_value(&key).is_err() {
        return Ok(T::default());
    }
    figment
        .extract_inner(&key)
        .map_err(|e| anyhow::anyhow!("invalid configuration for module '{module}': {e}"))
}

/// Load and validate the module configuration from a YAML file.
///
/// # Errors
///
/// Returns an error if the file does not deserialize or fails validation.
pub fn load_config(path: &Path) -> anyhow::Result<ScaAuthorisationConfig> {
    let cfg: ScaAuthorisationConfig = module_config(&config_figment(path), MODULE_NAME)?;
    cfg.validate()?;
    Ok(cfg)
}
