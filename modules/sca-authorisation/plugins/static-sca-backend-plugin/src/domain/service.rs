//! Service implementation for the static SCA backend plugin.

use std::collections::HashMap;

use dashmap::DashMap;
use sca_authorisation_sdk::{
    AuthorisationCodeResult, AuthorisationId, AvailableScaMethods, BackendError, ChallengeData,
    CurrencyConversionInfo, DecoupledOutcome, ExecutionResult, OtpFormat, PsuAuthentication,
    PsuCredentials, PsuIdData, RedirectConfirmation, ScaConfirmation, ScaStatus,
    TransactionStatus,
};
use secrecy::ExposeSecret;

use crate::config::{PsuConfig, StaticScaBackendConfig};

/// Static bank backend.
///
/// PSUs, methods and outcomes come from configuration. Failed TAN attempts
/// are counted per authorisation.
pub struct Service {
    psus: HashMap<String, PsuConfig>,
    tan: String,
    max_failed_attempts: u32,
    redirect_confirmation_code: String,
    execution_status: TransactionStatus,
    currency_conversion: Option<CurrencyConversionInfo>,
    failed_attempts: DashMap<AuthorisationId, u32>,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticScaBackendConfig) -> Self {
        let psus = cfg
            .psus
            .iter()
            .map(|p| (p.psu_id.clone(), p.clone()))
            .collect();

        Self {
            psus,
            tan: cfg.tan.clone(),
            max_failed_attempts: cfg.max_failed_attempts,
            redirect_confirmation_code: cfg.redirect_confirmation_code.clone(),
            execution_status: cfg.execution_status,
            currency_conversion: cfg.currency_conversion.clone(),
            failed_attempts: DashMap::new(),
        }
    }

    fn psu(&self, psu_data: Option<&PsuIdData>) -> Result<&PsuConfig, BackendError> {
        psu_data
            .and_then(|p| p.psu_id.as_deref())
            .and_then(|id| self.psus.get(id))
            .ok_or(BackendError::PsuCredentialsInvalid)
    }

    /// # Errors
    ///
    /// `PsuCredentialsInvalid` for an unknown PSU or a wrong password.
    pub fn authenticate(
        &self,
        psu_data: &PsuIdData,
        credentials: &PsuCredentials,
    ) -> Result<PsuAuthentication, BackendError> {
        let psu = self.psu(Some(psu_data))?;
        if credentials.password().expose_secret() != psu.password {
            return Err(BackendError::PsuCredentialsInvalid);
        }
        Ok(PsuAuthentication {
            sca_exempted: psu.sca_exempted,
        })
    }

    /// # Errors
    ///
    /// `PsuCredentialsInvalid` if the PSU is unknown.
    pub fn methods(
        &self,
        psu_data: Option<&PsuIdData>,
    ) -> Result<AvailableScaMethods, BackendError> {
        let psu = self.psu(psu_data)?;
        Ok(AvailableScaMethods {
            methods: psu.methods.clone(),
            sca_exempted: psu.sca_exempted,
        })
    }

    /// # Errors
    ///
    /// - `PsuCredentialsInvalid` if the PSU is unknown
    /// - `Format` if the PSU has no such method
    pub fn request_code(
        &self,
        psu_data: Option<&PsuIdData>,
        authentication_method_id: &str,
    ) -> Result<AuthorisationCodeResult, BackendError> {
        let psu = self.psu(psu_data)?;
        let method = psu
            .methods
            .iter()
            .find(|m| m.authentication_method_id == authentication_method_id)
            .ok_or_else(|| {
                BackendError::Format(format!(
                    "method '{authentication_method_id}' is not available to the PSU"
                ))
            })?;

        let channel = method
            .name
            .as_deref()
            .unwrap_or(&method.authentication_method_id);
        let numeric = self.tan.chars().all(|c| c.is_ascii_digit());
        Ok(AuthorisationCodeResult {
            chosen_sca_method: Some(method.clone()),
            challenge_data: Some(ChallengeData {
                data: vec![format!("Enter the TAN sent via {channel}")],
                otp_max_length: u32::try_from(self.tan.len()).ok(),
                otp_format: Some(if numeric {
                    OtpFormat::Integer
                } else {
                    OtpFormat::Characters
                }),
                ..ChallengeData::default()
            }),
            sca_exempted: false,
            psu_message: None,
        })
    }

    /// Check the second factor. Decoupled confirmations are approved at once.
    ///
    /// # Errors
    ///
    /// `ScaInvalid` for a wrong TAN, with `attempts_exhausted` set once the
    /// configured number of failures is reached.
    pub fn verify(
        &self,
        authorisation_id: AuthorisationId,
        confirmation: &ScaConfirmation,
    ) -> Result<ExecutionResult, BackendError> {
        if let ScaConfirmation::AuthenticationCode(code) = confirmation
            && *code != self.tan
        {
            let failed = {
                let mut failed = self.failed_attempts.entry(authorisation_id).or_insert(0);
                *failed += 1;
                *failed
            };
            let attempts_exhausted = failed >= self.max_failed_attempts;
            if attempts_exhausted {
                // The authorisation is failed for good; nothing will ask again.
                self.failed_attempts.remove(&authorisation_id);
            }
            tracing::debug!(
                authorisation_id = %authorisation_id,
                failed,
                attempts_exhausted,
                "wrong TAN"
            );
            return Err(BackendError::ScaInvalid { attempts_exhausted });
        }

        self.failed_attempts.remove(&authorisation_id);
        Ok(self.execution(false))
    }

    /// Execute for a PSU that needs no second factor.
    ///
    /// # Errors
    ///
    /// `PsuCredentialsInvalid` if the PSU is unknown.
    pub fn execute_without_sca(
        &self,
        psu_data: Option<&PsuIdData>,
    ) -> Result<ExecutionResult, BackendError> {
        let psu = self.psu(psu_data)?;
        Ok(self.execution(psu.sca_exempted))
    }

    /// # Errors
    ///
    /// `PsuCredentialsInvalid` if the PSU is unknown.
    pub fn proceed_decoupled(
        &self,
        psu_data: Option<&PsuIdData>,
        authentication_method_id: Option<&str>,
    ) -> Result<DecoupledOutcome, BackendError> {
        let psu = self.psu(psu_data)?;
        let channel = authentication_method_id
            .and_then(|id| {
                psu.methods
                    .iter()
                    .find(|m| m.authentication_method_id == id)
            })
            .and_then(|m| m.name.as_deref())
            .unwrap_or("your banking app");
        Ok(DecoupledOutcome {
            sca_status: ScaStatus::ScaMethodSelected,
            psu_message: Some(format!("Please confirm the operation in {channel}")),
        })
    }

    /// # Errors
    ///
    /// `ScaInvalid` if the code is not the configured confirmation code.
    pub fn confirm_redirect(&self, code: &str) -> Result<RedirectConfirmation, BackendError> {
        if code != self.redirect_confirmation_code {
            return Err(BackendError::ScaInvalid {
                attempts_exhausted: true,
            });
        }
        Ok(RedirectConfirmation {
            sca_status: ScaStatus::Finalised,
            transaction_status: Some(self.execution_status),
            psu_message: None,
        })
    }

    #[must_use]
    pub fn currency_conversion(&self) -> Option<CurrencyConversionInfo> {
        self.currency_conversion.clone()
    }

    fn execution(&self, sca_exempted: bool) -> ExecutionResult {
        ExecutionResult {
            transaction_status: self.execution_status,
            sca_exempted,
            currency_conversion: self.currency_conversion.clone(),
            psu_message: None,
        }
    }
}
