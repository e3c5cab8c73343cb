//! Configuration for the static SCA backend plugin.

use sca_authorisation_sdk::{
    BusinessObject, ConsentKind, ConsentObject, CurrencyConversionInfo, PaymentKind,
    PaymentObject, PsuIdData, ScaMethod, TransactionStatus,
};
use serde::Deserialize;

/// Module name under `modules.<name>.config` in the YAML file.
pub const MODULE_NAME: &str = "static_sca_backend_plugin";

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticScaBackendConfig {
    /// PSUs the bank knows, with their passwords and SCA methods.
    pub psus: Vec<PsuConfig>,

    /// The one TAN every code-based method accepts.
    pub tan: String,

    /// Wrong TANs tolerated per authorisation before the flow fails.
    pub max_failed_attempts: u32,

    /// Code the PSU brings back from the bank's redirect page.
    pub redirect_confirmation_code: String,

    /// Status a payment gets when executed.
    pub execution_status: TransactionStatus,

    /// Reported for every payment when set.
    pub currency_conversion: Option<CurrencyConversionInfo>,

    /// Payments and consents served by the object provider.
    pub payments: Vec<PaymentObject>,
    pub consents: Vec<ConsentObject>,
}

impl Default for StaticScaBackendConfig {
    fn default() -> Self {
        Self {
            psus: vec![PsuConfig::default()],
            tan: "123456".to_owned(),
            max_failed_attempts: 3,
            redirect_confirmation_code: "confirmed".to_owned(),
            execution_status: TransactionStatus::Acsc,
            currency_conversion: None,
            payments: vec![PaymentObject {
                payment_id: "payment-1".to_owned(),
                kind: PaymentKind::Single,
                payment_product: "sepa-credit-transfers".to_owned(),
                transaction_status: TransactionStatus::Rcvd,
                psu_data: vec![PsuIdData::new("alice")],
                multilevel_sca_required: false,
                instructed_amount: None,
            }],
            consents: vec![ConsentObject {
                consent_id: "consent-1".to_owned(),
                kind: ConsentKind::Account,
                psu_data: vec![PsuIdData::new("alice")],
                multilevel_sca_required: false,
            }],
        }
    }
}

impl StaticScaBackendConfig {
    /// Every configured payment and consent.
    #[must_use]
    pub fn business_objects(&self) -> Vec<BusinessObject> {
        self.payments
            .iter()
            .cloned()
            .map(BusinessObject::Payment)
            .chain(self.consents.iter().cloned().map(BusinessObject::Consent))
            .collect()
    }
}

/// A PSU known to the bank.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PsuConfig {
    pub psu_id: String,
    pub password: String,

    /// Methods offered after login. Empty means no SCA is required.
    pub methods: Vec<ScaMethod>,

    /// The bank waives SCA for this PSU.
    pub sca_exempted: bool,
}

impl Default for PsuConfig {
    fn default() -> Self {
        Self {
            psu_id: "alice".to_owned(),
            password: "12345".to_owned(),
            methods: vec![
                ScaMethod {
                    authentication_method_id: "sms".to_owned(),
                    authentication_type: "SMS_OTP".to_owned(),
                    authentication_version: None,
                    name: Some("SMS to +49 170 ***123".to_owned()),
                    explanation: None,
                    decoupled: false,
                },
                ScaMethod {
                    authentication_method_id: "push".to_owned(),
                    authentication_type: "PUSH_OTP".to_owned(),
                    authentication_version: None,
                    name: Some("Banking app".to_owned()),
                    explanation: None,
                    decoupled: true,
                },
            ],
            sca_exempted: false,
        }
    }
}
