#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static SCA Backend Plugin
//!
//! This plugin stands in for the core banking system during development and
//! testing. It provides an `AuthenticationBackend` over configured PSUs and a
//! `BusinessObjectProvider` over configured payments and consents.
//!
//! ## Behavior
//!
//! - PSUs log in with the configured password and are offered their
//!   configured SCA methods
//! - every code-based method accepts the configured TAN; after
//!   `max_failed_attempts` wrong TANs the authorisation fails
//! - decoupled confirmations are approved at once
//! - the redirect confirmation code must equal `redirect_confirmation_code`
//!
//! ## Configuration
//!
//! ```yaml
//! modules:
//!   static_sca_backend_plugin:
//!     config:
//!       tan: "123456"
//!       max_failed_attempts: 3
//!       redirect_confirmation_code: "confirmed"
//!       execution_status: ACSC
//!       psus:
//!         - psu_id: "alice"
//!           password: "12345"
//!           methods:
//!             - authentication_method_id: "sms"
//!               authentication_type: "SMS_OTP"
//!       payments:
//!         - payment_id: "payment-1"
//!           kind: single
//!           payment_product: "sepa-credit-transfers"
//!           transaction_status: RCVD
//!       consents: []
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use config::StaticScaBackendConfig;
pub use module::{PluginClients, StaticScaBackendPlugin};
