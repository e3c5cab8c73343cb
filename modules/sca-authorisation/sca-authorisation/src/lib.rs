//! SCA Authorisation Module
//!
//! This module drives Strong Customer Authentication for payment and consent
//! authorisations: it resolves the SCA approach (embedded, decoupled or
//! redirect), runs the authorisation state machine one step per update and
//! persists each transition through an `AuthorisationStore`.
//!
//! Provides the `ScaAuthorisationClient` trait implementation consumed by the
//! payment and consent orchestration layers.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::{ScaAuthorisationConfig, load_config};
pub use domain::{AuthenticationBackends, ScaAuthorisationLocalClient, Service};
pub use infra::storage::InMemoryAuthorisationStore;
pub use module::{ModuleDeps, ScaAuthorisationModule};
