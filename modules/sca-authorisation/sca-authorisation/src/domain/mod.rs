//! Domain layer for the SCA authorisation module.

pub mod approach;
pub mod approach_resolver;
pub mod backends;
pub mod dispatcher;
pub mod error;
pub mod local_client;
pub mod processor;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;


pub use approach_resolver::{ApproachResolver, SupportedApproaches};
pub use backends::AuthenticationBackends;
pub use dispatcher::ChainDispatcher;
pub use error::DomainError;
pub use local_client::ScaAuthorisationLocalClient;
pub use processor::{AuthorisationProcessor, ProcessorRequest, ProcessorResponse};
pub use service::Service;
