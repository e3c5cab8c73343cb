pub mod client;
pub mod objects;
pub mod service;

pub use objects::StaticObjectProvider;
pub use service::Service;
