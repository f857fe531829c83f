//! Domain layer for the auth manager gateway.

pub mod error;
pub mod local_client;
pub mod service;

pub use error::DomainError;
pub use local_client::AuthManagerGwLocalClient;
pub use service::Service;
