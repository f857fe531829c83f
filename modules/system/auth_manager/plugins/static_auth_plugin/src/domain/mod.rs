pub mod client;
pub mod dag_registry;
pub mod grants;
pub mod service;

pub use dag_registry::InMemoryDagRegistry;
pub use grants::{Check, Grant};
pub use service::{DEFAULT_SUBJECT_NAME, Service, StaticSubjectResolver};
