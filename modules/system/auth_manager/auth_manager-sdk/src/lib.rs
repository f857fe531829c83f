//! Auth Manager SDK
//!
//! This crate provides the public API for the `auth_manager` module:
//!
//! - [`AuthManager`] - Authorization contract implemented by every backend
//! - [`SubjectResolver`], [`DagRegistry`] - Collaborators the contract consumes
//! - [`AuthorizationRequest`] and the per-kind details records - Request models
//! - [`AuthManagerPluginRegistry`] - Backend registration and vendor selection
//! - [`AuthManagerError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use auth_manager_sdk::{AuthManager, DagDetails, ResourceMethod};
//!
//! // Resolve the subject once per request and pass it explicitly
//! let subject = manager.get_subject().await;
//!
//! // Single check
//! let can_read = manager
//!     .is_authorized_dag(ResourceMethod::Get, Some(&DagDetails::for_dag("etl")), subject.as_ref())
//!     .await;
//!
//! // Bulk listing
//! let readable = manager
//!     .get_permitted_dag_ids(&dag_registry, &[ResourceMethod::Get], subject.as_ref())
//!     .await?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;
pub mod registry;

// Re-export main types at crate root
pub use api::{AuthManager, DEFAULT_DAG_FILTER_METHODS, DagRegistry, SubjectResolver};
pub use error::AuthManagerError;
pub use models::{
    AccessView, AuthorizationRequest, ConfigurationDetails, ConnectionDetails, ConnectionRequest,
    CustomMethod, DagAccessEntity, DagDetails, DagRequest, DatasetDetails, MenuItem, PoolDetails,
    PoolRequest, ResourceDetails, ResourceKind, ResourceMethod, Subject, UnknownMethodError,
    VariableDetails, VariableRequest,
};
pub use registry::{AuthManagerPluginRegistry, PluginInstance};
