//! Static auth manager plugin.
//!
//! Answers authorization checks from configuration alone:
//! - `allow_all`: every signed-in subject may do everything
//! - `static_grants`: each subject gets an explicit list of grants
//!
//! Meant for development, tests, and single-operator installations.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::{AuthMode, GrantConfig, StaticAuthPluginConfig, SubjectConfig};
pub use domain::{Grant, InMemoryDagRegistry, Service, StaticSubjectResolver};
pub use module::StaticAuthPlugin;
