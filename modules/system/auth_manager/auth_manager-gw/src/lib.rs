//! Auth Manager Gateway Module
//!
//! This module selects the auth manager backend registered for the configured
//! vendor and exposes it, wrapped with the gateway's decision policy, as the
//! single process-wide [`auth_manager_sdk::AuthManager`].
//!
//! The selection happens once during startup and cannot be replaced later.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::AuthManagerGwConfig;
pub use module::{AuthManagerGateway, auth_manager, init_auth_manager};
