#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The process-wide auth manager is set exactly once.

mod common;

use std::sync::Arc;

use auth_manager_gw::{AuthManagerGwConfig, auth_manager, init_auth_manager};
use auth_manager_sdk::AuthManagerError;
use common::{Scripted, registry_with};

// Single test: the global lives for the whole test binary.
#[tokio::test]
async fn global_auth_manager_is_set_once() {
    assert_eq!(
        auth_manager().err(),
        Some(AuthManagerError::NotInitialized)
    );

    let first = Arc::new(Scripted::allowing("first"));
    let registry = registry_with(vec![("first", "hyperspot", 0, Arc::clone(&first))]);
    init_auth_manager(&AuthManagerGwConfig::default(), registry)
        .await
        .unwrap();

    let second = Arc::new(Scripted::denying("second"));
    let registry = registry_with(vec![("second", "hyperspot", 0, Arc::clone(&second))]);
    let err = init_auth_manager(&AuthManagerGwConfig::default(), registry)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already initialized"));
    assert_eq!(second.init_calls(), 0);

    let api = auth_manager().unwrap();
    assert_eq!(api.get_subject_name().await.unwrap(), "alice");
    assert_eq!(first.init_calls(), 1);
}
