#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Racing initializations of the process-wide auth manager run one backend
//! `init` hook.

mod common;

use std::sync::Arc;
use std::time::Duration;

use auth_manager_gw::{AuthManagerGwConfig, auth_manager, init_auth_manager};
use common::{Scripted, registry_with};

// Single test: the global lives for the whole test binary.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_initializations_run_one_init_hook() {
    let first = Arc::new(Scripted::allowing("first").slow_init(Duration::from_millis(100)));
    let second = Arc::new(Scripted::denying("second").slow_init(Duration::from_millis(100)));
    let first_registry = registry_with(vec![("first", "hyperspot", 0, Arc::clone(&first))]);
    let second_registry = registry_with(vec![("second", "hyperspot", 0, Arc::clone(&second))]);
    let cfg = AuthManagerGwConfig::default();

    let (a, b) = tokio::join!(
        init_auth_manager(&cfg, first_registry),
        init_auth_manager(&cfg, second_registry),
    );

    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    assert_eq!(first.init_calls() + second.init_calls(), 1);

    let failed = a.err().or(b.err()).unwrap();
    assert!(failed.to_string().contains("already initialized"));

    let winner = if first.init_calls() == 1 { "first" } else { "second" };
    assert_eq!(auth_manager().unwrap().name(), winner);
}
