#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Behaviour of the derived operations (batch, filter, menu, listing) that
//! every backend inherits from the single-item checks.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use auth_manager_sdk::{
    AccessView, AuthManager, AuthManagerError, ConfigurationDetails, ConnectionDetails,
    ConnectionRequest, CustomMethod, DagDetails, DagRegistry, DagRequest, DatasetDetails,
    MenuItem, PoolDetails, PoolRequest, ResourceDetails, ResourceKind, ResourceMethod, Subject,
    VariableDetails, VariableRequest,
};

/// (kind, method, scoped id); `None` scope is a blanket grant.
type Grant = (ResourceKind, CustomMethod, Option<&'static str>);

/// Backend answering from an in-memory grant table and counting DAG checks.
#[derive(Default)]
struct GrantTable {
    grants: HashMap<&'static str, Vec<Grant>>,
    dag_checks: AtomicUsize,
}

impl GrantTable {
    fn grant(
        mut self,
        subject: &'static str,
        kind: ResourceKind,
        method: impl Into<CustomMethod>,
        scope: Option<&'static str>,
    ) -> Self {
        self.grants
            .entry(subject)
            .or_default()
            .push((kind, method.into(), scope));
        self
    }

    fn allows(
        &self,
        kind: ResourceKind,
        method: &CustomMethod,
        scope: Option<&str>,
        subject: Option<&Subject>,
    ) -> bool {
        let Some(subject) = subject else {
            return false;
        };
        self.grants
            .get(subject.name.as_str())
            .into_iter()
            .flatten()
            .any(|(k, m, s)| *k == kind && m == method && s.is_none_or(|s| scope == Some(s)))
    }

    fn check<D: ResourceDetails>(
        &self,
        method: ResourceMethod,
        details: Option<&D>,
        subject: Option<&Subject>,
    ) -> bool {
        self.allows(
            D::KIND,
            &method.into(),
            details.and_then(D::scope_id),
            subject,
        )
    }

    fn dag_checks(&self) -> usize {
        self.dag_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthManager for GrantTable {
    fn name(&self) -> &str {
        "grant-table"
    }

    async fn get_subject(&self) -> Option<Subject> {
        None
    }

    async fn is_authorized_configuration(
        &self,
        method: ResourceMethod,
        details: Option<&ConfigurationDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_connection(
        &self,
        method: ResourceMethod,
        details: Option<&ConnectionDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_dag(
        &self,
        method: ResourceMethod,
        details: Option<&DagDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.dag_checks.fetch_add(1, Ordering::SeqCst);
        self.check(method, details, subject)
    }

    async fn is_authorized_dataset(
        &self,
        method: ResourceMethod,
        details: Option<&DatasetDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_pool(
        &self,
        method: ResourceMethod,
        details: Option<&PoolDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_variable(
        &self,
        method: ResourceMethod,
        details: Option<&VariableDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.check(method, details, subject)
    }

    async fn is_authorized_view(&self, access_view: AccessView, subject: Option<&Subject>) -> bool {
        self.allows(
            ResourceKind::View,
            &ResourceMethod::Get.into(),
            Some(access_view.as_str()),
            subject,
        )
    }

    async fn is_authorized_custom_view(
        &self,
        method: &CustomMethod,
        resource_name: &str,
        subject: Option<&Subject>,
    ) -> bool {
        self.allows(
            ResourceKind::CustomView,
            method,
            Some(resource_name),
            subject,
        )
    }
}

struct StaticDags(&'static [&'static str]);

#[async_trait]
impl DagRegistry for StaticDags {
    async fn list_all_dag_ids(&self) -> Result<BTreeSet<String>, AuthManagerError> {
        Ok(ids(self.0))
    }
}

struct BrokenDags;

#[async_trait]
impl DagRegistry for BrokenDags {
    async fn list_all_dag_ids(&self) -> Result<BTreeSet<String>, AuthManagerError> {
        Err(AuthManagerError::Internal("metadata database unreachable".to_owned()))
    }
}

fn ids(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| (*s).to_owned()).collect()
}

fn alice() -> Subject {
    Subject::new("1", "alice")
}

fn bob() -> Subject {
    Subject::new("2", "bob")
}

// ── filter_permitted_dag_ids ─────────────────────────────────────────

#[tokio::test]
async fn blanket_get_returns_every_dag_without_per_id_checks() {
    let manager = GrantTable::default().grant("alice", ResourceKind::Dag, ResourceMethod::Get, None);
    let alice = alice();

    let permitted = manager
        .filter_permitted_dag_ids(ids(&["d1", "d2", "d3"]), &[ResourceMethod::Get], Some(&alice))
        .await;

    assert_eq!(permitted, ids(&["d1", "d2", "d3"]));
    assert_eq!(manager.dag_checks(), 1);
}

#[tokio::test]
async fn scoped_get_keeps_only_granted_dags() {
    let manager =
        GrantTable::default().grant("bob", ResourceKind::Dag, ResourceMethod::Get, Some("d1"));
    let bob = bob();

    let permitted = manager
        .filter_permitted_dag_ids(ids(&["d1", "d2"]), &[ResourceMethod::Get], Some(&bob))
        .await;

    assert_eq!(permitted, ids(&["d1"]));
}

#[tokio::test]
async fn empty_methods_check_get_and_put() {
    let manager = GrantTable::default()
        .grant("bob", ResourceKind::Dag, ResourceMethod::Get, Some("read-me"))
        .grant("bob", ResourceKind::Dag, ResourceMethod::Put, Some("edit-me"));
    let bob = bob();

    let permitted = manager
        .filter_permitted_dag_ids(ids(&["read-me", "edit-me", "hidden"]), &[], Some(&bob))
        .await;

    assert_eq!(permitted, ids(&["edit-me", "read-me"]));
}

#[tokio::test]
async fn blanket_put_only_counts_when_put_is_requested() {
    let manager = GrantTable::default().grant("alice", ResourceKind::Dag, ResourceMethod::Put, None);
    let alice = alice();

    let readable = manager
        .filter_permitted_dag_ids(ids(&["d1", "d2"]), &[ResourceMethod::Get], Some(&alice))
        .await;
    assert!(readable.is_empty());

    let editable = manager
        .filter_permitted_dag_ids(ids(&["d1", "d2"]), &[ResourceMethod::Put], Some(&alice))
        .await;
    assert_eq!(editable, ids(&["d1", "d2"]));
}

#[tokio::test]
async fn methods_other_than_get_and_put_never_permit() {
    let manager = GrantTable::default().grant("alice", ResourceKind::Dag, ResourceMethod::Delete, None);
    let alice = alice();

    let permitted = manager
        .filter_permitted_dag_ids(ids(&["d1"]), &[ResourceMethod::Delete], Some(&alice))
        .await;

    assert!(permitted.is_empty());
}

#[tokio::test]
async fn filter_result_is_a_subset_of_input() {
    let manager = GrantTable::default()
        .grant("bob", ResourceKind::Dag, ResourceMethod::Get, Some("d2"))
        .grant("bob", ResourceKind::Dag, ResourceMethod::Get, Some("not-listed"));
    let bob = bob();
    let input = ids(&["d1", "d2", "d3"]);

    let permitted = manager
        .filter_permitted_dag_ids(input.clone(), &[ResourceMethod::Get], Some(&bob))
        .await;

    assert!(permitted.is_subset(&input));
    assert_eq!(permitted, ids(&["d2"]));
}

#[tokio::test]
async fn anonymous_subject_sees_no_dags() {
    let manager = GrantTable::default().grant("alice", ResourceKind::Dag, ResourceMethod::Get, None);

    let permitted = manager
        .filter_permitted_dag_ids(ids(&["d1", "d2"]), &[], None)
        .await;

    assert!(permitted.is_empty());
}

// ── get_permitted_dag_ids ────────────────────────────────────────────

#[tokio::test]
async fn permitted_dag_ids_are_loaded_from_registry() {
    let manager =
        GrantTable::default().grant("bob", ResourceKind::Dag, ResourceMethod::Get, Some("b"));
    let bob = bob();

    let permitted = manager
        .get_permitted_dag_ids(&StaticDags(&["a", "b", "c"]), &[], Some(&bob))
        .await
        .unwrap();

    assert_eq!(permitted, ids(&["b"]));
}

#[tokio::test]
async fn registry_failure_is_propagated() {
    let manager = GrantTable::default();
    let bob = bob();

    let result = manager
        .get_permitted_dag_ids(&BrokenDags, &[], Some(&bob))
        .await;

    assert!(matches!(result, Err(AuthManagerError::Internal(_))));
}

// ── batch_is_authorized_* ────────────────────────────────────────────

#[tokio::test]
async fn empty_batches_are_authorized() {
    let manager = GrantTable::default();

    assert!(manager.batch_is_authorized_pool(&[]).await);
    assert!(manager.batch_is_authorized_connection(&[]).await);
    assert!(manager.batch_is_authorized_dag(&[]).await);
    assert!(manager.batch_is_authorized_variable(&[]).await);
}

#[tokio::test]
async fn batch_is_the_conjunction_of_single_checks() {
    let manager = GrantTable::default()
        .grant("alice", ResourceKind::Variable, ResourceMethod::Get, None)
        .grant("alice", ResourceKind::Variable, ResourceMethod::Put, Some("retries"));
    let alice = alice();

    let get_any = VariableRequest::new(ResourceMethod::Get).with_subject(alice.clone());
    let put_retries = VariableRequest::new(ResourceMethod::Put)
        .with_details(VariableDetails {
            key: Some("retries".to_owned()),
        })
        .with_subject(alice.clone());
    let put_secret = VariableRequest::new(ResourceMethod::Put)
        .with_details(VariableDetails {
            key: Some("secret".to_owned()),
        })
        .with_subject(alice);

    let granted = [get_any.clone(), put_retries.clone()];
    let mixed = [get_any, put_retries, put_secret];

    for batch in [&granted[..], &mixed[..]] {
        let mut expected = true;
        for r in batch {
            expected &= manager
                .is_authorized_variable(r.method, r.details.as_ref(), r.subject.as_ref())
                .await;
        }
        assert_eq!(manager.batch_is_authorized_variable(batch).await, expected);
    }
    assert!(manager.batch_is_authorized_variable(&granted).await);
    assert!(!manager.batch_is_authorized_variable(&mixed).await);
}

#[tokio::test]
async fn batch_outcome_does_not_depend_on_order() {
    let manager =
        GrantTable::default().grant("bob", ResourceKind::Connection, ResourceMethod::Get, None);
    let bob = bob();
    let allowed = ConnectionRequest::new(ResourceMethod::Get).with_subject(bob.clone());
    let denied = ConnectionRequest::new(ResourceMethod::Delete).with_subject(bob);

    assert!(
        !manager
            .batch_is_authorized_connection(&[allowed.clone(), denied.clone()])
            .await
    );
    assert!(
        !manager
            .batch_is_authorized_connection(&[denied, allowed])
            .await
    );
}

#[tokio::test]
async fn batch_requests_carry_their_own_subject() {
    let manager = GrantTable::default()
        .grant("alice", ResourceKind::Dag, ResourceMethod::Get, None)
        .grant("bob", ResourceKind::Dag, ResourceMethod::Get, Some("d1"));

    let batch = [
        DagRequest::new(ResourceMethod::Get).with_subject(alice()),
        DagRequest::new(ResourceMethod::Get)
            .with_details(DagDetails::for_dag("d1"))
            .with_subject(bob()),
    ];
    assert!(manager.batch_is_authorized_dag(&batch).await);

    let anonymous = [PoolRequest::new(ResourceMethod::Get)];
    assert!(!manager.batch_is_authorized_pool(&anonymous).await);
}

// ── single checks ────────────────────────────────────────────────────

#[tokio::test]
async fn unauthenticated_checks_deny_instead_of_failing() {
    let manager =
        GrantTable::default().grant("alice", ResourceKind::Connection, ResourceMethod::Get, None);

    assert!(
        !manager
            .is_authorized_connection(ResourceMethod::Get, None, None)
            .await
    );
    assert_eq!(
        manager.get_subject_id().await,
        Err(AuthManagerError::Unauthenticated)
    );
}

#[tokio::test]
async fn repeated_checks_are_idempotent() {
    let manager =
        GrantTable::default().grant("alice", ResourceKind::Dag, ResourceMethod::Get, Some("x"));
    let alice = alice();
    let details = DagDetails::for_dag("x");

    let first = manager
        .is_authorized_dag(ResourceMethod::Get, Some(&details), Some(&alice))
        .await;
    let second = manager
        .is_authorized_dag(ResourceMethod::Get, Some(&details), Some(&alice))
        .await;

    assert!(first);
    assert_eq!(first, second);
}

// ── filter_permitted_menu_items ──────────────────────────────────────

#[tokio::test]
async fn menu_items_and_children_are_filtered_in_order() {
    let manager = GrantTable::default()
        .grant("bob", ResourceKind::CustomView, ResourceMethod::Menu, Some("Browse"))
        .grant("bob", ResourceKind::CustomView, ResourceMethod::Menu, Some("DAG Runs"))
        .grant("bob", ResourceKind::CustomView, ResourceMethod::Menu, Some("Jobs"))
        .grant("bob", ResourceKind::CustomView, ResourceMethod::Menu, Some("Docs"))
        .grant("bob", ResourceKind::CustomView, ResourceMethod::Get, Some("Admin"));
    let bob = bob();

    let menu = vec![
        MenuItem::new("Browse", "Browse").with_children(vec![
            MenuItem::new("DAG Runs", "DAG Runs"),
            MenuItem::new("Audit Logs", "Audit Logs"),
            MenuItem::new("Jobs", "Jobs"),
        ]),
        MenuItem::new("Admin", "Admin").with_children(vec![MenuItem::new("Pools", "Pools")]),
        MenuItem::new("Docs", "Docs"),
    ];

    let visible = manager.filter_permitted_menu_items(menu, Some(&bob)).await;

    let names: Vec<_> = visible.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Browse", "Docs"]);
    let children: Vec<_> = visible[0].children.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(children, vec!["DAG Runs", "Jobs"]);
}

#[tokio::test]
async fn plugin_defined_methods_reach_custom_view_checks() {
    let manager = GrantTable::default().grant(
        "alice",
        ResourceKind::CustomView,
        "can_approve",
        Some("Approvals"),
    );
    let alice = alice();

    assert!(
        manager
            .is_authorized_custom_view(&"can_approve".into(), "Approvals", Some(&alice))
            .await
    );
    assert!(
        !manager
            .is_authorized_custom_view(&ResourceMethod::Get.into(), "Approvals", Some(&alice))
            .await
    );
    assert!(
        !manager
            .is_authorized_view(AccessView::Docs, Some(&alice))
            .await
    );
}
