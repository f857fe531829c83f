//! Local (in-process) client for the auth manager gateway.
//!
//! Every call is routed to the selected backend. Decisions that cannot be
//! made (no backend, timeout) are denials; identity accessors and DAG
//! listing surface the error instead.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use auth_manager_sdk::{
    AccessView, AuthManager, AuthManagerError, ConfigurationDetails, ConnectionDetails,
    ConnectionRequest, CustomMethod, DagDetails, DagRegistry, DagRequest, DatasetDetails,
    MenuItem, PoolDetails, PoolRequest, ResourceMethod, Subject, VariableDetails,
    VariableRequest,
};

use super::{DomainError, Service};

/// Local client wrapping the gateway service.
///
/// Handed out by the gateway module during `init()`.
pub struct AuthManagerGwLocalClient {
    svc: Arc<Service>,
}

impl AuthManagerGwLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }

    async fn route<T, F, Fut>(&self, check: F) -> Result<T, DomainError>
    where
        F: FnOnce(Arc<dyn AuthManager>) -> Fut,
        Fut: Future<Output = T>,
    {
        let plugin = self.svc.get_plugin()?;
        self.svc.bounded(check(plugin)).await
    }
}

fn log_and_convert(op: &str, e: DomainError) -> AuthManagerError {
    tracing::error!(operation = op, error = ?e, "auth_manager gateway call failed");
    e.into()
}

fn deny_on_error<T: Default>(op: &str, result: Result<T, DomainError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(operation = op, error = %e, "auth_manager decision unavailable, denying");
        T::default()
    })
}

#[async_trait]
impl AuthManager for AuthManagerGwLocalClient {
    /// Name of the selected backend, or the vendor before selection.
    fn name(&self) -> &str {
        match self.svc.selected() {
            Some(plugin) => plugin.name(),
            None => self.svc.vendor(),
        }
    }

    async fn init(&self) -> Result<(), AuthManagerError> {
        let plugin = self
            .svc
            .get_plugin()
            .map_err(|e| log_and_convert("init", e))?;
        plugin.init().await
    }

    fn cli_commands(&self) -> Vec<clap::Command> {
        match self.svc.get_plugin() {
            Ok(plugin) => plugin.cli_commands(),
            Err(_) => Vec::new(),
        }
    }

    async fn run_cli_command(
        &self,
        name: &str,
        matches: &clap::ArgMatches,
    ) -> Result<String, AuthManagerError> {
        let plugin = self
            .svc
            .get_plugin()
            .map_err(|e| log_and_convert("run_cli_command", e))?;
        plugin.run_cli_command(name, matches).await
    }

    async fn get_subject(&self) -> Option<Subject> {
        match self.svc.get_plugin() {
            Ok(plugin) => plugin.get_subject().await,
            Err(e) => {
                log_and_convert("get_subject", e);
                None
            }
        }
    }

    async fn get_subject_name(&self) -> Result<String, AuthManagerError> {
        let plugin = self
            .svc
            .get_plugin()
            .map_err(|e| log_and_convert("get_subject_name", e))?;
        plugin.get_subject_name().await
    }

    async fn get_subject_display_name(&self) -> Result<String, AuthManagerError> {
        let plugin = self
            .svc
            .get_plugin()
            .map_err(|e| log_and_convert("get_subject_display_name", e))?;
        plugin.get_subject_display_name().await
    }

    async fn get_subject_id(&self) -> Result<Option<String>, AuthManagerError> {
        let plugin = self
            .svc
            .get_plugin()
            .map_err(|e| log_and_convert("get_subject_id", e))?;
        plugin.get_subject_id().await
    }

    async fn is_authorized_configuration(
        &self,
        method: ResourceMethod,
        details: Option<&ConfigurationDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        let result = self
            .route(|p| async move {
                p.is_authorized_configuration(method, details, subject)
                    .await
            })
            .await;
        deny_on_error("is_authorized_configuration", result)
    }

    async fn is_authorized_connection(
        &self,
        method: ResourceMethod,
        details: Option<&ConnectionDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        let result = self
            .route(|p| async move { p.is_authorized_connection(method, details, subject).await })
            .await;
        deny_on_error("is_authorized_connection", result)
    }

    async fn is_authorized_dag(
        &self,
        method: ResourceMethod,
        details: Option<&DagDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        let result = self
            .route(|p| async move { p.is_authorized_dag(method, details, subject).await })
            .await;
        deny_on_error("is_authorized_dag", result)
    }

    async fn is_authorized_dataset(
        &self,
        method: ResourceMethod,
        details: Option<&DatasetDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        let result = self
            .route(|p| async move { p.is_authorized_dataset(method, details, subject).await })
            .await;
        deny_on_error("is_authorized_dataset", result)
    }

    async fn is_authorized_pool(
        &self,
        method: ResourceMethod,
        details: Option<&PoolDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        let result = self
            .route(|p| async move { p.is_authorized_pool(method, details, subject).await })
            .await;
        deny_on_error("is_authorized_pool", result)
    }

    async fn is_authorized_variable(
        &self,
        method: ResourceMethod,
        details: Option<&VariableDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        let result = self
            .route(|p| async move { p.is_authorized_variable(method, details, subject).await })
            .await;
        deny_on_error("is_authorized_variable", result)
    }

    async fn is_authorized_view(&self, access_view: AccessView, subject: Option<&Subject>) -> bool {
        let result = self
            .route(|p| async move { p.is_authorized_view(access_view, subject).await })
            .await;
        deny_on_error("is_authorized_view", result)
    }

    async fn is_authorized_custom_view(
        &self,
        method: &CustomMethod,
        resource_name: &str,
        subject: Option<&Subject>,
    ) -> bool {
        let result = self
            .route(|p| async move {
                p.is_authorized_custom_view(method, resource_name, subject)
                    .await
            })
            .await;
        deny_on_error("is_authorized_custom_view", result)
    }

    async fn batch_is_authorized_connection(&self, requests: &[ConnectionRequest]) -> bool {
        let result = self
            .route(|p| async move { p.batch_is_authorized_connection(requests).await })
            .await;
        deny_on_error("batch_is_authorized_connection", result)
    }

    async fn batch_is_authorized_dag(&self, requests: &[DagRequest]) -> bool {
        let result = self
            .route(|p| async move { p.batch_is_authorized_dag(requests).await })
            .await;
        deny_on_error("batch_is_authorized_dag", result)
    }

    async fn batch_is_authorized_pool(&self, requests: &[PoolRequest]) -> bool {
        let result = self
            .route(|p| async move { p.batch_is_authorized_pool(requests).await })
            .await;
        deny_on_error("batch_is_authorized_pool", result)
    }

    async fn batch_is_authorized_variable(&self, requests: &[VariableRequest]) -> bool {
        let result = self
            .route(|p| async move { p.batch_is_authorized_variable(requests).await })
            .await;
        deny_on_error("batch_is_authorized_variable", result)
    }

    async fn filter_permitted_dag_ids(
        &self,
        dag_ids: BTreeSet<String>,
        methods: &[ResourceMethod],
        subject: Option<&Subject>,
    ) -> BTreeSet<String> {
        let result = self
            .route(|p| async move { p.filter_permitted_dag_ids(dag_ids, methods, subject).await })
            .await;
        deny_on_error("filter_permitted_dag_ids", result)
    }

    async fn get_permitted_dag_ids(
        &self,
        registry: &dyn DagRegistry,
        methods: &[ResourceMethod],
        subject: Option<&Subject>,
    ) -> Result<BTreeSet<String>, AuthManagerError> {
        let result = self
            .route(|p| async move { p.get_permitted_dag_ids(registry, methods, subject).await })
            .await;
        match result {
            Ok(listing) => listing,
            Err(e @ DomainError::Timeout { .. }) => Ok(deny_on_error(
                "get_permitted_dag_ids",
                Err::<BTreeSet<String>, _>(e),
            )),
            Err(e) => Err(log_and_convert("get_permitted_dag_ids", e)),
        }
    }

    async fn filter_permitted_menu_items(
        &self,
        menu_items: Vec<MenuItem>,
        subject: Option<&Subject>,
    ) -> Vec<MenuItem> {
        let result = self
            .route(|p| async move { p.filter_permitted_menu_items(menu_items, subject).await })
            .await;
        deny_on_error("filter_permitted_menu_items", result)
    }
}
