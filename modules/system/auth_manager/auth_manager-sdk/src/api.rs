//! The authorization contract and the collaborators it consumes.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::AuthManagerError;
use crate::models::{
    AccessView, ConfigurationDetails, ConnectionDetails, ConnectionRequest, CustomMethod,
    DagDetails, DagRequest, DatasetDetails, MenuItem, PoolDetails, PoolRequest, ResourceMethod,
    Subject, VariableDetails, VariableRequest,
};

/// Methods checked by [`AuthManager::filter_permitted_dag_ids`] when the
/// caller passes none.
pub const DEFAULT_DAG_FILTER_METHODS: [ResourceMethod; 2] =
    [ResourceMethod::Put, ResourceMethod::Get];

/// Resolves the identity bound to the request being served.
#[async_trait]
pub trait SubjectResolver: Send + Sync {
    /// Returns `None` when nobody is signed in.
    async fn resolve_current_subject(&self) -> Option<Subject>;
}

/// Source of every DAG id known to the installation.
#[async_trait]
pub trait DagRegistry: Send + Sync {
    /// List all known DAG ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    async fn list_all_dag_ids(&self) -> Result<BTreeSet<String>, AuthManagerError>;
}

/// Authorization contract implemented once per deployment backend.
///
/// Backends must implement the identity lookup and one `is_authorized_*`
/// check per resource kind. Batch, filter and menu operations have default
/// implementations composed from those checks; a backend may override them
/// for efficiency as long as the result is identical for every input.
///
/// Every check takes the subject explicitly. `None` means nobody is signed
/// in and the check must return `false`. Denial is always a value, never an
/// error.
///
/// ```ignore
/// let subject = manager.get_subject().await;
/// let can_edit = manager
///     .is_authorized_dag(ResourceMethod::Put, Some(&DagDetails::for_dag("etl")), subject.as_ref())
///     .await;
/// ```
#[async_trait]
pub trait AuthManager: Send + Sync {
    /// Backend name, used in logs.
    fn name(&self) -> &str;

    /// Run once while the host is starting. Does nothing by default.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot start.
    async fn init(&self) -> Result<(), AuthManagerError> {
        Ok(())
    }

    /// Extra CLI subcommands contributed by this backend.
    fn cli_commands(&self) -> Vec<clap::Command> {
        Vec::new()
    }

    /// Run a subcommand previously returned by [`AuthManager::cli_commands`].
    ///
    /// Returns the text to show to the operator.
    ///
    /// # Errors
    ///
    /// Returns [`AuthManagerError::UnknownCommand`] unless the backend provides `name`.
    async fn run_cli_command(
        &self,
        name: &str,
        matches: &clap::ArgMatches,
    ) -> Result<String, AuthManagerError> {
        let _ = matches;
        Err(AuthManagerError::UnknownCommand(name.to_owned()))
    }

    /// The subject bound to the current request, if anyone is signed in.
    async fn get_subject(&self) -> Option<Subject>;

    async fn is_logged_in(&self) -> bool {
        self.get_subject().await.is_some()
    }

    /// Display name of the signed-in subject.
    ///
    /// # Errors
    ///
    /// Returns [`AuthManagerError::Unauthenticated`] if nobody is signed in.
    async fn get_subject_name(&self) -> Result<String, AuthManagerError> {
        let Some(subject) = self.get_subject().await else {
            tracing::error!("get_subject_name called but the subject is not signed in");
            return Err(AuthManagerError::Unauthenticated);
        };
        Ok(subject.name)
    }

    /// Name shown to the subject in a UI; the subject name unless a backend
    /// knows better.
    ///
    /// # Errors
    ///
    /// Returns [`AuthManagerError::Unauthenticated`] if nobody is signed in.
    async fn get_subject_display_name(&self) -> Result<String, AuthManagerError> {
        self.get_subject_name().await
    }

    /// Id of the signed-in subject; `Ok(None)` when the subject has no id or
    /// an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthManagerError::Unauthenticated`] if nobody is signed in.
    async fn get_subject_id(&self) -> Result<Option<String>, AuthManagerError> {
        let Some(subject) = self.get_subject().await else {
            tracing::error!("get_subject_id called but the subject is not signed in");
            return Err(AuthManagerError::Unauthenticated);
        };
        Ok(subject.id.filter(|id| !id.is_empty()))
    }

    async fn is_authorized_configuration(
        &self,
        method: ResourceMethod,
        details: Option<&ConfigurationDetails>,
        subject: Option<&Subject>,
    ) -> bool;

    async fn is_authorized_connection(
        &self,
        method: ResourceMethod,
        details: Option<&ConnectionDetails>,
        subject: Option<&Subject>,
    ) -> bool;

    /// `details.access_entity` selects the kind of DAG information the check
    /// is about; absent means the DAG itself.
    async fn is_authorized_dag(
        &self,
        method: ResourceMethod,
        details: Option<&DagDetails>,
        subject: Option<&Subject>,
    ) -> bool;

    async fn is_authorized_dataset(
        &self,
        method: ResourceMethod,
        details: Option<&DatasetDetails>,
        subject: Option<&Subject>,
    ) -> bool;

    async fn is_authorized_pool(
        &self,
        method: ResourceMethod,
        details: Option<&PoolDetails>,
        subject: Option<&Subject>,
    ) -> bool;

    async fn is_authorized_variable(
        &self,
        method: ResourceMethod,
        details: Option<&VariableDetails>,
        subject: Option<&Subject>,
    ) -> bool;

    /// Access to a read-only state of the installation.
    async fn is_authorized_view(&self, access_view: AccessView, subject: Option<&Subject>)
    -> bool;

    /// Access to a view defined by the backend itself or by a plugin.
    ///
    /// Plugin-defined actions arrive as [`CustomMethod::Named`].
    async fn is_authorized_custom_view(
        &self,
        method: &CustomMethod,
        resource_name: &str,
        subject: Option<&Subject>,
    ) -> bool;

    /// `true` iff every request is authorized. Empty batches are authorized.
    async fn batch_is_authorized_connection(&self, requests: &[ConnectionRequest]) -> bool {
        for request in requests {
            if !self
                .is_authorized_connection(
                    request.method,
                    request.details.as_ref(),
                    request.subject.as_ref(),
                )
                .await
            {
                return false;
            }
        }
        true
    }

    /// `true` iff every request is authorized. Empty batches are authorized.
    async fn batch_is_authorized_dag(&self, requests: &[DagRequest]) -> bool {
        for request in requests {
            if !self
                .is_authorized_dag(
                    request.method,
                    request.details.as_ref(),
                    request.subject.as_ref(),
                )
                .await
            {
                return false;
            }
        }
        true
    }

    /// `true` iff every request is authorized. Empty batches are authorized.
    async fn batch_is_authorized_pool(&self, requests: &[PoolRequest]) -> bool {
        for request in requests {
            if !self
                .is_authorized_pool(
                    request.method,
                    request.details.as_ref(),
                    request.subject.as_ref(),
                )
                .await
            {
                return false;
            }
        }
        true
    }

    /// `true` iff every request is authorized. Empty batches are authorized.
    async fn batch_is_authorized_variable(&self, requests: &[VariableRequest]) -> bool {
        for request in requests {
            if !self
                .is_authorized_variable(
                    request.method,
                    request.details.as_ref(),
                    request.subject.as_ref(),
                )
                .await
            {
                return false;
            }
        }
        true
    }

    /// Keep the DAG ids the subject may act on with any of `methods`.
    ///
    /// Only `GET` and `PUT` are considered; an empty `methods` means both.
    /// A blanket grant for a requested method returns `dag_ids` untouched
    /// without per-id checks. The result is always a subset of `dag_ids`.
    async fn filter_permitted_dag_ids(
        &self,
        dag_ids: BTreeSet<String>,
        methods: &[ResourceMethod],
        subject: Option<&Subject>,
    ) -> BTreeSet<String> {
        let methods: &[ResourceMethod] = if methods.is_empty() {
            &DEFAULT_DAG_FILTER_METHODS
        } else {
            methods
        };
        let wants_get = methods.contains(&ResourceMethod::Get);
        let wants_put = methods.contains(&ResourceMethod::Put);

        if (wants_get && self.is_authorized_dag(ResourceMethod::Get, None, subject).await)
            || (wants_put && self.is_authorized_dag(ResourceMethod::Put, None, subject).await)
        {
            return dag_ids;
        }

        let mut permitted = BTreeSet::new();
        for dag_id in dag_ids {
            let details = DagDetails::for_dag(dag_id);
            let allowed = (wants_get
                && self
                    .is_authorized_dag(ResourceMethod::Get, Some(&details), subject)
                    .await)
                || (wants_put
                    && self
                        .is_authorized_dag(ResourceMethod::Put, Some(&details), subject)
                        .await);
            if allowed && let Some(id) = details.id {
                permitted.insert(id);
            }
        }
        permitted
    }

    /// Load every known DAG id from `registry` and filter it with
    /// [`AuthManager::filter_permitted_dag_ids`].
    ///
    /// # Errors
    ///
    /// Returns the registry error if the DAG ids cannot be listed.
    async fn get_permitted_dag_ids(
        &self,
        registry: &dyn DagRegistry,
        methods: &[ResourceMethod],
        subject: Option<&Subject>,
    ) -> Result<BTreeSet<String>, AuthManagerError> {
        let dag_ids = registry.list_all_dag_ids().await?;
        Ok(self.filter_permitted_dag_ids(dag_ids, methods, subject).await)
    }

    /// Keep the menu entries the subject may open.
    ///
    /// An entry is kept iff `MENU` is authorized on the custom view named
    /// after it; children of kept entries are filtered the same way.
    async fn filter_permitted_menu_items(
        &self,
        menu_items: Vec<MenuItem>,
        subject: Option<&Subject>,
    ) -> Vec<MenuItem> {
        let menu = CustomMethod::Standard(ResourceMethod::Menu);
        let mut accessible = Vec::with_capacity(menu_items.len());
        for mut item in menu_items {
            if !self
                .is_authorized_custom_view(&menu, &item.name, subject)
                .await
            {
                continue;
            }
            let children = std::mem::take(&mut item.children);
            for child in children {
                if self
                    .is_authorized_custom_view(&menu, &child.name, subject)
                    .await
                {
                    item.children.push(child);
                }
            }
            accessible.push(item);
        }
        accessible
    }
}

impl std::fmt::Debug for dyn AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager").finish_non_exhaustive()
    }
}
