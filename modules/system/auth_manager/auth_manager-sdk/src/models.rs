//! Domain models for the `auth_manager` module.
//!
//! A decision is always asked about one [`ResourceKind`]: a [`ResourceMethod`]
//! (or a [`CustomMethod`] for custom views), optional kind-specific details
//! narrowing the check to one instance, and the [`Subject`] acting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The identity on whose behalf an authorization decision is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// Stable identifier. Some identity providers sign subjects in without one.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    pub name: String,
}

impl Subject {
    /// Create a subject with both an id and a display name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
        }
    }

    /// Create a subject that has a display name but no stable id.
    #[must_use]
    pub fn without_id(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// Error returned when a string does not name a [`ResourceMethod`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource method `{0}`")]
pub struct UnknownMethodError(pub String);

/// The action attempted against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceMethod {
    Get,
    Post,
    Put,
    Delete,
    Menu,
}

impl ResourceMethod {
    pub const ALL: [Self; 5] = [Self::Get, Self::Post, Self::Put, Self::Delete, Self::Menu];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Menu => "MENU",
        }
    }

    /// The method spelled exactly as [`ResourceMethod::as_str`] renders it.
    #[must_use]
    pub fn from_exact(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for ResourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceMethod {
    type Err = UnknownMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethodError(s.to_owned()))
    }
}

/// Method of a custom view check.
///
/// Custom views may be contributed by plugins that define their own actions
/// (e.g. `can_do`), so anything that is not one of the standard methods is
/// kept verbatim as [`CustomMethod::Named`]. Standard names match only in
/// upper case; `menu` stays a plugin-defined name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CustomMethod {
    Standard(ResourceMethod),
    Named(String),
}

impl CustomMethod {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Standard(m) => m.as_str(),
            Self::Named(name) => name,
        }
    }

    #[must_use]
    pub const fn is_standard(&self) -> bool {
        matches!(self, Self::Standard(_))
    }
}

impl From<ResourceMethod> for CustomMethod {
    fn from(method: ResourceMethod) -> Self {
        Self::Standard(method)
    }
}

impl From<String> for CustomMethod {
    fn from(s: String) -> Self {
        match ResourceMethod::from_exact(&s) {
            Some(method) => Self::Standard(method),
            None => Self::Named(s),
        }
    }
}

impl From<&str> for CustomMethod {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<CustomMethod> for String {
    fn from(method: CustomMethod) -> Self {
        match method {
            CustomMethod::Standard(m) => m.as_str().to_owned(),
            CustomMethod::Named(name) => name,
        }
    }
}

impl fmt::Display for CustomMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed taxonomy of protectable resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Configuration,
    Connection,
    Dag,
    Dataset,
    Pool,
    Variable,
    CustomView,
    /// Read-only state of the installation.
    View,
}

impl ResourceKind {
    pub const ALL: [Self; 8] = [
        Self::Configuration,
        Self::Connection,
        Self::Dag,
        Self::Dataset,
        Self::Pool,
        Self::Variable,
        Self::CustomView,
        Self::View,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Connection => "connection",
            Self::Dag => "dag",
            Self::Dataset => "dataset",
            Self::Pool => "pool",
            Self::Variable => "variable",
            Self::CustomView => "custom_view",
            Self::View => "view",
        }
    }

    /// Whether the contract exposes a `batch_is_authorized_*` operation for this kind.
    #[must_use]
    pub const fn supports_batch(self) -> bool {
        matches!(
            self,
            Self::Connection | Self::Dag | Self::Pool | Self::Variable
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown resource kind `{s}`"))
    }
}

/// The kind of DAG information an authorization request is about.
///
/// Absent means the request is about the DAG itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DagAccessEntity {
    AuditLog,
    Code,
    Dependencies,
    Run,
    SlaMiss,
    Task,
    TaskInstance,
    TaskLogs,
    TaskReschedule,
    Warning,
    Xcom,
}

impl DagAccessEntity {
    pub const ALL: [Self; 11] = [
        Self::AuditLog,
        Self::Code,
        Self::Dependencies,
        Self::Run,
        Self::SlaMiss,
        Self::Task,
        Self::TaskInstance,
        Self::TaskLogs,
        Self::TaskReschedule,
        Self::Warning,
        Self::Xcom,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuditLog => "audit_log",
            Self::Code => "code",
            Self::Dependencies => "dependencies",
            Self::Run => "run",
            Self::SlaMiss => "sla_miss",
            Self::Task => "task",
            Self::TaskInstance => "task_instance",
            Self::TaskLogs => "task_logs",
            Self::TaskReschedule => "task_reschedule",
            Self::Warning => "warning",
            Self::Xcom => "xcom",
        }
    }
}

impl FromStr for DagAccessEntity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| format!("unknown dag access entity `{s}`"))
    }
}

/// Read-only views of the installation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessView {
    ClusterActivity,
    Docs,
    ImportErrors,
    Jobs,
    Plugins,
    Providers,
    Triggers,
    Website,
}

impl AccessView {
    pub const ALL: [Self; 8] = [
        Self::ClusterActivity,
        Self::Docs,
        Self::ImportErrors,
        Self::Jobs,
        Self::Plugins,
        Self::Providers,
        Self::Triggers,
        Self::Website,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClusterActivity => "cluster_activity",
            Self::Docs => "docs",
            Self::ImportErrors => "import_errors",
            Self::Jobs => "jobs",
            Self::Plugins => "plugins",
            Self::Providers => "providers",
            Self::Triggers => "triggers",
            Self::Website => "website",
        }
    }
}

impl FromStr for AccessView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown access view `{s}`"))
    }
}

/// Uniform view over the per-kind details records.
///
/// A set `scope_id` narrows the check to a single instance; it says nothing
/// about whether that instance exists.
pub trait ResourceDetails {
    const KIND: ResourceKind;

    /// Identifier of the instance the check is narrowed to, if any.
    fn scope_id(&self) -> Option<&str>;

    /// Sub-scope inside the instance. Only DAGs have one.
    fn access_entity(&self) -> Option<DagAccessEntity> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDetails {
    /// Configuration section name.
    #[serde(default)]
    pub section: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDetails {
    #[serde(default)]
    pub conn_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagDetails {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub access_entity: Option<DagAccessEntity>,
}

impl DagDetails {
    /// Details scoped to a single DAG.
    #[must_use]
    pub fn for_dag(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            access_entity: None,
        }
    }

    #[must_use]
    pub fn with_access_entity(mut self, entity: DagAccessEntity) -> Self {
        self.access_entity = Some(entity);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDetails {
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDetails {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDetails {
    #[serde(default)]
    pub key: Option<String>,
}

impl ResourceDetails for ConfigurationDetails {
    const KIND: ResourceKind = ResourceKind::Configuration;

    fn scope_id(&self) -> Option<&str> {
        self.section.as_deref()
    }
}

impl ResourceDetails for ConnectionDetails {
    const KIND: ResourceKind = ResourceKind::Connection;

    fn scope_id(&self) -> Option<&str> {
        self.conn_id.as_deref()
    }
}

impl ResourceDetails for DagDetails {
    const KIND: ResourceKind = ResourceKind::Dag;

    fn scope_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn access_entity(&self) -> Option<DagAccessEntity> {
        self.access_entity
    }
}

impl ResourceDetails for DatasetDetails {
    const KIND: ResourceKind = ResourceKind::Dataset;

    fn scope_id(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

impl ResourceDetails for PoolDetails {
    const KIND: ResourceKind = ResourceKind::Pool;

    fn scope_id(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl ResourceDetails for VariableDetails {
    const KIND: ResourceKind = ResourceKind::Variable;

    fn scope_id(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

/// A single authorization decision request, scoped to the kind of `D`.
///
/// Batches are slices of these and are evaluated conjunctively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest<D> {
    pub method: ResourceMethod,
    #[serde(default)]
    pub details: Option<D>,
    /// `None` means the request is made by nobody and must be denied.
    #[serde(default)]
    pub subject: Option<Subject>,
}

impl<D> AuthorizationRequest<D> {
    #[must_use]
    pub const fn new(method: ResourceMethod) -> Self {
        Self {
            method,
            details: None,
            subject: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: D) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }
}

pub type ConnectionRequest = AuthorizationRequest<ConnectionDetails>;
pub type DagRequest = AuthorizationRequest<DagDetails>;
pub type PoolRequest = AuthorizationRequest<PoolDetails>;
pub type VariableRequest = AuthorizationRequest<VariableDetails>;

/// A navigation entry subject to `MENU` access checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Name of the custom view guarding this entry.
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            href: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<MenuItem>) -> Self {
        self.children = children;
        self
    }
}
