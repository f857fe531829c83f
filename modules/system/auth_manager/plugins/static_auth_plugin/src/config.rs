//! Configuration for the static auth manager plugin.

use auth_manager_sdk::{CustomMethod, DagAccessEntity, ResourceKind};
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthPluginConfig {
    /// Vendor name the instance is registered under.
    pub vendor: String,

    /// Plugin priority (lower = higher priority).
    pub priority: i16,

    /// Authorization mode.
    pub mode: AuthMode,

    /// Name of the subject treated as signed in.
    ///
    /// In `allow_all` mode an unset value signs in the built-in `admin`
    /// subject; in `static_grants` mode it means nobody is signed in.
    pub signed_in: Option<String>,

    /// Known subjects and their grants.
    pub subjects: Vec<SubjectConfig>,

    /// DAG ids served by the in-memory DAG registry.
    pub dag_ids: Vec<String>,
}

impl Default for StaticAuthPluginConfig {
    fn default() -> Self {
        Self {
            vendor: "hyperspot".to_owned(),
            priority: 100,
            mode: AuthMode::AllowAll,
            signed_in: None,
            subjects: Vec::new(),
            dag_ids: Vec::new(),
        }
    }
}

/// Authorization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Allow every check for any signed-in subject.
    #[default]
    AllowAll,
    /// Allow only what the subject's grants cover.
    StaticGrants,
}

impl AuthMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllowAll => "allow_all",
            Self::StaticGrants => "static_grants",
        }
    }
}

/// A subject known to the plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectConfig {
    /// Display name; also the lookup key for grants.
    pub name: String,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub grants: Vec<GrantConfig>,
}

/// One allow rule.
///
/// An unset `id` covers every instance of the resource kind, including
/// checks that name no instance at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantConfig {
    pub resource: ResourceKind,

    pub methods: Vec<CustomMethod>,

    #[serde(default)]
    pub id: Option<String>,

    /// DAG grants only: restricts the grant to one kind of DAG information.
    #[serde(default)]
    pub access_entity: Option<DagAccessEntity>,
}
