//! Grant table entries and the coverage rule.

use auth_manager_sdk::{
    AuthManagerError, CustomMethod, DagAccessEntity, ResourceDetails, ResourceKind,
};

use crate::config::GrantConfig;

/// One authorization question asked of the grant table.
#[derive(Debug, Clone, Copy)]
pub struct Check<'a> {
    pub kind: ResourceKind,
    pub method: &'a CustomMethod,
    pub scope_id: Option<&'a str>,
    pub access_entity: Option<DagAccessEntity>,
}

impl<'a> Check<'a> {
    #[must_use]
    pub fn for_details<D: ResourceDetails>(method: &'a CustomMethod, details: Option<&'a D>) -> Self {
        Self {
            kind: D::KIND,
            method,
            scope_id: details.and_then(D::scope_id),
            access_entity: details.and_then(D::access_entity),
        }
    }

    #[must_use]
    pub const fn scoped(kind: ResourceKind, method: &'a CustomMethod, scope_id: &'a str) -> Self {
        Self {
            kind,
            method,
            scope_id: Some(scope_id),
            access_entity: None,
        }
    }
}

/// A validated allow rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    kind: ResourceKind,
    methods: Vec<CustomMethod>,
    id: Option<String>,
    access_entity: Option<DagAccessEntity>,
}

impl Grant {
    /// Validate a configured grant of `subject`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthManagerError::InvalidConfiguration`] if the grant lists
    /// no methods, sets an access entity on a non-DAG resource, or uses a
    /// non-standard method outside custom views.
    pub fn from_config(subject: &str, cfg: &GrantConfig) -> Result<Self, AuthManagerError> {
        if cfg.methods.is_empty() {
            return Err(AuthManagerError::InvalidConfiguration(format!(
                "grant on '{}' for subject '{subject}' lists no methods",
                cfg.resource
            )));
        }
        if cfg.access_entity.is_some() && cfg.resource != ResourceKind::Dag {
            return Err(AuthManagerError::InvalidConfiguration(format!(
                "grant on '{}' for subject '{subject}' sets access_entity, which only applies to dags",
                cfg.resource
            )));
        }
        if cfg.resource != ResourceKind::CustomView
            && let Some(method) = cfg.methods.iter().find(|m| !m.is_standard())
        {
            return Err(AuthManagerError::InvalidConfiguration(format!(
                "grant on '{}' for subject '{subject}' uses custom method '{method}'",
                cfg.resource
            )));
        }

        Ok(Self {
            kind: cfg.resource,
            methods: cfg.methods.clone(),
            id: cfg.id.clone(),
            access_entity: cfg.access_entity,
        })
    }

    /// Whether this grant allows `check`.
    #[must_use]
    pub fn covers(&self, check: &Check<'_>) -> bool {
        self.kind == check.kind
            && self.methods.contains(check.method)
            && self
                .id
                .as_deref()
                .is_none_or(|id| check.scope_id == Some(id))
            && self
                .access_entity
                .is_none_or(|entity| check.access_entity == Some(entity))
    }

    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// One-line rendering used by the `list-grants` command.
    #[must_use]
    pub fn describe(&self) -> String {
        let methods = self
            .methods
            .iter()
            .map(CustomMethod::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let mut line = format!(
            "{} {} {methods}",
            self.kind,
            self.id.as_deref().unwrap_or("*")
        );
        if let Some(entity) = self.access_entity {
            line.push_str(" (");
            line.push_str(entity.as_str());
            line.push(')');
        }
        line
    }
}
