//! Service implementation for the static auth manager plugin.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth_manager_sdk::{AuthManagerError, Subject, SubjectResolver};
use tracing::debug;

use super::grants::{Check, Grant};
use crate::config::{AuthMode, StaticAuthPluginConfig};

/// Subject signed in by default in `allow_all` mode.
pub const DEFAULT_SUBJECT_NAME: &str = "admin";

/// Resolver that always reports the same subject.
#[derive(Debug, Clone, Default)]
pub struct StaticSubjectResolver {
    subject: Option<Subject>,
}

impl StaticSubjectResolver {
    #[must_use]
    pub fn new(subject: Option<Subject>) -> Self {
        Self { subject }
    }
}

#[async_trait]
impl SubjectResolver for StaticSubjectResolver {
    async fn resolve_current_subject(&self) -> Option<Subject> {
        self.subject.clone()
    }
}

#[derive(Debug)]
struct SubjectEntry {
    subject: Subject,
    grants: Vec<Grant>,
}

/// Static auth manager service.
///
/// Decides from configuration based on mode:
/// - `allow_all`: any signed-in subject is allowed
/// - `static_grants`: a subject is allowed what one of its grants covers
pub struct Service {
    mode: AuthMode,
    subjects: BTreeMap<String, SubjectEntry>,
    resolver: Arc<dyn SubjectResolver>,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("mode", &self.mode)
            .field("subjects", &self.subjects)
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Create a service from plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthManagerError::InvalidConfiguration`] for duplicate
    /// subject names, a `signed_in` subject that is not configured, or an
    /// invalid grant.
    pub fn from_config(cfg: &StaticAuthPluginConfig) -> Result<Self, AuthManagerError> {
        let mut subjects = BTreeMap::new();
        for subject_cfg in &cfg.subjects {
            let grants = subject_cfg
                .grants
                .iter()
                .map(|g| Grant::from_config(&subject_cfg.name, g))
                .collect::<Result<Vec<_>, _>>()?;
            let entry = SubjectEntry {
                subject: Subject {
                    id: subject_cfg.id.clone().filter(|id| !id.is_empty()),
                    name: subject_cfg.name.clone(),
                },
                grants,
            };
            if subjects.insert(subject_cfg.name.clone(), entry).is_some() {
                return Err(AuthManagerError::InvalidConfiguration(format!(
                    "subject '{}' is configured more than once",
                    subject_cfg.name
                )));
            }
        }

        let signed_in = match (&cfg.signed_in, cfg.mode) {
            (Some(name), _) => {
                let entry = subjects.get(name).ok_or_else(|| {
                    AuthManagerError::InvalidConfiguration(format!(
                        "signed_in subject '{name}' is not configured"
                    ))
                })?;
                Some(entry.subject.clone())
            }
            (None, AuthMode::AllowAll) => Some(
                subjects
                    .get(DEFAULT_SUBJECT_NAME)
                    .map_or_else(|| Subject::without_id(DEFAULT_SUBJECT_NAME), |e| e.subject.clone()),
            ),
            (None, AuthMode::StaticGrants) => None,
        };

        Ok(Self {
            mode: cfg.mode,
            subjects,
            resolver: Arc::new(StaticSubjectResolver::new(signed_in)),
        })
    }

    /// Replace the resolver that reports the current subject.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn SubjectResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    pub(crate) async fn current_subject(&self) -> Option<Subject> {
        self.resolver.resolve_current_subject().await
    }

    /// A configured subject by name.
    #[must_use]
    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.get(name).map(|e| &e.subject)
    }

    /// Grants of a configured subject by name.
    #[must_use]
    pub fn grants_of(&self, name: &str) -> Option<&[Grant]> {
        self.subjects.get(name).map(|e| e.grants.as_slice())
    }

    /// Grants held by `subject`. A configured id must match the caller's.
    fn grants_for(&self, subject: &Subject) -> Option<&[Grant]> {
        let entry = self.subjects.get(&subject.name)?;
        if entry.subject.id.is_some() && entry.subject.id != subject.id {
            debug!(
                subject = %subject.name,
                id = subject.id.as_deref(),
                "Denied: subject id does not match the configured one"
            );
            return None;
        }
        Some(&entry.grants)
    }

    /// Decide `check` for `subject`. A missing subject is always denied.
    #[must_use]
    pub fn is_authorized(&self, check: &Check<'_>, subject: Option<&Subject>) -> bool {
        let Some(subject) = subject else {
            debug!(kind = %check.kind, method = %check.method, "Denied: no subject");
            return false;
        };

        let allowed = match self.mode {
            AuthMode::AllowAll => true,
            AuthMode::StaticGrants => self
                .grants_for(subject)
                .is_some_and(|grants| grants.iter().any(|g| g.covers(check))),
        };
        if !allowed {
            debug!(
                subject = %subject.name,
                kind = %check.kind,
                method = %check.method,
                scope_id = check.scope_id,
                "Denied: no grant covers the check"
            );
        }
        allowed
    }
}
