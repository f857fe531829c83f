#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use auth_manager_sdk::{
    AccessView, AuthManager, AuthManagerError, AuthManagerPluginRegistry, ConfigurationDetails,
    ConnectionDetails, CustomMethod, DagDetails, DagRegistry, DatasetDetails, PluginInstance,
    PoolDetails, ResourceMethod, Subject, VariableDetails,
};

/// Backend that answers every check the same way, optionally after a delay.
pub struct Scripted {
    pub name: &'static str,
    pub subject: Option<Subject>,
    pub allow: bool,
    pub delay: Option<Duration>,
    pub init_delay: Option<Duration>,
    pub fail_init: bool,
    pub init_calls: AtomicUsize,
}

impl Scripted {
    #[must_use]
    pub fn allowing(name: &'static str) -> Self {
        Self {
            name,
            subject: Some(Subject::new("1", "alice")),
            allow: true,
            delay: None,
            init_delay: None,
            fail_init: false,
            init_calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn denying(name: &'static str) -> Self {
        Self {
            allow: false,
            ..Self::allowing(name)
        }
    }

    #[must_use]
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    #[must_use]
    pub fn slow_init(mut self, delay: Duration) -> Self {
        self.init_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.subject = None;
        self
    }

    #[must_use]
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    async fn decide(&self, subject: Option<&Subject>) -> bool {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.allow && subject.is_some()
    }
}

#[async_trait]
impl AuthManager for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    async fn init(&self) -> Result<(), AuthManagerError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.init_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_init {
            return Err(AuthManagerError::Internal("backend offline".to_owned()));
        }
        Ok(())
    }

    async fn get_subject(&self) -> Option<Subject> {
        self.subject.clone()
    }

    async fn is_authorized_configuration(
        &self,
        _method: ResourceMethod,
        _details: Option<&ConfigurationDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.decide(subject).await
    }

    async fn is_authorized_connection(
        &self,
        _method: ResourceMethod,
        _details: Option<&ConnectionDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.decide(subject).await
    }

    async fn is_authorized_dag(
        &self,
        _method: ResourceMethod,
        _details: Option<&DagDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.decide(subject).await
    }

    async fn is_authorized_dataset(
        &self,
        _method: ResourceMethod,
        _details: Option<&DatasetDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.decide(subject).await
    }

    async fn is_authorized_pool(
        &self,
        _method: ResourceMethod,
        _details: Option<&PoolDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.decide(subject).await
    }

    async fn is_authorized_variable(
        &self,
        _method: ResourceMethod,
        _details: Option<&VariableDetails>,
        subject: Option<&Subject>,
    ) -> bool {
        self.decide(subject).await
    }

    async fn is_authorized_view(&self, _access_view: AccessView, subject: Option<&Subject>) -> bool {
        self.decide(subject).await
    }

    async fn is_authorized_custom_view(
        &self,
        _method: &CustomMethod,
        _resource_name: &str,
        subject: Option<&Subject>,
    ) -> bool {
        self.decide(subject).await
    }
}

pub struct FixedDags(pub &'static [&'static str]);

#[async_trait]
impl DagRegistry for FixedDags {
    async fn list_all_dag_ids(&self) -> Result<BTreeSet<String>, AuthManagerError> {
        Ok(self.0.iter().map(|id| (*id).to_owned()).collect())
    }
}

pub fn registry_with(
    entries: Vec<(&'static str, &'static str, i16, Arc<Scripted>)>,
) -> Arc<AuthManagerPluginRegistry> {
    let registry = AuthManagerPluginRegistry::new();
    for (instance_id, vendor, priority, client) in entries {
        registry
            .register(PluginInstance {
                instance_id: instance_id.to_owned(),
                vendor: vendor.to_owned(),
                priority,
                client,
            })
            .unwrap();
    }
    Arc::new(registry)
}
