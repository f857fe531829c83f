//! Static auth manager plugin module.

use std::sync::{Arc, OnceLock};

use auth_manager_sdk::{AuthManager, AuthManagerPluginRegistry, PluginInstance};
use tracing::info;

use crate::config::StaticAuthPluginConfig;
use crate::domain::{InMemoryDagRegistry, Service};

/// Static auth manager plugin module.
///
/// Builds the service from configuration and registers it in the plugin
/// registry under the configured vendor and priority.
pub struct StaticAuthPlugin {
    service: OnceLock<Arc<Service>>,
}

impl Default for StaticAuthPlugin {
    fn default() -> Self {
        Self {
            service: OnceLock::new(),
        }
    }
}

impl StaticAuthPlugin {
    /// Registry instance id for `vendor`.
    #[must_use]
    pub fn instance_id(vendor: &str) -> String {
        format!("static_auth_plugin.{vendor}")
    }

    /// # Errors
    ///
    /// Fails if the configuration is invalid, the plugin was already
    /// initialized, or an instance with the same id is already registered.
    #[tracing::instrument(skip_all, fields(vendor = %cfg.vendor, priority = cfg.priority))]
    pub fn init(
        &self,
        cfg: &StaticAuthPluginConfig,
        registry: &AuthManagerPluginRegistry,
    ) -> anyhow::Result<Arc<Service>> {
        info!(
            mode = cfg.mode.as_str(),
            subjects = cfg.subjects.len(),
            "Loaded plugin configuration"
        );

        let service = Arc::new(Service::from_config(cfg)?);
        self.service
            .set(Arc::clone(&service))
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;

        let instance_id = Self::instance_id(&cfg.vendor);
        let client: Arc<dyn AuthManager> = service.clone();
        registry.register(PluginInstance {
            instance_id: instance_id.clone(),
            vendor: cfg.vendor.clone(),
            priority: cfg.priority,
            client,
        })?;
        info!(instance_id = %instance_id, "Registered static auth plugin instance");

        Ok(service)
    }

    /// DAG registry serving the configured `dag_ids`.
    #[must_use]
    pub fn dag_registry(cfg: &StaticAuthPluginConfig) -> InMemoryDagRegistry {
        InMemoryDagRegistry::new(cfg.dag_ids.iter().cloned())
    }
}
