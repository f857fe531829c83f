//! Gateway service: plugin selection and decision bounding.

use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use auth_manager_sdk::{AuthManager, AuthManagerPluginRegistry};
use tracing::info;

use super::DomainError;

/// Auth manager gateway service.
///
/// Resolves the backend registered for the configured vendor once and keeps
/// it for the lifetime of the process.
pub struct Service {
    registry: Arc<AuthManagerPluginRegistry>,
    vendor: String,
    decision_timeout: Option<Duration>,
    selected: OnceLock<Arc<dyn AuthManager>>,
}

impl Service {
    #[must_use]
    pub fn new(
        registry: Arc<AuthManagerPluginRegistry>,
        vendor: String,
        decision_timeout: Option<Duration>,
    ) -> Self {
        Self {
            registry,
            vendor,
            decision_timeout,
            selected: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// The backend chosen by an earlier [`Service::get_plugin`], if any.
    #[must_use]
    pub fn selected(&self) -> Option<&Arc<dyn AuthManager>> {
        self.selected.get()
    }

    /// The backend selected for the configured vendor.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::PluginNotFound`] if no backend is registered
    /// for the vendor.
    pub fn get_plugin(&self) -> Result<Arc<dyn AuthManager>, DomainError> {
        if let Some(plugin) = self.selected.get() {
            return Ok(Arc::clone(plugin));
        }

        let instance =
            self.registry
                .select(&self.vendor)
                .map_err(|_| DomainError::PluginNotFound {
                    vendor: self.vendor.clone(),
                })?;
        info!(
            vendor = %self.vendor,
            instance_id = %instance.instance_id,
            priority = instance.priority,
            backend = instance.client.name(),
            "Selected auth manager plugin"
        );

        Ok(Arc::clone(self.selected.get_or_init(|| instance.client)))
    }

    /// Await `fut`, giving up once the configured decision timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Timeout`] if `fut` did not finish in time.
    pub async fn bounded<F, T>(&self, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = T>,
    {
        match self.decision_timeout {
            None => Ok(fut.await),
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| DomainError::Timeout {
                    timeout_ms: limit.as_millis(),
                }),
        }
    }
}
