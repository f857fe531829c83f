//! In-process registry of auth manager backends.
//!
//! Plugins register an instance under a vendor and a priority during startup;
//! the gateway picks one instance per vendor (lowest priority wins).

use std::sync::Arc;

use parking_lot::RwLock;

use crate::api::AuthManager;
use crate::error::AuthManagerError;

/// A registered backend instance.
#[derive(Clone)]
pub struct PluginInstance {
    pub instance_id: String,
    pub vendor: String,
    /// Lower = higher priority.
    pub priority: i16,
    pub client: Arc<dyn AuthManager>,
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInstance")
            .field("instance_id", &self.instance_id)
            .field("vendor", &self.vendor)
            .field("priority", &self.priority)
            .field("backend", &self.client.name())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct AuthManagerPluginRegistry {
    instances: RwLock<Vec<PluginInstance>>,
}

impl AuthManagerPluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend instance.
    ///
    /// # Errors
    ///
    /// Returns [`AuthManagerError::InvalidConfiguration`] if an instance with
    /// the same id is already registered.
    pub fn register(&self, instance: PluginInstance) -> Result<(), AuthManagerError> {
        let mut instances = self.instances.write();
        if instances
            .iter()
            .any(|i| i.instance_id == instance.instance_id)
        {
            return Err(AuthManagerError::InvalidConfiguration(format!(
                "plugin instance '{}' is already registered",
                instance.instance_id
            )));
        }
        tracing::debug!(
            instance_id = %instance.instance_id,
            vendor = %instance.vendor,
            priority = instance.priority,
            "Registered auth manager plugin instance"
        );
        instances.push(instance);
        Ok(())
    }

    /// Pick the instance for `vendor` with the lowest priority value.
    ///
    /// Ties go to the instance registered first.
    ///
    /// # Errors
    ///
    /// Returns [`AuthManagerError::NoPluginAvailable`] if no instance is
    /// registered for `vendor`.
    pub fn select(&self, vendor: &str) -> Result<PluginInstance, AuthManagerError> {
        self.instances
            .read()
            .iter()
            .filter(|i| i.vendor == vendor)
            .min_by_key(|i| i.priority)
            .cloned()
            .ok_or_else(|| AuthManagerError::NoPluginAvailable {
                vendor: vendor.to_owned(),
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }
}
