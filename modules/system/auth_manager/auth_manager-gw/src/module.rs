//! Auth manager gateway module.

use std::sync::{Arc, OnceLock};

use auth_manager_sdk::{AuthManager, AuthManagerError, AuthManagerPluginRegistry};
use tokio::sync::Mutex;
use tracing::info;

use crate::config::AuthManagerGwConfig;
use crate::domain::{AuthManagerGwLocalClient, Service};

static AUTH_MANAGER: OnceLock<Arc<dyn AuthManager>> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::const_new(());

/// Auth Manager Gateway module.
///
/// This module:
/// 1. Selects the backend registered for the configured vendor
/// 2. Runs the backend's one-time `init` hook
/// 3. Hands out a client that routes every call to the selected backend
///
/// Selection is eager so that a misconfigured vendor fails startup instead
/// of the first authorization check.
pub struct AuthManagerGateway {
    service: OnceLock<Arc<Service>>,
}

impl Default for AuthManagerGateway {
    fn default() -> Self {
        Self {
            service: OnceLock::new(),
        }
    }
}

impl AuthManagerGateway {
    /// # Errors
    ///
    /// Fails if the gateway was already initialized, no backend is
    /// registered for `cfg.vendor`, or the backend's `init` hook fails.
    #[tracing::instrument(skip_all, fields(vendor))]
    pub async fn init(
        &self,
        cfg: &AuthManagerGwConfig,
        registry: Arc<AuthManagerPluginRegistry>,
    ) -> anyhow::Result<Arc<dyn AuthManager>> {
        tracing::Span::current().record("vendor", cfg.vendor.as_str());
        info!(vendor = %cfg.vendor, "Initializing auth_manager gateway");

        if self.service.get().is_some() {
            anyhow::bail!("Service already initialized");
        }

        let svc = Arc::new(Service::new(
            registry,
            cfg.vendor.clone(),
            cfg.decision_timeout(),
        ));
        let plugin = svc.get_plugin().map_err(AuthManagerError::from)?;
        plugin.init().await?;

        self.service
            .set(Arc::clone(&svc))
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;

        info!(backend = plugin.name(), "auth_manager gateway initialized");
        Ok(Arc::new(AuthManagerGwLocalClient::new(svc)))
    }

    /// Client for the initialized gateway, if `init` has completed.
    #[must_use]
    pub fn client(&self) -> Option<Arc<dyn AuthManager>> {
        self.service.get().map(|svc| {
            Arc::new(AuthManagerGwLocalClient::new(Arc::clone(svc))) as Arc<dyn AuthManager>
        })
    }
}

/// Initialize the process-wide auth manager.
///
/// Concurrent callers are serialized, so the backend's `init` hook runs at
/// most once per process.
///
/// # Errors
///
/// Fails if the auth manager was already initialized, or if the gateway
/// cannot select and initialize a backend.
pub async fn init_auth_manager(
    cfg: &AuthManagerGwConfig,
    registry: Arc<AuthManagerPluginRegistry>,
) -> anyhow::Result<Arc<dyn AuthManager>> {
    let _guard = INIT_LOCK.lock().await;
    if AUTH_MANAGER.get().is_some() {
        anyhow::bail!("auth manager already initialized");
    }

    let api = AuthManagerGateway::default().init(cfg, registry).await?;
    AUTH_MANAGER
        .set(Arc::clone(&api))
        .map_err(|_| anyhow::anyhow!("auth manager already initialized"))?;
    Ok(api)
}

/// The process-wide auth manager.
///
/// # Errors
///
/// Returns [`AuthManagerError::NotInitialized`] before [`init_auth_manager`]
/// has succeeded.
pub fn auth_manager() -> Result<Arc<dyn AuthManager>, AuthManagerError> {
    AUTH_MANAGER
        .get()
        .cloned()
        .ok_or(AuthManagerError::NotInitialized)
}
