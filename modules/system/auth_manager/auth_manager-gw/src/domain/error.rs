//! Domain errors for the auth manager gateway.

use auth_manager_sdk::AuthManagerError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("no plugin instances found for vendor '{vendor}'")]
    PluginNotFound { vendor: String },

    #[error("auth manager plugin error: {0}")]
    Plugin(#[from] AuthManagerError),

    #[error("decision timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u128 },
}

impl From<DomainError> for AuthManagerError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::PluginNotFound { vendor } => Self::NoPluginAvailable { vendor },
            DomainError::Plugin(inner) => inner,
            DomainError::Timeout { timeout_ms } => {
                Self::Internal(format!("decision timed out after {timeout_ms} ms"))
            }
        }
    }
}
