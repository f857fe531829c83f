//! Error types for the `auth_manager` module.

/// Errors produced by the auth manager contract.
///
/// Authorization denial is never an error: `is_authorized_*` operations
/// return `false`. Only identity accessors, startup wiring and collaborator
/// failures use this channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthManagerError {
    /// No subject could be resolved for an identity-dependent operation.
    #[error("the subject must be signed in")]
    Unauthenticated,

    /// A backend was given structurally invalid setup.
    #[error("invalid auth manager configuration: {0}")]
    InvalidConfiguration(String),

    /// No backend is registered for the configured vendor.
    #[error("no auth manager plugin available for vendor '{vendor}'")]
    NoPluginAvailable { vendor: String },

    /// The process-wide auth manager has not been initialized yet.
    #[error("auth manager is not initialized")]
    NotInitialized,

    /// A CLI command was dispatched to a backend that does not provide it.
    #[error("unknown auth manager command '{0}'")]
    UnknownCommand(String),

    #[error("internal error: {0}")]
    Internal(String),
}
