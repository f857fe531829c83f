//! Configuration for the auth manager gateway.

use std::time::Duration;

use serde::Deserialize;

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthManagerGwConfig {
    /// Vendor selector used to pick a plugin implementation.
    pub vendor: String,

    /// Upper bound for a single authorization decision, in milliseconds.
    ///
    /// A decision that takes longer is denied. Unset means no bound.
    pub decision_timeout_ms: Option<u64>,
}

impl Default for AuthManagerGwConfig {
    fn default() -> Self {
        Self {
            vendor: "hyperspot".to_owned(),
            decision_timeout_ms: None,
        }
    }
}

impl AuthManagerGwConfig {
    #[must_use]
    pub fn decision_timeout(&self) -> Option<Duration> {
        self.decision_timeout_ms.map(Duration::from_millis)
    }
}
