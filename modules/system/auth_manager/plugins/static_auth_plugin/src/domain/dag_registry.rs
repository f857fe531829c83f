//! DAG registry backed by a fixed set of ids.

use std::collections::BTreeSet;

use async_trait::async_trait;
use auth_manager_sdk::{AuthManagerError, DagRegistry};

/// In-memory DAG registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDagRegistry {
    dag_ids: BTreeSet<String>,
}

impl InMemoryDagRegistry {
    #[must_use]
    pub fn new<I, S>(dag_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dag_ids: dag_ids.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dag_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dag_ids.is_empty()
    }
}

#[async_trait]
impl DagRegistry for InMemoryDagRegistry {
    async fn list_all_dag_ids(&self) -> Result<BTreeSet<String>, AuthManagerError> {
        Ok(self.dag_ids.clone())
    }
}
