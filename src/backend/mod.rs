pub mod http;
pub mod memory;

use crate::domain::cluster::{HealthLevel, ResourceList};
use crate::domain::reroute::RerouteCommand;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;

/// `status` is `None` when the cluster never answered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub status: Option<u16>,
    pub message: String,
}

impl BackendError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait ClusterBackend: Send + Sync {
    async fn index_exists(&self, name: &str) -> BackendResult<bool>;

    async fn cluster_health(
        &self,
        indices: &ResourceList,
        level: HealthLevel,
    ) -> BackendResult<Value>;

    async fn create_index(&self, name: &str) -> BackendResult<Value>;

    async fn delete_index(&self, name: &str) -> BackendResult<Value>;

    async fn nodes_info(&self) -> BackendResult<Value>;

    async fn reroute(&self, commands: &[RerouteCommand]) -> BackendResult<Value>;
}
