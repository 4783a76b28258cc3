use crate::AppState;
use crate::api::responses::{ApiError, PrettyJson};
use crate::domain::cluster::{HealthLevel, ResourceList};
use axum::extract::{Path, State};
use serde_json::{Map, Value};
use std::sync::Arc;

pub async fn health(State(state): State<Arc<AppState>>) -> Result<PrettyJson, ApiError> {
    checked_health(&state, ResourceList::default(), HealthLevel::Cluster).await
}

pub async fn indices_health(
    Path(indices): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<PrettyJson, ApiError> {
    checked_health(&state, ResourceList::parse(&indices), HealthLevel::Indices).await
}

pub async fn shards_health(
    Path(indices): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<PrettyJson, ApiError> {
    checked_health(&state, ResourceList::parse(&indices), HealthLevel::Shards).await
}

// Only the last result is returned. The first failure stops the batch and
// earlier indices stay created. Same for delete.
pub async fn create_indices(
    Path(indices): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<PrettyJson, ApiError> {
    let mut last = Value::Object(Map::new());
    for name in ResourceList::parse(&indices).iter() {
        last = state.backend.create_index(name).await?;
    }
    Ok(PrettyJson(last))
}

pub async fn delete_indices(
    Path(indices): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<PrettyJson, ApiError> {
    let mut last = Value::Object(Map::new());
    for name in ResourceList::parse(&indices).iter() {
        last = state.backend.delete_index(name).await?;
    }
    Ok(PrettyJson(last))
}

// Missing indices are reported up front; a health call naming them would block
// until the cluster's wait timeout.
async fn checked_health(
    state: &AppState,
    indices: ResourceList,
    level: HealthLevel,
) -> Result<PrettyJson, ApiError> {
    let mut missing = Vec::new();
    for name in indices.iter() {
        if !state.backend.index_exists(name).await? {
            missing.push(name.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(ApiError::IndicesNotFound(missing));
    }

    let health = state.backend.cluster_health(&indices, level).await?;
    Ok(PrettyJson(health))
}
