use crate::AppState;
use crate::api::responses::{ApiError, PrettyJson};
use crate::domain::reroute::RerouteCommand;
use axum::extract::{Path, State};
use std::sync::Arc;

pub async fn allocate(
    Path((index, shard, node)): Path<(String, u32, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<PrettyJson, ApiError> {
    let command = RerouteCommand::Allocate { index, shard, node };
    Ok(PrettyJson(state.backend.reroute(&[command]).await?))
}

pub async fn move_shard(
    Path((index, shard, from_node, to_node)): Path<(String, u32, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<PrettyJson, ApiError> {
    let command = RerouteCommand::Move {
        index,
        shard,
        from_node,
        to_node,
    };
    Ok(PrettyJson(state.backend.reroute(&[command]).await?))
}
