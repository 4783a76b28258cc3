use crate::AppState;
use crate::api::responses::{ApiError, PrettyJson};
use axum::extract::State;
use std::sync::Arc;

pub async fn info(State(state): State<Arc<AppState>>) -> Result<PrettyJson, ApiError> {
    Ok(PrettyJson(state.backend.nodes_info().await?))
}
