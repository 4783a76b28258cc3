use crate::backend::BackendError;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, ser::PrettyFormatter};
use thiserror::Error;
use tracing::error;

pub fn pretty(value: &Value) -> Result<String, serde_json::Error> {
    let sorted = sort_keys(value);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    sorted.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrettyJson(pub Value);

impl IntoResponse for PrettyJson {
    fn into_response(self) -> Response {
        match pretty(&self.0) {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Err(e) => {
                error!("failed to render response: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("indices not found: {}", .0.join(","))]
    IndicesNotFound(Vec<String>),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::IndicesNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Backend(err) => err
                .status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Backend(err) = &self {
            error!(status = ?err.status, "cluster call failed: {}", err.message);
        }
        (status, self.to_string()).into_response()
    }
}
