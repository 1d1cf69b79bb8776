//! Rule service handlers.

use super::body;
use crate::error::AppError;
use crate::models::Rule;
use crate::response::{created, ok};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.rules.list().await?))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.rules.get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Rule>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let rule = body(payload)?;
    Ok(created(state.rules.create(rule).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let patch = body(payload)?;
    Ok(ok(state.rules.update(&id, &patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.rules.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
