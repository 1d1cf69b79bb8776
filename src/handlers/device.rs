//! Device service handlers.

use super::body;
use crate::error::AppError;
use crate::models::Device;
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
    Ok(ok(state.devices.list().await?))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.devices.get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Device>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let device = body(payload)?;
    Ok(created(state.devices.create(device).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let patch = body(payload)?;
    Ok(ok(state.devices.update(&id, &patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.devices.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn properties(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.devices.properties(&id).await?))
}

pub async fn kepware_devices(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.discovery.kepware_devices().await?))
}
