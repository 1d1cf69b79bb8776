//! HTTP handlers for devices, rules and discovery.

pub mod device;
pub mod rule;

use crate::error::AppError;
use axum::extract::rejection::JsonRejection;
use axum::Json;

/// Unwrap a JSON body, turning any extractor rejection into a 400 envelope.
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(v)| v)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
