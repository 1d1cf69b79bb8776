//! Request middleware: API version gate and request tracing.

use crate::error::AppError;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;

pub const API_VERSION: &str = "v1";

/// The `{version}` segment of `/api/{version}/...` when it is not one this service serves.
pub fn unsupported_version(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/api/")?;
    let version = rest.split('/').next().unwrap_or_default();
    (version != API_VERSION).then_some(version)
}

/// Reject `/api/{version}/...` for any version other than `v1` with a 404 envelope.
pub async fn require_supported_version(request: Request, next: Next) -> Response {
    if let Some(version) = unsupported_version(request.uri().path()) {
        return AppError::Version(version.to_string()).into_response();
    }
    next.run(request).await
}

pub async fn trace_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );
    response
}
