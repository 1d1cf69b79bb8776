//! Router assembly: operational routes plus the versioned device and rule services.

pub mod common;
pub mod device;
pub mod rule;

pub use common::common_routes;
pub use device::device_routes;
pub use rule::rule_routes;

use crate::error::AppError;
use crate::middleware::{require_supported_version, trace_request, unsupported_version};
use crate::state::AppState;
use axum::{
    http::Uri,
    middleware::from_fn,
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, limit::RequestBodyLimitLayer};

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 1024 * 1024;

async fn not_found(uri: Uri) -> AppError {
    match unsupported_version(uri.path()) {
        Some(version) => AppError::Version(version.to_string()),
        None => AppError::NotFound("Resource not found".into()),
    }
}

/// A panicking handler answers with the same 500 envelope as any other internal failure.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    AppError::Query(format!("handler panicked: {}", detail)).into_response()
}

/// Full application router.
pub fn api_routes(state: AppState) -> Router {
    let v1 = Router::new()
        .nest("/device-service", device_routes())
        .nest("/rule-service", rule_routes());
    Router::new()
        .merge(common_routes())
        .nest("/api/v1", v1)
        .fallback(not_found)
        .layer(from_fn(require_supported_version))
        .layer(from_fn(trace_request))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .with_state(state)
}
