use crate::handlers::rule::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

/// Mounted under `/api/v1/rule-service`.
pub fn rule_routes() -> Router<AppState> {
    Router::new()
        .route("/rules", get(list).post(create))
        .route("/rules/:id", get(read).put(update).delete(delete_handler))
}
