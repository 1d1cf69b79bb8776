use crate::handlers::device::{
    create, delete as delete_handler, kepware_devices, list, properties, read, update,
};
use crate::state::AppState;
use axum::{routing::get, Router};

/// Mounted under `/api/v1/device-service`.
pub fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/devices", get(list).post(create))
        .route("/devices/:id", get(read).put(update).delete(delete_handler))
        .route("/devices/:id/properties", get(properties))
        .route("/device-discovery/kepware/devices", get(kepware_devices))
}
