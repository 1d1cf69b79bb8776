//! DeviceSphere server: loads config, prepares the database and serves the API.
//!
//! Run from repo root: `cargo run -p devicesphere-server`
//! Config path: `$CONFIG_PATH`, default `config/application.yaml`.

use devicesphere::{
    api_routes, ensure_database_exists, ensure_tables, load_from_env, telemetry, AppState, PgStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_from_env()?;
    let _log_guard = telemetry::init(&config.logger)?;

    ensure_database_exists(&config.database).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.query_timeout())
        .connect_with(config.database.connect_options())
        .await?;
    let store = PgStore::new(pool, config.database.query_timeout());
    ensure_tables(&store).await?;

    let state = AppState::new(Arc::new(store), config.discovery.kepware_file.clone());
    let app = api_routes(state);

    let listener = TcpListener::bind(("0.0.0.0", config.server.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "devicesphere listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("devicesphere stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
