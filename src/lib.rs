//! DeviceSphere: device and rule CRUD services over a generic PostgreSQL table layer.

pub mod config;
pub mod error;
pub mod flatten;
pub mod handlers;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod value;

#[cfg(test)]
mod testing;

pub use config::{load_from_env, load_from_path, AppConfig};
pub use error::{AppError, ConfigError};
pub use migration::{ensure_database_exists, ensure_tables};
pub use models::{Condition, Device, Property, Rule};
pub use repository::TableRepository;
pub use routes::api_routes;
pub use service::{DeviceService, DiscoveryService, RuleService};
pub use state::AppState;
pub use store::{PgStore, QueryExecutor, Store, UnitOfWork};
pub use value::{Record, Scalar};
