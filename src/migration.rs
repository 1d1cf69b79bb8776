//! Startup DDL: create the database if needed, then the four tables and their indexes.
//! Every statement is idempotent.

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::sql::quoted;
use crate::store::QueryExecutor;
use sqlx::ConnectOptions;

const CREATE_DEVICES: &str = "CREATE TABLE IF NOT EXISTS devices (
    id VARCHAR(255) PRIMARY KEY,
    reference_id VARCHAR(255) NOT NULL UNIQUE,
    type VARCHAR(255),
    device_name VARCHAR(255),
    created_at VARCHAR(255),
    state VARCHAR(255) NOT NULL,
    location VARCHAR(255),
    status VARCHAR(255) NOT NULL,
    customer VARCHAR(255),
    site VARCHAR(255)
)";

const CREATE_PROPERTIES: &str = "CREATE TABLE IF NOT EXISTS properties (
    id VARCHAR(255) PRIMARY KEY,
    seq BIGSERIAL,
    device_id VARCHAR(255) NOT NULL REFERENCES devices(id),
    reference_id VARCHAR(255) NOT NULL,
    name VARCHAR(255) NOT NULL,
    unit VARCHAR(255),
    state VARCHAR(255) NOT NULL,
    status VARCHAR(255) NOT NULL,
    data_type VARCHAR(255),
    value VARCHAR(255),
    threshold VARCHAR(255) NOT NULL
)";

const CREATE_RULES: &str = "CREATE TABLE IF NOT EXISTS rules (
    id VARCHAR(255) PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    severity VARCHAR(255) NOT NULL,
    status VARCHAR(255) NOT NULL,
    type VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    created_at VARCHAR(255) NOT NULL,
    updated_at VARCHAR(255) NOT NULL
)";

const CREATE_CONDITIONS: &str = "CREATE TABLE IF NOT EXISTS conditions (
    id VARCHAR(255) PRIMARY KEY,
    rule_id VARCHAR(255) NOT NULL REFERENCES rules(id),
    position VARCHAR(255) NOT NULL,
    type VARCHAR(255) NOT NULL,
    device_id VARCHAR(255),
    device_name VARCHAR(255),
    property_id VARCHAR(255),
    property_name VARCHAR(255),
    operator_id VARCHAR(255),
    operator_symbol VARCHAR(255),
    value VARCHAR(255)
)";

const INDEX_PROPERTIES_DEVICE: &str =
    "CREATE INDEX IF NOT EXISTS properties_device_id_idx ON properties (device_id, seq)";

const INDEX_CONDITIONS_RULE: &str =
    "CREATE INDEX IF NOT EXISTS conditions_rule_id_idx ON conditions (rule_id)";

/// Parents before children so the foreign keys resolve.
const SCHEMA: [&str; 6] = [
    CREATE_DEVICES,
    CREATE_PROPERTIES,
    CREATE_RULES,
    CREATE_CONDITIONS,
    INDEX_PROPERTIES_DEVICE,
    INDEX_CONDITIONS_RULE,
];

pub async fn ensure_tables<E>(exec: &E) -> Result<(), AppError>
where
    E: QueryExecutor + ?Sized,
{
    for ddl in SCHEMA {
        exec.execute(ddl, &[]).await?;
    }
    tracing::info!(statements = SCHEMA.len(), "schema ensured");
    Ok(())
}

/// Create the configured database through the maintenance database when it does not exist.
pub async fn ensure_database_exists(config: &DatabaseConfig) -> Result<(), AppError> {
    let name = config.dbname.trim();
    if name.is_empty() || name == "postgres" {
        return Ok(());
    }
    let mut conn = config.maintenance_options().connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quoted(name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %name, "database created");
    }
    Ok(())
}
