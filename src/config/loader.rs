//! Load config from YAML text, a file, or the file named by the environment.

use crate::config::{validate, AppConfig};
use crate::error::ConfigError;
use std::path::Path;

pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/application.yaml";
pub const DATABASE_PASSWORD_ENV: &str = "DATABASE_PASSWORD";

/// Parse and validate.
pub fn parse(yaml: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_yaml::from_str(yaml)?;
    validate(&config)?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text)
}

/// `$CONFIG_PATH` (or the default path), with `$DATABASE_PASSWORD` overriding the file's password.
/// A `.env` file, if present, is loaded into the environment first.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = load_from_path(&path)?;
    if let Ok(password) = std::env::var(DATABASE_PASSWORD_ENV) {
        config.database.password = password;
    }
    Ok(config)
}
