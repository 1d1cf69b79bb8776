//! Config validation: required database identity and sane limits.

use crate::config::AppConfig;
use crate::error::ConfigError;

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let db = &config.database;
    for (key, value) in [
        ("database.host", &db.host),
        ("database.user", &db.user),
        ("database.dbname", &db.dbname),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
        }
    }
    if db.max_connections == 0 {
        return Err(ConfigError::Invalid("database.max_connections must be at least 1".into()));
    }
    if db.query_timeout_secs == 0 {
        return Err(ConfigError::Invalid("database.query_timeout_secs must be at least 1".into()));
    }
    let level = &config.logger.level;
    level.parse::<tracing::Level>().map_err(|_| {
        ConfigError::Invalid(format!("logger.level {:?} is not a log level", level))
    })?;
    if config.discovery.kepware_file.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("discovery.kepware_file must not be empty".into()));
    }
    Ok(())
}
