//! Subscriber setup. Called once by the binary; the returned guard must outlive logging.

use crate::config::LoggerConfig;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "devicesphere.log";

/// Console output always; a daily-rolling file as well when `filepath` is set.
/// `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggerConfig) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::Invalid(format!("logger.level: {}", e)))?;

    let (file_layer, guard) = match &config.filepath {
        Some(path) => {
            let (dir, file) = split_log_path(path);
            std::fs::create_dir_all(&dir).map_err(|source| ConfigError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(dir, file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false).with_target(true)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Invalid(format!("logger already initialized: {}", e)))?;
    Ok(guard)
}

fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE)
        .to_string();
    (dir, file)
}
