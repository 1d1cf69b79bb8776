//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsupported api version: {0}")]
    Version(String),
    #[error("query: {0}")]
    Query(String),
    #[error("discovery: {0}")]
    Discovery(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    /// True when the store rejected a write on a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Db(sqlx::Error::Database(db)) => {
                db.code().as_deref() == Some(UNIQUE_VIOLATION)
            }
            _ => false,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) | AppError::Version(_) => StatusCode::NOT_FOUND,
            AppError::Query(_)
            | AppError::Discovery(_)
            | AppError::Db(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients. Store and config detail stays in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(m) | AppError::Conflict(m) | AppError::NotFound(m) => m.clone(),
            AppError::BadRequest(_) => "Invalid data, unable to parse".to_string(),
            AppError::Version(_) => "Version not found".to_string(),
            AppError::Query(_)
            | AppError::Discovery(_)
            | AppError::Db(_)
            | AppError::Config(_) => "Internal server error".to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
