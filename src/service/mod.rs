//! Resource services: validation, transactional writes and nested fetches over the repository.

mod device;
mod discovery;
mod rule;
mod validation;

pub use device::DeviceService;
pub use discovery::DiscoveryService;
pub use rule::RuleService;
pub use validation::RequestValidator;

use crate::error::AppError;
use chrono::{SecondsFormat, Utc};

/// Current UTC time as stored in timestamp text columns.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A unique-key rejection from the store becomes a conflict; everything else passes through.
pub(crate) fn conflict_on_unique(err: AppError, message: &str) -> AppError {
    if err.is_unique_violation() {
        AppError::Conflict(message.to_string())
    } else {
        err
    }
}
