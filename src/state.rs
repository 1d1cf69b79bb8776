//! Shared application state for all routes.

use crate::service::{DeviceService, DiscoveryService, RuleService};
use crate::store::Store;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Used directly only by the readiness check.
    pub store: Arc<dyn Store>,
    pub devices: DeviceService,
    pub rules: RuleService,
    pub discovery: DiscoveryService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, kepware_file: impl Into<PathBuf>) -> Self {
        Self {
            devices: DeviceService::new(store.clone()),
            rules: RuleService::new(store.clone()),
            discovery: DiscoveryService::new(kepware_file),
            store,
        }
    }
}
