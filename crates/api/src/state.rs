//! Application state

use std::sync::Arc;

use signdeck_billing::EntitlementService;

use crate::config::Config;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub entitlements: Arc<EntitlementService>,
}

impl AppState {
    pub fn new(config: Config, entitlements: EntitlementService) -> Self {
        Self {
            config: Arc::new(config),
            entitlements: Arc::new(entitlements),
        }
    }
}
