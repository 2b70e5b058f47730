//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::scan::ScanOptions;

/// Shared application state
///
/// Read-only after startup; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    scan_options: ScanOptions,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let scan_options = ScanOptions {
            dpi: config.scan.dpi,
        };
        Self {
            inner: Arc::new(AppStateInner {
                config,
                scan_options,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Pipeline options derived from the configuration
    pub fn scan_options(&self) -> ScanOptions {
        self.inner.scan_options
    }
}
