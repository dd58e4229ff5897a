//! Logging setup and re-exports of the `log` macros

use serde::{Deserialize, Serialize};
use std::sync::Once;

pub use log::{debug, error, info, trace, warn};

/// Logger configuration.
///
/// `filter` follows the `env_logger` filter syntax (e.g. "info",
/// "whirl_engine=debug,sandbox_app=info").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Explicit filter; falls back to `RUST_LOG`, then to `info`
    pub filter: Option<String>,
    /// Prefix each record with a timestamp
    pub timestamps: bool,
}

static INIT: Once = Once::new();

/// Initialize the logging system with default settings
pub fn init() {
    init_with(&LoggingConfig::default());
}

/// Initialize the logging system once.
///
/// Subsequent calls are ignored, so both the application and tests may call it.
pub fn init_with(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        if !config.timestamps {
            builder.format_timestamp(None);
        }

        // A logger may already be installed by the host (e.g. a test harness).
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}
