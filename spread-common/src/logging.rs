//! Tracing filter setup
//!
//! The subscriber is installed before the config file is read, so that
//! config-loading warnings are visible. It starts at `RUST_LOG` (or info) and
//! the configured `[logging] level` is applied afterwards through a reload
//! handle, unless `RUST_LOG` was set.

use crate::{Error, Result};
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Level used until the config file has been read
pub const STARTUP_LOG_LEVEL: &str = "info";

/// Handle for swapping the active filter
pub type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

/// Filter for the workspace crates at `level`
pub fn filter_for_level(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "spread_geocoder={0},spread_common={0},tower_http=info",
        level
    ))
}

/// Reloadable filter layer: `RUST_LOG` if set, otherwise [`STARTUP_LOG_LEVEL`]
pub fn startup_filter() -> (reload::Layer<EnvFilter, Registry>, LogFilterHandle) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for_level(STARTUP_LOG_LEVEL));
    reload::Layer::new(filter)
}

/// Switch to the configured level
///
/// Returns `false` (and changes nothing) when `RUST_LOG` is set.
pub fn apply_config_level(handle: &LogFilterHandle, level: &str) -> Result<bool> {
    if std::env::var_os("RUST_LOG").is_some() {
        return Ok(false);
    }
    handle
        .reload(filter_for_level(level))
        .map_err(|e| Error::Config(format!("Failed to apply log level {}: {}", level, e)))?;
    tracing::debug!("Log level set to {}", level);
    Ok(true)
}
