//! Configuration loading and resolution
//!
//! Settings come from four places, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing TOML file is never fatal: a warning is logged and the remaining
//! sources are used. A TOML file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default HTTP bind address for the web service
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5730";

/// Default pause after every remote mapping-service call (milliseconds)
pub const DEFAULT_API_DELAY_MS: u64 = 100;

/// How long an idle LOADED or COMPLETED session is kept (seconds)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Country appended to free-text geocoding addresses
pub const DEFAULT_COUNTRY: &str = "USA";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SPREAD_CONFIG";

/// Environment variables checked for the Google Maps API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["SPREAD_GOOGLE_MAPS_API_KEY", "GOOGLE_MAPS_API_KEY"];

/// Environment variable overriding the inter-call delay
pub const API_DELAY_ENV: &str = "SPREAD_API_DELAY_MS";

/// Environment variable overriding the bind address
pub const BIND_ADDRESS_ENV: &str = "SPREAD_BIND_ADDRESS";

/// On-disk TOML configuration
///
/// Every field is optional so that a partial file (or none at all) works.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Google Maps Platform API key
    #[serde(default)]
    pub google_maps_api_key: Option<String>,

    /// Pause after every remote call, in milliseconds
    #[serde(default)]
    pub api_delay_ms: Option<u64>,

    /// Country appended to geocoding queries
    #[serde(default)]
    pub country: Option<String>,

    /// HTTP bind address (host:port)
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Seconds an idle session stays downloadable
    #[serde(default)]
    pub session_ttl_secs: Option<u64>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
    }

    /// Load the config file chosen by [`resolve_config_path`]
    ///
    /// Missing file → warning + empty config.
    pub fn load_or_default(cli_path: Option<&Path>) -> Result<Self> {
        let Some(path) = resolve_config_path(cli_path) else {
            warn!("Could not determine a config directory; using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!("Config file {} not found; using defaults", path.display());
            return Ok(Self::default());
        }

        let config = Self::load(&path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Pick the config file path: CLI → `SPREAD_CONFIG` → platform config dir
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// `<config_dir>/spread-geocoder/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spread-geocoder").join("config.toml"))
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub api_delay_ms: Option<u64>,
    pub bind_address: Option<String>,
}

/// Fully resolved service configuration
#[derive(Clone)]
pub struct ServiceConfig {
    /// Google Maps Platform API key (never logged)
    pub api_key: String,
    /// Fixed pause after every remote call
    pub api_delay: Duration,
    /// Country appended to geocoding queries
    pub country: String,
    /// HTTP bind address
    pub bind_address: String,
    /// Idle sessions older than this are dropped
    pub session_ttl: Duration,
    /// Log level for the tracing subscriber
    pub log_level: String,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("api_delay", &self.api_delay)
            .field("country", &self.country)
            .field("bind_address", &self.bind_address)
            .field("session_ttl", &self.session_ttl)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ServiceConfig {
    /// Resolve every setting from CLI overrides, environment, TOML and defaults
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no usable API key is found or if
    /// `SPREAD_API_DELAY_MS` is not an integer.
    pub fn resolve(toml_config: &TomlConfig, overrides: ConfigOverrides) -> Result<Self> {
        let api_key = resolve_api_key(overrides.api_key.as_deref(), toml_config)?;

        let api_delay_ms = match overrides.api_delay_ms {
            Some(ms) => ms,
            None => match std::env::var(API_DELAY_ENV) {
                Ok(raw) => raw.trim().parse::<u64>().map_err(|e| {
                    Error::Config(format!("{} must be an integer: {}", API_DELAY_ENV, e))
                })?,
                Err(_) => toml_config.api_delay_ms.unwrap_or(DEFAULT_API_DELAY_MS),
            },
        };

        let bind_address = overrides
            .bind_address
            .or_else(|| std::env::var(BIND_ADDRESS_ENV).ok())
            .or_else(|| toml_config.bind_address.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let country = toml_config
            .country
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

        Ok(Self {
            api_key,
            api_delay: Duration::from_millis(api_delay_ms),
            country,
            bind_address,
            session_ttl: Duration::from_secs(
                toml_config
                    .session_ttl_secs
                    .unwrap_or(DEFAULT_SESSION_TTL_SECS),
            ),
            log_level: toml_config.logging.level.clone(),
        })
    }
}

/// Resolve the Google Maps API key
///
/// **Priority:** CLI → ENV → TOML
pub fn resolve_api_key(cli_key: Option<&str>, toml_config: &TomlConfig) -> Result<String> {
    if let Some(key) = cli_key.filter(|k| is_valid_key(k)) {
        info!("Google Maps API key taken from command line");
        return Ok(key.trim().to_string());
    }

    let env_key = API_KEY_ENV_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|k| is_valid_key(k)).map(|k| (*name, k)));
    let toml_key = toml_config
        .google_maps_api_key
        .as_deref()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("Google Maps API key found in both environment and TOML. Using environment (higher priority).");
    }

    if let Some((name, key)) = env_key {
        info!("Google Maps API key loaded from environment variable {}", name);
        return Ok(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("Google Maps API key loaded from TOML config");
        return Ok(key.trim().to_string());
    }

    Err(Error::Config(format!(
        "Google Maps API key not configured. Please configure using one of:\n\
         1. Command line: --api-key your-key-here\n\
         2. Environment: {}=your-key-here\n\
         3. TOML config: {} (google_maps_api_key = \"your-key\")",
        API_KEY_ENV_VARS[0],
        default_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "config.toml".to_string())
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
