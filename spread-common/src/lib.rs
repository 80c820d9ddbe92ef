//! # Spread Common Library
//!
//! Shared code for the spread-geocoder workspace:
//! - Error type shared by configuration and service startup
//! - Configuration loading (TOML file, environment, compiled defaults)
//! - Tracing filter setup with a config-driven reload
//! - Event types (SpreadEvent enum) and the broadcast EventBus
//! - Server-Sent Events helpers

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod sse;

pub use error::{Error, Result};
