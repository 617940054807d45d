// src/utils/config.rs
//! Engine configuration
//!
//! Layered with the `config` crate:
//!
//! 1. Built-in defaults (`#[serde(default)]` on every section)
//! 2. Optional `uihost.toml` in the working directory, or the file named by
//!    `UIHOST_CONFIG`
//! 3. `UIHOST__<SECTION>__<KEY>` environment overrides

use crate::utils::errors::{EngineError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file stem (resolved to `uihost.toml`, `uihost.json`, ...)
const DEFAULT_CONFIG_STEM: &str = "uihost";

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub runtime: RuntimeConfig,
    pub app: AppConfig,
    pub observability: ObservabilityConfig,
}

/// Thread and watchdog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Prefix for role thread names (`<prefix>-<instance>.<role>`)
    pub thread_name_prefix: String,

    /// Run the watchdog ticker thread
    pub watchdog_enabled: bool,

    /// Interval between watchdog heartbeats in milliseconds
    pub watchdog_interval_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "uihost".to_string(),
            watchdog_enabled: false,
            watchdog_interval_ms: 3_000,
        }
    }
}

/// Application-wide flags applied to every container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub debug_version: bool,
    pub need_debug_breakpoint: bool,
    pub right_to_left: bool,

    /// Set once a card frontend has been created in this process
    pub card_type: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging and metrics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        match std::env::var("UIHOST_CONFIG") {
            Ok(path) => Self::load_from(Some(Path::new(&path))),
            Err(_) => Self::load_from(None),
        }
    }

    /// Load configuration, reading `path` if given (it must then exist)
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_STEM).required(false),
        };

        let config: EngineConfig = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("UIHOST").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.runtime.watchdog_enabled && self.runtime.watchdog_interval_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "runtime.watchdog_interval_ms must be positive when the watchdog is enabled".into(),
            ));
        }
        if self.runtime.thread_name_prefix.is_empty() {
            return Err(EngineError::InvalidConfig(
                "runtime.thread_name_prefix cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
