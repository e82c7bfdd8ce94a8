//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! across the feeder workspace, plus the application configuration consumed
//! by the daemon. Every field carries a serde default so a missing file
//! yields a fully working configuration.
//!
//! # Usage
//!
//! ```rust,no_run
//! use feeder_common::config::{ConfigLoader, FeederConfig, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = FeederConfig::load(Path::new("feeder.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::consts::{
    DEFAULT_HOME_DELAY_MS, DEFAULT_LINK_WAIT_S, DEFAULT_PORT, DEFAULT_SIGNAL_PIN, LISTEN_BACKLOG,
    MAX_PULSE_WIDTH_US, MIN_PULSE_WIDTH_US,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

fn default_service_name() -> String {
    "feederd".to_string()
}

/// Common configuration fields shared across feeder applications.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "feederd-tank-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_backlog() -> i32 {
    LISTEN_BACKLOG
}

/// Command listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// TCP port to listen on. Port 0 means "use the default port".
    #[serde(default = "default_port")]
    pub port: u16,

    /// Listen backlog for pending connections.
    #[serde(default = "default_backlog")]
    pub backlog: i32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backlog: LISTEN_BACKLOG,
        }
    }
}

fn default_signal_pin() -> u8 {
    DEFAULT_SIGNAL_PIN
}
fn default_min_pulse_width_us() -> f64 {
    MIN_PULSE_WIDTH_US
}
fn default_max_pulse_width_us() -> f64 {
    MAX_PULSE_WIDTH_US
}
fn default_home_delay_ms() -> u64 {
    DEFAULT_HOME_DELAY_MS
}

/// Servo actuation configuration.
///
/// The pulse width bounds are device calibration constants: the width the
/// servo interprets as 0° and as 180° respectively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServoConfig {
    /// Signal pin driving the pulse output.
    #[serde(default = "default_signal_pin")]
    pub signal_pin: u8,

    /// Pulse width for 0° [µs].
    #[serde(default = "default_min_pulse_width_us")]
    pub min_pulse_width_us: f64,

    /// Pulse width for 180° [µs].
    #[serde(default = "default_max_pulse_width_us")]
    pub max_pulse_width_us: f64,

    /// Delay before the automatic return to home [ms].
    #[serde(default = "default_home_delay_ms")]
    pub home_delay_ms: u64,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            signal_pin: DEFAULT_SIGNAL_PIN,
            min_pulse_width_us: MIN_PULSE_WIDTH_US,
            max_pulse_width_us: MAX_PULSE_WIDTH_US,
            home_delay_ms: DEFAULT_HOME_DELAY_MS,
        }
    }
}

fn default_link_wait_s() -> u64 {
    DEFAULT_LINK_WAIT_S
}

/// Link readiness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Maximum wait for link readiness at startup [s].
    /// On timeout the daemon continues in standalone mode.
    #[serde(default = "default_link_wait_s")]
    pub wait_timeout_s: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            wait_timeout_s: DEFAULT_LINK_WAIT_S,
        }
    }
}

/// Main configuration loaded from `feeder.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeederConfig {
    /// Shared base configuration.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Command listener section.
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Servo actuation section.
    #[serde(default)]
    pub servo: ServoConfig,

    /// Link readiness section.
    #[serde(default)]
    pub link: LinkConfig,
}

impl FeederConfig {
    /// Validate the full configuration.
    ///
    /// # Validation Rules
    /// 1. `shared` passes its own validation
    /// 2. `servo.min_pulse_width_us` > 0 and strictly below the maximum
    /// 3. `listener.backlog` > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.servo.min_pulse_width_us <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "min_pulse_width_us must be positive, got {}",
                self.servo.min_pulse_width_us
            )));
        }

        if self.servo.min_pulse_width_us >= self.servo.max_pulse_width_us {
            return Err(ConfigError::ValidationError(format!(
                "min_pulse_width_us ({}) must be below max_pulse_width_us ({})",
                self.servo.min_pulse_width_us, self.servo.max_pulse_width_us
            )));
        }

        if self.listener.backlog <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "backlog must be positive, got {}",
                self.listener.backlog
            )));
        }

        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
/// - Returns `ConfigError::ValidationError` if semantic validation fails
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
