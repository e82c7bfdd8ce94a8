//! Prelude module for common re-exports.
//!
//! Provides convenient re-exports of commonly used types so that consumers
//! can do `use feeder_common::prelude::*;` and get the most important types
//! without listing individual paths.

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, FeederConfig, SharedConfig};

// ─── Angle translation ──────────────────────────────────────────────
pub use crate::angle::{angle_for_digit, clamp_angle, pulse_width_for_angle};

// ─── Pulse generation ───────────────────────────────────────────────
pub use crate::pulse::config::PulseChannelConfig;
pub use crate::pulse::driver::{DriverFactory, PulseDriver, PulseError};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_PORT, HOME_ANGLE_DEG, MAX_ANGLE_DEG};
