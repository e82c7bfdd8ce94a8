//! Pulse driver trait and error types.
//!
//! This module defines:
//! - `PulseDriver` trait - Interface for pluggable pulse generation backends
//! - `PulseError` enum - Error types for pulse operations
//! - `DriverFactory` type alias - Factory function type

use crate::pulse::config::PulseChannelConfig;
use thiserror::Error;

/// Error types for pulse generation operations.
#[derive(Debug, Clone, Error)]
pub enum PulseError {
    /// Driver initialization failed. Fatal: the device has no actuation
    /// capability without a working pulse output.
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Duty write failed. Fatal to the actuation path, never retried.
    #[error("Hardware fault: {0}")]
    HardwareFault(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Operation attempted before `init()`
    #[error("Pulse driver not initialized")]
    NotInitialized,
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn PulseDriver>;

/// Trait defining the interface for pulse generation backends.
///
/// A driver owns one waveform output: a fixed-frequency periodic signal
/// whose active-high duration equals the last duty value written. The
/// servo controller manages drivers through this trait, enabling pluggable
/// backends (simulation, MCPWM peripherals, expansion boards).
///
/// # Lifecycle
///
/// 1. `init()` - Allocates the timer/comparator resource chain and starts
///    the waveform. Failure is fatal — there is no recovery path.
/// 2. `set_duty_us()` - Called for every commanded move.
/// 3. `shutdown()` - Releases resources; idempotent.
///
/// # Waveform Contract
///
/// | Property | Requirement |
/// |----------|-------------|
/// | Frequency | fixed per channel config (50 Hz standard) |
/// | Duty update | latched at the next period boundary |
/// | Glitching | a transient duty is never emitted for less than one full period |
pub trait PulseDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the driver and start the waveform.
    ///
    /// # Errors
    /// Returns `PulseError::InitFailed` if the underlying timer/comparator
    /// resources cannot be allocated.
    fn init(&mut self, config: &PulseChannelConfig) -> Result<(), PulseError>;

    /// Set the active-high duration of the waveform in microseconds.
    ///
    /// Safe to call while the waveform is running: the new value takes
    /// effect at the next period boundary without glitching the output.
    ///
    /// # Errors
    /// Returns `PulseError::NotInitialized` before `init()`, or
    /// `PulseError::HardwareFault` if the compare write fails.
    fn set_duty_us(&mut self, duty_us: f64) -> Result<(), PulseError>;

    /// Last duty value accepted by `set_duty_us` (0.0 before any write).
    fn duty_us(&self) -> f64;

    /// Release the waveform resources.
    ///
    /// Releases generator → comparator → operator → timer in dependency
    /// order; each step is safe to repeat on an already-released handle.
    fn shutdown(&mut self) -> Result<(), PulseError>;
}
