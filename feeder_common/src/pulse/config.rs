//! Pulse channel configuration.

use crate::consts::{DEFAULT_SIGNAL_PIN, PULSE_FREQUENCY_HZ, PULSE_RESOLUTION_HZ};
use crate::pulse::driver::PulseError;
use serde::{Deserialize, Serialize};

/// Configuration for a single pulse output channel.
///
/// The waveform timing is fixed by the actuator protocol: a 50 Hz carrier
/// with 1 µs compare resolution. Only the signal pin varies per device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseChannelConfig {
    /// Signal pin driving the waveform output.
    pub signal_pin: u8,

    /// Waveform frequency [Hz].
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: u32,

    /// Timer resolution [Hz]. 1 MHz gives 1 µs per tick.
    #[serde(default = "default_resolution_hz")]
    pub resolution_hz: u32,
}

fn default_frequency_hz() -> u32 {
    PULSE_FREQUENCY_HZ
}
fn default_resolution_hz() -> u32 {
    PULSE_RESOLUTION_HZ
}

impl Default for PulseChannelConfig {
    fn default() -> Self {
        Self::for_pin(DEFAULT_SIGNAL_PIN)
    }
}

impl PulseChannelConfig {
    /// Create a channel configuration for the given signal pin with the
    /// protocol-standard timing.
    pub fn for_pin(signal_pin: u8) -> Self {
        Self {
            signal_pin,
            frequency_hz: PULSE_FREQUENCY_HZ,
            resolution_hz: PULSE_RESOLUTION_HZ,
        }
    }

    /// Period length in timer ticks.
    #[inline]
    pub fn period_ticks(&self) -> u32 {
        self.resolution_hz / self.frequency_hz
    }

    /// Period length in microseconds.
    #[inline]
    pub fn period_us(&self) -> f64 {
        1_000_000.0 / self.frequency_hz as f64
    }

    /// Validate the channel configuration.
    pub fn validate(&self) -> Result<(), PulseError> {
        if self.frequency_hz == 0 {
            return Err(PulseError::ConfigError(
                "frequency_hz must be greater than 0".to_string(),
            ));
        }
        if self.resolution_hz < self.frequency_hz {
            return Err(PulseError::ConfigError(format!(
                "resolution_hz ({}) must be at least frequency_hz ({})",
                self.resolution_hz, self.frequency_hz
            )));
        }
        Ok(())
    }
}
