//! Servo controller: angle clamping, duty math and blocking auto-home.
//!
//! The `ServoController` is the exclusive owner of its pulse driver; no
//! other component may write duty values. It is invoked from exactly one
//! thread (the connection-handling thread), so no lock guards the driver
//! handle — callers introducing concurrent invocation must add one.

use feeder_common::angle::{clamp_angle, pulse_width_for_angle};
use feeder_common::config::ServoConfig;
use feeder_common::consts::HOME_ANGLE_DEG;
use feeder_common::pulse::config::PulseChannelConfig;
use feeder_common::pulse::driver::{PulseDriver, PulseError};
use std::time::Duration;
use tracing::{debug, info};

/// Actuation state of the servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActuatorState {
    /// At rest; the home duty is applied.
    #[default]
    Idle,
    /// A target duty has just been applied.
    Moving,
    /// Waiting out the delay before the automatic return to home.
    HomingDelay,
}

/// Servo controller owning one pulse driver instance.
pub struct ServoController {
    /// Pulse generation backend
    driver: Box<dyn PulseDriver>,
    /// Pulse width for 0° [µs]
    min_pulse_width_us: f64,
    /// Pulse width for 180° [µs]
    max_pulse_width_us: f64,
    /// Signal pin for the pulse channel
    signal_pin: u8,
    /// Current actuation state
    state: ActuatorState,
    /// Last commanded angle [degrees]
    angle_deg: f64,
    /// Initialized flag
    initialized: bool,
}

impl ServoController {
    /// Create a controller around the given driver and calibration.
    ///
    /// The driver is not touched until [`init`](Self::init) is called.
    pub fn new(driver: Box<dyn PulseDriver>, config: &ServoConfig) -> Self {
        Self {
            driver,
            min_pulse_width_us: config.min_pulse_width_us,
            max_pulse_width_us: config.max_pulse_width_us,
            signal_pin: config.signal_pin,
            state: ActuatorState::Idle,
            angle_deg: HOME_ANGLE_DEG,
            initialized: false,
        }
    }

    /// Initialize the pulse driver and force the angle to 0°.
    ///
    /// The explicit move to home makes the startup position independent of
    /// whatever duty the driver emits by default.
    ///
    /// # Errors
    /// Propagates `PulseError::InitFailed` — fatal, the device has no
    /// actuation capability without a working pulse output.
    pub fn init(&mut self) -> Result<(), PulseError> {
        info!(
            "Initializing servo: driver '{}' v{}, pulse range {:.1}-{:.1} µs",
            self.driver.name(),
            self.driver.version(),
            self.min_pulse_width_us,
            self.max_pulse_width_us
        );

        let channel = PulseChannelConfig::for_pin(self.signal_pin);
        self.driver.init(&channel)?;
        self.initialized = true;

        self.set_angle(HOME_ANGLE_DEG)?;
        self.state = ActuatorState::Idle;

        info!("Servo initialized at {}°", HOME_ANGLE_DEG);
        Ok(())
    }

    /// Move the servo to the given angle.
    ///
    /// The angle is clamped to `[0, 180]` before the pulse width is
    /// computed, so the driver never sees a width outside the calibrated
    /// range.
    ///
    /// # Errors
    /// Returns `PulseError::NotInitialized` before `init()`; propagates
    /// `PulseError::HardwareFault` from the duty write unchanged (fatal to
    /// the actuation path, not retried).
    pub fn set_angle(&mut self, angle_deg: f64) -> Result<(), PulseError> {
        if !self.initialized {
            return Err(PulseError::NotInitialized);
        }

        let angle_deg = clamp_angle(angle_deg);
        let pulse_width_us =
            pulse_width_for_angle(angle_deg, self.min_pulse_width_us, self.max_pulse_width_us);

        debug!(
            "Set angle: {:.1}° (pulse width {:.1} µs)",
            angle_deg, pulse_width_us
        );

        self.driver.set_duty_us(pulse_width_us)?;
        self.angle_deg = angle_deg;
        self.state = ActuatorState::Moving;
        Ok(())
    }

    /// Move to the given angle, hold it for `home_delay`, then return to 0°.
    ///
    /// This is one synchronous operation: the calling thread is blocked for
    /// the full delay and the method only returns once the home angle has
    /// been reapplied. The blocking is deliberate — it guarantees the servo
    /// settles at home exactly `home_delay` after a command without a
    /// separate timer mechanism, at the cost of monopolizing the calling
    /// thread.
    pub fn set_angle_with_auto_home(
        &mut self,
        angle_deg: f64,
        home_delay: Duration,
    ) -> Result<(), PulseError> {
        self.set_angle(angle_deg)?;

        debug!("Auto-home in {} ms", home_delay.as_millis());
        self.state = ActuatorState::HomingDelay;
        std::thread::sleep(home_delay);

        self.set_angle(HOME_ANGLE_DEG)?;
        self.state = ActuatorState::Idle;
        debug!("Servo returned to home position");
        Ok(())
    }

    /// Current actuation state.
    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Last commanded angle [degrees].
    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    /// Last duty value written to the driver [µs].
    pub fn duty_us(&self) -> f64 {
        self.driver.duty_us()
    }

    /// True once `init()` has completed successfully.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Release the pulse output.
    pub fn shutdown(&mut self) -> Result<(), PulseError> {
        info!("Shutting down servo");
        self.initialized = false;
        self.driver.shutdown()
    }
}
