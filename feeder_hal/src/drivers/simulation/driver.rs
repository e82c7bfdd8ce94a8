//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `PulseDriver` trait by emulating
//! the hardware resource chain (timer → operator → comparator → generator)
//! and the resulting waveform against wall-clock time.

use super::waveform::Waveform;
use feeder_common::pulse::config::PulseChannelConfig;
use feeder_common::pulse::driver::{PulseDriver, PulseError};
use std::time::Instant;
use tracing::{debug, info};

/// Emulated periodic timer.
#[derive(Debug)]
struct SimTimer {
    resolution_hz: u32,
    period_ticks: u32,
    running: bool,
}

/// Emulated operator connecting the timer to the generator.
#[derive(Debug)]
struct SimOperator {
    connected: bool,
}

/// Emulated comparator holding the compare value in ticks.
#[derive(Debug)]
struct SimComparator {
    compare_ticks: u32,
}

/// Emulated waveform generator bound to a signal pin.
#[derive(Debug)]
struct SimGenerator {
    signal_pin: u8,
}

/// Simulation driver implementing the PulseDriver trait.
pub struct SimulationDriver {
    /// Driver name
    name: &'static str,
    /// Driver version
    version: &'static str,
    /// Initialized flag
    initialized: bool,
    /// Emulated timer resource
    timer: Option<SimTimer>,
    /// Emulated operator resource
    operator: Option<SimOperator>,
    /// Emulated comparator resource
    comparator: Option<SimComparator>,
    /// Emulated generator resource
    generator: Option<SimGenerator>,
    /// Waveform model fed by the comparator
    waveform: Option<Waveform>,
    /// Last accepted duty value [µs]
    duty_us: f64,
}

impl SimulationDriver {
    /// Create a new simulation driver instance.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            initialized: false,
            timer: None,
            operator: None,
            comparator: None,
            generator: None,
            waveform: None,
            duty_us: 0.0,
        }
    }

    /// Duty active in the waveform period containing `now` [µs].
    ///
    /// Unlike [`PulseDriver::duty_us`] this reflects the period-boundary
    /// latch: a freshly written value only shows up here once its boundary
    /// has passed.
    pub fn emitted_duty_us(&mut self, now: Instant) -> f64 {
        if !self.chain_intact() {
            return 0.0;
        }
        self.waveform.as_mut().map(|w| w.duty_at(now)).unwrap_or(0.0)
    }

    /// Signal level of the emulated output at `now`.
    ///
    /// Low whenever any link of the timer → operator → generator chain is
    /// released or stopped.
    pub fn level_at(&mut self, now: Instant) -> bool {
        if !self.chain_intact() {
            return false;
        }
        self.waveform
            .as_mut()
            .map(|w| w.is_high(now))
            .unwrap_or(false)
    }

    /// True while the timer runs and the operator still couples it to the
    /// generator.
    fn chain_intact(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| t.running)
            && self.operator.as_ref().is_some_and(|o| o.connected)
            && self.generator.is_some()
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn init(&mut self, config: &PulseChannelConfig) -> Result<(), PulseError> {
        info!(
            "Initializing simulation pulse driver: pin {}, {} Hz, {} ticks/period",
            config.signal_pin,
            config.frequency_hz,
            config.period_ticks()
        );

        config
            .validate()
            .map_err(|e| PulseError::InitFailed(e.to_string()))?;

        // Allocate the resource chain in hardware dependency order.
        let mut timer = SimTimer {
            resolution_hz: config.resolution_hz,
            period_ticks: config.period_ticks(),
            running: false,
        };
        let operator = SimOperator { connected: true };
        let comparator = SimComparator { compare_ticks: 0 };
        let generator = SimGenerator {
            signal_pin: config.signal_pin,
        };

        debug!(
            "Allocated pulse chain: timer {} Hz / {} ticks, generator on pin {}",
            timer.resolution_hz, timer.period_ticks, generator.signal_pin
        );

        timer.running = true;
        self.timer = Some(timer);
        self.operator = Some(operator);
        self.comparator = Some(comparator);
        self.generator = Some(generator);
        self.waveform = Some(Waveform::new(config.period_us(), Instant::now()));
        self.duty_us = 0.0;
        self.initialized = true;

        info!("Simulation pulse driver initialized");
        Ok(())
    }

    fn set_duty_us(&mut self, duty_us: f64) -> Result<(), PulseError> {
        if !self.initialized {
            return Err(PulseError::NotInitialized);
        }

        if !duty_us.is_finite() || duty_us < 0.0 {
            return Err(PulseError::HardwareFault(format!(
                "invalid compare value: {duty_us}"
            )));
        }

        // Hardware compare registers hold whole ticks: truncate like the
        // peripheral would.
        let comparator = self
            .comparator
            .as_mut()
            .ok_or(PulseError::NotInitialized)?;
        comparator.compare_ticks = duty_us as u32;
        let compare_ticks = comparator.compare_ticks;

        if let Some(waveform) = self.waveform.as_mut() {
            waveform.set_duty_us(compare_ticks as f64, Instant::now());
        }

        debug!("Duty set: {:.1} µs ({} ticks)", duty_us, compare_ticks);
        self.duty_us = duty_us;
        Ok(())
    }

    fn duty_us(&self) -> f64 {
        self.duty_us
    }

    #[allow(unused_variables, unused_assignments)]
    fn shutdown(&mut self) -> Result<(), PulseError> {
        info!("Shutting down simulation pulse driver");

        // Release in dependency order; every step tolerates an
        // already-released handle.
        if self.generator.take().is_some() {
            debug!("Generator released");
        }
        if self.comparator.take().is_some() {
            debug!("Comparator released");
        }
        if self.operator.take().is_some() {
            debug!("Operator released");
        }
        if let Some(mut timer) = self.timer.take() {
            timer.running = false;
            debug!("Timer stopped and released");
        }

        self.waveform = None;
        self.initialized = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn init_driver() -> SimulationDriver {
        let mut driver = SimulationDriver::new();
        driver.init(&PulseChannelConfig::default()).unwrap();
        driver
    }

    #[test]
    fn init_allocates_resource_chain() {
        let driver = init_driver();
        assert!(driver.timer.is_some());
        assert!(driver.operator.is_some());
        assert!(driver.comparator.is_some());
        assert!(driver.generator.is_some());
        assert!(driver.timer.as_ref().unwrap().running);
        assert!(driver.operator.as_ref().unwrap().connected);
    }

    #[test]
    fn init_rejects_invalid_config() {
        let mut driver = SimulationDriver::new();
        let config = PulseChannelConfig {
            signal_pin: 17,
            frequency_hz: 0,
            resolution_hz: 1_000_000,
        };
        assert!(matches!(
            driver.init(&config),
            Err(PulseError::InitFailed(_))
        ));
        assert!(!driver.initialized);
    }

    #[test]
    fn duty_before_init_fails() {
        let mut driver = SimulationDriver::new();
        assert!(matches!(
            driver.set_duty_us(1500.0),
            Err(PulseError::NotInitialized)
        ));
    }

    #[test]
    fn duty_truncates_to_whole_ticks() {
        let mut driver = init_driver();
        driver.set_duty_us(1500.7).unwrap();
        assert_eq!(driver.comparator.as_ref().unwrap().compare_ticks, 1500);
        assert_eq!(driver.duty_us(), 1500.7);
    }

    #[test]
    fn negative_duty_is_a_hardware_fault() {
        let mut driver = init_driver();
        assert!(matches!(
            driver.set_duty_us(-1.0),
            Err(PulseError::HardwareFault(_))
        ));
    }

    #[test]
    fn emitted_duty_lags_one_period() {
        let mut driver = init_driver();
        let now = Instant::now();
        driver.set_duty_us(1500.0).unwrap();

        // The latch takes effect one period after the write.
        let later = now + Duration::from_micros(40_000);
        assert_eq!(driver.emitted_duty_us(later), 1500.0);
    }

    #[test]
    fn shutdown_releases_everything_and_is_idempotent() {
        let mut driver = init_driver();
        driver.set_duty_us(700.0).unwrap();

        driver.shutdown().unwrap();
        assert!(driver.timer.is_none());
        assert!(driver.operator.is_none());
        assert!(driver.comparator.is_none());
        assert!(driver.generator.is_none());

        // Second shutdown on released handles is a no-op.
        driver.shutdown().unwrap();

        assert!(matches!(
            driver.set_duty_us(700.0),
            Err(PulseError::NotInitialized)
        ));
    }

    #[test]
    fn reinit_after_shutdown() {
        let mut driver = init_driver();
        driver.shutdown().unwrap();
        driver.init(&PulseChannelConfig::default()).unwrap();
        driver.set_duty_us(500.0).unwrap();
        assert_eq!(driver.duty_us(), 500.0);
    }
}
