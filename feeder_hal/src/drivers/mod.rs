//! Pulse driver implementations.
//!
//! This module contains all pulse driver implementations:
//!
//! - [`simulation`] - Software emulation of the timer/comparator chain for
//!   development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `PulseDriver` trait from `feeder_common::pulse::driver`
//! 3. Register the driver in `register_all_drivers()`

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers into the given registry.
///
/// Called once at startup before any drivers are requested.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::create_driver);

    // Hardware backends (MCPWM peripherals, expansion boards) plug in here.
}
