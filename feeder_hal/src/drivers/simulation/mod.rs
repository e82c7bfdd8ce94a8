//! Simulation driver module.
//!
//! This module provides a software emulation of the pulse output for
//! development and testing without physical hardware.

mod driver;
mod waveform;

pub use driver::SimulationDriver;
pub use waveform::Waveform;

use feeder_common::pulse::driver::PulseDriver;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn PulseDriver> {
    Box::new(SimulationDriver::new())
}
