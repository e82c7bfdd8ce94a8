//! # Feeder HAL Library
//!
//! Pulse generation backends and the servo controller.
//!
//! Drivers implement the `PulseDriver` trait defined in
//! `feeder_common::pulse::driver`. The `ServoController` owns exactly one
//! driver instance and is the only component allowed to write duty values.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Pulse driver implementations
//! - [`servo`] - ServoController, angle clamping and blocking auto-home
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     feeder_hal                             │
//! │  ┌──────────────────┐       ┌─────────────────────┐        │
//! │  │  ServoController │──────►│  Driver Registry    │        │
//! │  │  (clamp, home)   │       │                     │        │
//! │  └────────┬─────────┘       └─────────────────────┘        │
//! │           │                                                │
//! │           ▼                                                │
//! │  ┌────────────────┐                                        │
//! │  │  PulseDriver   │ (trait object)                         │
//! │  │  trait         │                                        │
//! │  └────────────────┘                                        │
//! └────────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;
pub mod servo;

// Re-export key types for convenience
pub use crate::driver_registry::DriverRegistry;
pub use crate::servo::{ActuatorState, ServoController};
