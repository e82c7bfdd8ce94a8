//! Feeder Common Library
//!
//! This crate provides shared constants, configuration loading utilities
//! and the angle/pulse-width translation used by all feeder workspace crates.
//!
//! # Module Structure
//!
//! - [`angle`] - Digit-to-angle table and angle-to-pulse-width interpolation
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide constants
//! - [`pulse`] - Pulse driver trait, errors and channel configuration
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use feeder_common::angle::pulse_width_for_angle;
//! use feeder_common::consts::{MIN_PULSE_WIDTH_US, MAX_PULSE_WIDTH_US};
//!
//! let width = pulse_width_for_angle(90.0, MIN_PULSE_WIDTH_US, MAX_PULSE_WIDTH_US);
//! assert_eq!(width, 1500.0);
//! ```

pub mod angle;
pub mod config;
pub mod consts;
pub mod prelude;
pub mod pulse;
