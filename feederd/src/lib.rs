//! # Feeder Daemon Library
//!
//! Command listener, dispatch glue and link gate for the feeder daemon.
//!
//! The listener accepts one TCP connection at a time, reads a single
//! buffer of command bytes and dispatches each valid digit to a
//! [`server::CommandHandler`]. The daemon wires that seam to the
//! [`feeder_hal::ServoController`] via [`dispatch::ServoCommandHandler`].
//!
//! # Module Structure
//!
//! - [`server`] - TCP command listener and handler trait
//! - [`dispatch`] - Digit-to-actuation glue and response formatting
//! - [`link`] - Link readiness interface

#![deny(warnings)]
#![deny(missing_docs)]

pub mod dispatch;
pub mod link;
pub mod server;

// Re-export key types for convenience
pub use crate::dispatch::ServoCommandHandler;
pub use crate::server::{CommandHandler, CommandServer, ServerError};
