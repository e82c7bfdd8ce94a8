//! Dispatch glue between the command listener and the servo controller.
//!
//! Implements the listener's handler strategy: digit → table angle →
//! blocking move with auto-home → textual acknowledgment on the same
//! connection. The handler owns the servo controller for the lifetime of
//! the serve loop, preserving the single-writer discipline on the pulse
//! driver.

use crate::server::{CommandHandler, send_response};
use feeder_common::angle::angle_for_digit;
use feeder_hal::ServoController;
use std::net::TcpStream;
use std::time::Duration;
use tracing::{error, info, warn};

/// Response sent when the actuator subsystem is absent or faulted.
pub const NOT_INITIALIZED_RESPONSE: &str = "ERROR: Servo not initialized\n";

/// Command handler driving the servo controller.
///
/// Constructed with `None` when servo initialization failed at startup:
/// the listener then keeps serving and answers every command with the
/// not-initialized error, with no physical effect.
pub struct ServoCommandHandler {
    /// Servo controller, absent after an initialization failure or fault
    servo: Option<ServoController>,
    /// Delay before the automatic return to home
    home_delay: Duration,
}

impl ServoCommandHandler {
    /// Create the handler.
    pub fn new(servo: Option<ServoController>, home_delay: Duration) -> Self {
        Self { servo, home_delay }
    }

    /// True while a working servo controller is attached.
    pub fn has_servo(&self) -> bool {
        self.servo.is_some()
    }
}

impl CommandHandler for ServoCommandHandler {
    fn handle(&mut self, digit: u8, conn: &mut TcpStream) {
        let angle = match angle_for_digit(digit) {
            Ok(angle) => angle,
            Err(e) => {
                // The listener only dispatches classified digits, so this
                // is unreachable in practice.
                warn!("Dropped command: {}", e);
                return;
            }
        };

        let Some(servo) = self.servo.as_mut() else {
            if let Err(e) = send_response(conn, NOT_INITIALIZED_RESPONSE) {
                warn!("Failed to send error response: {}", e);
            }
            return;
        };

        info!("Command {} -> angle {}°", digit, angle);

        match servo.set_angle_with_auto_home(angle, self.home_delay) {
            Ok(()) => {
                let response = format!(
                    "OK: Command {} -> Angle {}° (auto reset in {}s)\n",
                    digit,
                    angle,
                    self.home_delay.as_secs()
                );
                if let Err(e) = send_response(conn, &response) {
                    warn!("Failed to send response: {}", e);
                }
            }
            Err(e) => {
                // A failed duty write is a hardware fault: actuation
                // correctness cannot be guaranteed past this point, so the
                // controller is dropped and subsequent commands get the
                // error response while the listener keeps running.
                error!("Actuation failed: {}", e);
                if let Some(mut servo) = self.servo.take() {
                    let _ = servo.shutdown();
                }
                if let Err(e) = send_response(conn, NOT_INITIALIZED_RESPONSE) {
                    warn!("Failed to send error response: {}", e);
                }
            }
        }
    }
}

impl Drop for ServoCommandHandler {
    fn drop(&mut self) {
        if let Some(servo) = self.servo.as_mut() {
            let _ = servo.shutdown();
        }
    }
}
