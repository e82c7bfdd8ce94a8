//! Digit-to-angle and angle-to-pulse-width translation.
//!
//! Both functions are pure: the command table is a fixed literal and the
//! pulse-width mapping is a clamped linear interpolation. Nothing here
//! touches hardware — callers apply the resulting width through a
//! [`crate::pulse::PulseDriver`].

use crate::consts::{COMMAND_ANGLE_TABLE, MAX_ANGLE_DEG};
use thiserror::Error;

/// Error for digit-to-angle translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// Input is not a single decimal digit (0-9).
    #[error("Invalid command digit: {0}")]
    InvalidCommand(u8),
}

/// Look up the target angle for a command digit.
///
/// # Arguments
/// * `digit` - Numeric digit value 0..=9 (not the ASCII byte)
///
/// # Errors
/// Returns `TranslateError::InvalidCommand` if `digit` is greater than 9.
/// In practice the listener classifies bytes before dispatch, so this is
/// a bounds check rather than an expected path.
pub fn angle_for_digit(digit: u8) -> Result<f64, TranslateError> {
    COMMAND_ANGLE_TABLE
        .get(digit as usize)
        .copied()
        .ok_or(TranslateError::InvalidCommand(digit))
}

/// Convert an angle to a pulse width via linear interpolation.
///
/// The angle is clamped to `[0, 180]` before interpolation, so the
/// returned width always lies in `[min_us, max_us]`:
/// 0° → `min_us`, 180° → `max_us`.
pub fn pulse_width_for_angle(angle: f64, min_us: f64, max_us: f64) -> f64 {
    let angle = angle.clamp(0.0, MAX_ANGLE_DEG);
    min_us + (angle / MAX_ANGLE_DEG) * (max_us - min_us)
}

/// Clamp an angle to the commandable range `[0, 180]`.
#[inline]
pub fn clamp_angle(angle: f64) -> f64 {
    angle.clamp(0.0, MAX_ANGLE_DEG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_PULSE_WIDTH_US, MIN_PULSE_WIDTH_US};

    #[test]
    fn digit_table_exact() {
        let expected = [0.0, 18.0, 36.0, 54.0, 72.0, 90.0, 108.0, 126.0, 144.0, 180.0];
        for (digit, want) in expected.iter().enumerate() {
            assert_eq!(angle_for_digit(digit as u8).unwrap(), *want);
        }
    }

    #[test]
    fn final_step_is_enlarged() {
        // 8 → 144 follows the 18°/digit stride; 9 jumps to 180, not 162.
        assert_eq!(angle_for_digit(8).unwrap(), 144.0);
        assert_eq!(angle_for_digit(9).unwrap(), 180.0);
    }

    #[test]
    fn non_digit_rejected() {
        assert_eq!(angle_for_digit(10), Err(TranslateError::InvalidCommand(10)));
        assert_eq!(angle_for_digit(255), Err(TranslateError::InvalidCommand(255)));
    }

    #[test]
    fn pulse_width_endpoints() {
        assert_eq!(
            pulse_width_for_angle(0.0, MIN_PULSE_WIDTH_US, MAX_PULSE_WIDTH_US),
            500.0
        );
        assert_eq!(
            pulse_width_for_angle(180.0, MIN_PULSE_WIDTH_US, MAX_PULSE_WIDTH_US),
            2500.0
        );
    }

    #[test]
    fn pulse_width_linear_at_center() {
        assert_eq!(
            pulse_width_for_angle(90.0, MIN_PULSE_WIDTH_US, MAX_PULSE_WIDTH_US),
            1500.0
        );
    }

    #[test]
    fn pulse_width_clamps_out_of_range() {
        assert_eq!(
            pulse_width_for_angle(-45.0, MIN_PULSE_WIDTH_US, MAX_PULSE_WIDTH_US),
            MIN_PULSE_WIDTH_US
        );
        assert_eq!(
            pulse_width_for_angle(720.0, MIN_PULSE_WIDTH_US, MAX_PULSE_WIDTH_US),
            MAX_PULSE_WIDTH_US
        );
    }

    #[test]
    fn pulse_width_monotonic() {
        let mut last = 0.0;
        for deg in 0..=180 {
            let width = pulse_width_for_angle(deg as f64, MIN_PULSE_WIDTH_US, MAX_PULSE_WIDTH_US);
            assert!(width >= last);
            last = width;
        }
    }

    #[test]
    fn clamp_angle_bounds() {
        assert_eq!(clamp_angle(-1.0), 0.0);
        assert_eq!(clamp_angle(181.0), 180.0);
        assert_eq!(clamp_angle(42.5), 42.5);
    }
}
