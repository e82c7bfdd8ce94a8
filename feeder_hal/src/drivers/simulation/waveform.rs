//! Periodic waveform model with period-boundary duty latching.
//!
//! Models the output of a timer/comparator pair: a fixed-period signal,
//! high from the start of each period until the compare value elapses.
//! A duty written mid-period is held pending and becomes active at the
//! next period boundary, so a transient value is never emitted for less
//! than one full period.

use std::time::Instant;

/// Duty value waiting for the next period boundary.
#[derive(Debug, Clone, Copy)]
struct PendingDuty {
    duty_us: f64,
    applies_at_period: u64,
}

/// Emulated periodic waveform.
#[derive(Debug)]
pub struct Waveform {
    /// Period length [µs].
    period_us: f64,
    /// Timer start reference.
    epoch: Instant,
    /// Duty active in the current period [µs].
    active_duty_us: f64,
    /// Duty latched for the next boundary, if any.
    pending: Option<PendingDuty>,
}

impl Waveform {
    /// Create a waveform starting at `now` with duty 0.
    pub fn new(period_us: f64, now: Instant) -> Self {
        Self {
            period_us,
            epoch: now,
            active_duty_us: 0.0,
            pending: None,
        }
    }

    /// Index of the period containing `now`.
    pub fn period_index(&self, now: Instant) -> u64 {
        let elapsed_us = now.duration_since(self.epoch).as_secs_f64() * 1_000_000.0;
        (elapsed_us / self.period_us) as u64
    }

    /// Latch a new duty value; it becomes active at the next period
    /// boundary. A second write within the same period replaces the
    /// pending value before it was ever emitted.
    pub fn set_duty_us(&mut self, duty_us: f64, now: Instant) {
        self.commit_elapsed(now);
        self.pending = Some(PendingDuty {
            duty_us,
            applies_at_period: self.period_index(now) + 1,
        });
    }

    /// Duty active in the period containing `now` [µs].
    pub fn duty_at(&mut self, now: Instant) -> f64 {
        self.commit_elapsed(now);
        self.active_duty_us
    }

    /// Signal level at `now`: high while the in-period phase is below the
    /// active duty.
    pub fn is_high(&mut self, now: Instant) -> bool {
        self.commit_elapsed(now);
        let elapsed_us = now.duration_since(self.epoch).as_secs_f64() * 1_000_000.0;
        let phase_us = elapsed_us % self.period_us;
        phase_us < self.active_duty_us
    }

    /// Apply a pending duty whose boundary has been crossed.
    fn commit_elapsed(&mut self, now: Instant) {
        if let Some(pending) = self.pending {
            if self.period_index(now) >= pending.applies_at_period {
                self.active_duty_us = pending.duty_us;
                self.pending = None;
            }
        }
    }
}
