//! Cancellable cooperative countdown
//!
//! Timed waits inside equip/holster sequences are not threads: they are
//! countdowns resumed by the per-step simulation clock. The owner stores
//! an `Option<Countdown>` and cancels a pending wait by dropping it.

use serde::{Deserialize, Serialize};

/// A countdown started at a fixed duration.
///
/// The duration is captured at start and never re-read, so configuration
/// edits while a wait is pending do not affect it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    duration: f32,
    remaining: f32,
    fired: bool,
}

impl Countdown {
    /// Start a countdown. Negative durations are clamped to zero.
    pub fn start(duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            duration,
            remaining: duration,
            fired: false,
        }
    }

    /// Advance by `dt` seconds.
    ///
    /// Returns true exactly on the tick the countdown finishes; later
    /// ticks return false again. A zero-duration countdown finishes on
    /// its first tick.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.fired {
            return false;
        }
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
        if self.remaining <= 0.0 {
            self.fired = true;
            true
        } else {
            false
        }
    }

    /// Check if the countdown has run out.
    pub fn finished(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Seconds left.
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Total duration the countdown was started with.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Completion fraction in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            1.0 - self.remaining / self.duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finishes_exactly_once() {
        let mut timer = Countdown::start(0.4);

        assert!(!timer.tick(0.2));
        assert!(!timer.finished());
        assert!(timer.tick(0.25));
        assert!(timer.finished());
        assert!(!timer.tick(0.1));
    }

    #[test]
    fn test_zero_duration_starts_finished() {
        let timer = Countdown::start(0.0);
        assert!(timer.finished());
        assert_eq!(timer.progress(), 1.0);
    }

    #[test]
    fn test_zero_duration_fires_on_first_tick() {
        let mut timer = Countdown::start(0.0);
        assert!(timer.tick(0.1));
        assert!(!timer.tick(0.1));
    }

    #[test]
    fn test_negative_duration_clamps() {
        let timer = Countdown::start(-1.0);
        assert!(timer.finished());
    }

    #[test]
    fn test_progress() {
        let mut timer = Countdown::start(1.0);
        timer.tick(0.25);
        assert!((timer.progress() - 0.25).abs() < 1e-6);
        assert!((timer.remaining() - 0.75).abs() < 1e-6);
    }
}
