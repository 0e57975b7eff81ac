//! Logical timers for the three periodic activities
//!
//! Time only advances through [`SimClock::advance`], which the tick driver
//! calls while the session is running. Pausing simply stops calling it.

use crate::tuning::Tuning;

/// A repeating timer in logical milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    interval_ms: u32,
    elapsed_ms: u32,
    armed: bool,
}

impl Timer {
    /// A disarmed timer
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            elapsed_ms: 0,
            armed: false,
        }
    }

    #[inline]
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Milliseconds until the next firing, if armed (always >= 1)
    pub fn due_in(&self) -> Option<u32> {
        self.armed
            .then(|| self.interval_ms.saturating_sub(self.elapsed_ms).max(1))
    }

    pub fn advance(&mut self, ms: u32) {
        if self.armed {
            self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
        }
    }

    /// Consume one period if due
    pub fn fire(&mut self) -> bool {
        if self.armed && self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms -= self.interval_ms;
            true
        } else {
            false
        }
    }

    /// Change the period without losing accumulated time
    pub fn set_interval(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms.max(1);
    }

    /// Keep accumulated time and start counting
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Start a fresh period
    pub fn restart(&mut self) {
        self.elapsed_ms = 0;
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.elapsed_ms = 0;
        self.armed = false;
    }
}

/// Physics, paddle and gravity timers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    pub physics: Timer,
    pub paddle: Timer,
    pub gravity: Timer,
}

impl SimClock {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            physics: Timer::new(tuning.physics_tick_ms),
            paddle: Timer::new(tuning.paddle_tick_ms),
            gravity: Timer::new(tuning.initial_drop_ms),
        }
    }

    /// Milliseconds until the earliest armed timer, or `extra`, fires
    pub fn next_due(&self, extra: Option<u32>) -> Option<u32> {
        [
            self.physics.due_in(),
            self.paddle.due_in(),
            self.gravity.due_in(),
            extra,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn advance(&mut self, ms: u32) {
        self.physics.advance(ms);
        self.paddle.advance(ms);
        self.gravity.advance(ms);
    }

    pub fn cancel_all(&mut self) {
        self.physics.disarm();
        self.paddle.disarm();
        self.gravity.disarm();
    }
}
