//! Frame clock.
//!
//! The engine is frame-stepped: callers advance the clock once per frame
//! with the elapsed delta, and every deadline in the engine (cast
//! completion, step execution, cooldown expiry) is an absolute time on
//! this clock. Nothing blocks; "waiting" means a deadline hasn't been
//! observed to pass yet.

/// Monotonic accumulated time with per-frame delta.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    now: f64,
    delta: f32,
}

impl FrameClock {
    /// Create a clock starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one frame. Negative deltas are ignored.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.now += f64::from(dt);
            self.delta = dt;
        } else {
            self.delta = 0.0;
        }
    }

    /// Absolute accumulated time in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Delta of the most recent frame in seconds.
    #[must_use]
    pub fn delta(&self) -> f32 {
        self.delta
    }
}
