//! Game clock with pause accounting.
//!
//! All gameplay timestamps are *game seconds*: wall-clock seconds measured
//! from a mutable origin. Pausing never stops a clock. On resume the paused
//! span is added to the origin, so every elapsed-time computation (weapon
//! cadence, attack duration, charger cooldown, spawn minute) continues as
//! if the pause never happened.

use serde::{Deserialize, Serialize};

/// Wall-clock based game timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    /// Wall-clock time corresponding to game time zero.
    origin: f64,
    /// Wall-clock time the current pause began.
    pause_start: Option<f64>,
    /// Total accumulated paused time in seconds.
    total_paused_time: f64,
}

impl GameClock {
    /// Create a clock whose game time starts at `now`.
    #[must_use]
    pub fn new(now: f64) -> Self {
        Self {
            origin: now,
            pause_start: None,
            total_paused_time: 0.0,
        }
    }

    /// Restart game time at `now` (e.g., when starting a new game).
    pub fn reset(&mut self, now: f64) {
        self.origin = now;
        self.pause_start = None;
        self.total_paused_time = 0.0;
    }

    /// Wall-clock time corresponding to game time zero.
    #[must_use]
    pub fn origin(&self) -> f64 {
        self.origin
    }

    /// Game seconds elapsed at wall-clock time `now`.
    ///
    /// While paused this stays frozen at the moment the pause began.
    #[must_use]
    pub fn elapsed(&self, now: f64) -> f64 {
        let reference = self.pause_start.unwrap_or(now);
        (reference - self.origin).max(0.0)
    }

    /// Whole game minutes elapsed at `now`.
    #[must_use]
    pub fn minute(&self, now: f64) -> u32 {
        (self.elapsed(now) / 60.0).floor() as u32
    }

    /// Check if the clock is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pause_start.is_some()
    }

    /// Begin a pause at `now`. Nested calls keep the first start time.
    pub fn begin_pause(&mut self, now: f64) {
        if self.pause_start.is_none() {
            self.pause_start = Some(now);
        }
    }

    /// End the current pause at `now`, shifting the origin forward by the
    /// paused span. Returns the span, or 0.0 if the clock was not paused.
    pub fn end_pause(&mut self, now: f64) -> f64 {
        let Some(start) = self.pause_start.take() else {
            return 0.0;
        };
        let span = (now - start).max(0.0);
        self.origin += span;
        self.total_paused_time += span;
        span
    }

    /// Total paused time in seconds, including a pause still in progress.
    #[must_use]
    pub fn total_paused_time(&self, now: f64) -> f64 {
        let current = self.pause_start.map_or(0.0, |s| (now - s).max(0.0));
        self.total_paused_time + current
    }
}
