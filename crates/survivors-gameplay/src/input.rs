//! Input snapshot consumed by the simulation.
//!
//! Device polling happens outside the core. Each frame the caller hands in
//! an [`InputState`] of boolean "pressed" signals; menus and the pause key
//! react to rising edges computed by [`InputTracker`].

use serde::{Deserialize, Serialize};
use survivors_common::{normalize, Vec2};

/// Buttons held during one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputState {
    /// Move up / menu up
    pub up: bool,
    /// Move down / menu down
    pub down: bool,
    /// Move left
    pub left: bool,
    /// Move right
    pub right: bool,
    /// Start, confirm a menu choice, restart
    pub confirm: bool,
    /// Toggle pause
    pub pause: bool,
}

impl InputState {
    /// Normalized movement direction from the axis buttons.
    ///
    /// Opposing buttons cancel out, giving the zero vector.
    #[must_use]
    pub fn movement(&self) -> Vec2 {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if self.right {
            dx += 1.0;
        }
        if self.left {
            dx -= 1.0;
        }
        if self.up {
            dy -= 1.0;
        }
        if self.down {
            dy += 1.0;
        }
        normalize(dx, dy)
    }
}

/// Tracks the previous frame to report buttons that were just pressed.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    previous: InputState,
}

impl InputTracker {
    /// Create a tracker with every button released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the buttons that went from released to held this frame.
    pub fn pressed(&mut self, current: &InputState) -> InputState {
        let prev = self.previous;
        self.previous = *current;
        InputState {
            up: current.up && !prev.up,
            down: current.down && !prev.down,
            left: current.left && !prev.left,
            right: current.right && !prev.right,
            confirm: current.confirm && !prev.confirm,
            pause: current.pause && !prev.pause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_diagonal_is_normalized() {
        let input = InputState {
            up: true,
            right: true,
            ..InputState::default()
        };
        let m = input.movement();
        assert!((m.length() - 1.0).abs() < 1e-6);
        assert!(m.x > 0.0 && m.y < 0.0);
    }

    #[test]
    fn test_movement_opposing_cancels() {
        let input = InputState {
            left: true,
            right: true,
            ..InputState::default()
        };
        assert_eq!(input.movement(), Vec2::ZERO);
    }

    #[test]
    fn test_tracker_reports_rising_edge_once() {
        let mut tracker = InputTracker::new();
        let held = InputState {
            pause: true,
            ..InputState::default()
        };

        assert!(tracker.pressed(&held).pause);
        assert!(!tracker.pressed(&held).pause);
        assert!(!tracker.pressed(&InputState::default()).pause);
        assert!(tracker.pressed(&held).pause);
    }
}
