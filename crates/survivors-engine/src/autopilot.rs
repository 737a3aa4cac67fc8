//! Scripted input for headless runs.
//!
//! Plays the game without a keyboard: walks a square loop, steps away
//! from monsters that come close, and taps confirm to get through menus.

use serde::{Deserialize, Serialize};
use survivors_common::Vec2;
use survivors_gameplay::prelude::*;

/// Distance at which the autopilot starts backing off from a monster.
pub const FLEE_RADIUS: f32 = 120.0;

/// Frames spent walking each side of the patrol loop.
pub const PATROL_LEG_FRAMES: u64 = 120;

/// Autopilot settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutopilotConfig {
    /// Back off from monsters closer than this
    pub flee_radius: f32,
    /// Frames per patrol leg
    pub patrol_leg_frames: u64,
    /// Start a new game after a game over
    pub restart: bool,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            flee_radius: FLEE_RADIUS,
            patrol_leg_frames: PATROL_LEG_FRAMES,
            restart: true,
        }
    }
}

/// Produces one [`InputState`] per frame from the session it observes.
#[derive(Debug, Clone)]
pub struct Autopilot {
    config: AutopilotConfig,
    frame: u64,
}

impl Autopilot {
    /// Creates an autopilot.
    #[must_use]
    pub fn new(config: AutopilotConfig) -> Self {
        Self { config, frame: 0 }
    }

    /// Frames produced so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Input for the next frame.
    ///
    /// Menu keys are only held on even frames so every tap is a fresh
    /// rising edge.
    pub fn next_input(&mut self, session: &Session) -> InputState {
        let tap = self.frame % 2 == 0;
        let mut input = InputState::default();

        match session.phase() {
            GamePhase::Menu | GamePhase::LevelUp => input.confirm = tap,
            GamePhase::GameOver => input.confirm = tap && self.config.restart,
            GamePhase::Pause => input.pause = tap,
            GamePhase::Play => self.steer(session.game(), &mut input),
        }

        self.frame += 1;
        input
    }

    fn steer(&self, game: &GameState, input: &mut InputState) {
        let position = game.player().position();
        let threat = game
            .monsters()
            .iter()
            .filter(|m| m.is_alive())
            .map(|m| m.body.position)
            .filter(|p| p.distance(position) < self.config.flee_radius)
            .min_by(|a, b| a.distance(position).total_cmp(&b.distance(position)));

        let heading = match threat {
            Some(monster) => monster.direction_to(position),
            None => self.patrol_heading(),
        };
        press_towards(heading, input);
    }

    fn patrol_heading(&self) -> Vec2 {
        let leg = self.frame / self.config.patrol_leg_frames.max(1);
        match leg % 4 {
            0 => Vec2::new(1.0, 0.0),
            1 => Vec2::new(0.0, 1.0),
            2 => Vec2::new(-1.0, 0.0),
            _ => Vec2::new(0.0, -1.0),
        }
    }
}

/// Holds the direction keys closest to `heading`.
fn press_towards(heading: Vec2, input: &mut InputState) {
    const DEADZONE: f32 = 0.3;
    input.right = heading.x > DEADZONE;
    input.left = heading.x < -DEADZONE;
    input.down = heading.y > DEADZONE;
    input.up = heading.y < -DEADZONE;
}
