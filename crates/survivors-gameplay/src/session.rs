//! Session state machine.
//!
//! ```text
//! Menu ──confirm──▶ Play ──pause──▶ Pause ──pause──▶ Play
//!                    │ ▲
//!          xp ≥ cap  │ │ choice confirmed
//!                    ▼ │
//!                   LevelUp
//!                    │
//! Play ──death/win──▶ GameOver ──confirm──▶ Play (fresh game)
//! ```
//!
//! Pause and LevelUp freeze game time through [`GameClock`]: the pause
//! start is recorded on entry and the paused span is added to the clock
//! origin on resume.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::GameClock;
use crate::config::GameConfig;
use crate::events::{EventLog, GameEvent};
use crate::game_state::{GameState, TickOutcome};
use crate::input::{InputState, InputTracker};
use crate::level_up::LevelUpMenu;
use crate::render::{Hud, Sprite};
use crate::spawn::SpawnTable;

/// Top-level phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start
    Menu,
    /// Simulation running
    Play,
    /// Paused by the player
    Pause,
    /// Level-up menu open
    LevelUp,
    /// Game finished, waiting for restart
    GameOver,
}

/// A play session: the current game plus the phase it is in.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    spawn_table: SpawnTable,
    phase: GamePhase,
    game: GameState,
    clock: GameClock,
    menu: Option<LevelUpMenu>,
    input: InputTracker,
    events: EventLog,
}

impl Session {
    /// Creates a session in the menu phase at wall-clock time `now`.
    #[must_use]
    pub fn new(config: GameConfig, spawn_table: SpawnTable, now: f64) -> Self {
        let game = GameState::new(config.clone(), spawn_table.clone());
        Self {
            config,
            spawn_table,
            phase: GamePhase::Menu,
            game,
            clock: GameClock::new(now),
            menu: None,
            input: InputTracker::new(),
            events: EventLog::default(),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// The current game.
    #[must_use]
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Mutable access to the current game.
    pub fn game_mut(&mut self) -> &mut GameState {
        &mut self.game
    }

    /// The game clock.
    #[must_use]
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// The open level-up menu, if any.
    #[must_use]
    pub fn level_up_menu(&self) -> Option<&LevelUpMenu> {
        self.menu.as_ref()
    }

    /// Takes every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.absorb(self.game.events());
        self.events.drain()
    }

    /// Draw list of the current game.
    #[must_use]
    pub fn sprites(&self) -> Vec<Sprite> {
        self.game.sprites()
    }

    /// HUD state of the current game.
    #[must_use]
    pub fn hud(&self) -> Hud {
        self.game.hud()
    }

    /// Runs one frame at wall-clock time `now` with the buttons held in
    /// `input`. Returns the phase after the frame.
    pub fn update(&mut self, now: f64, input: &InputState) -> GamePhase {
        let pressed = self.input.pressed(input);

        match self.phase {
            GamePhase::Menu => {
                if pressed.confirm {
                    self.clock.reset(now);
                    self.set_phase(GamePhase::Play);
                }
            },
            GamePhase::Play => {
                if pressed.pause {
                    self.clock.begin_pause(now);
                    self.set_phase(GamePhase::Pause);
                } else {
                    self.play(now, input);
                }
            },
            GamePhase::Pause => {
                if pressed.pause {
                    self.clock.end_pause(now);
                    self.set_phase(GamePhase::Play);
                }
            },
            GamePhase::LevelUp => {
                let outcome = self.menu.as_mut().and_then(|m| m.update(&pressed));
                if let Some(outcome) = outcome {
                    self.menu = None;
                    self.clock.end_pause(now);
                    self.game.apply_choice(outcome, self.clock.elapsed(now));
                    self.set_phase(GamePhase::Play);
                } else if self.menu.is_none() {
                    self.clock.end_pause(now);
                    self.set_phase(GamePhase::Play);
                }
            },
            GamePhase::GameOver => {
                if pressed.confirm {
                    self.restart(now);
                }
            },
        }

        self.events.absorb(self.game.events());
        self.phase
    }

    fn play(&mut self, now: f64, input: &InputState) {
        let game_time = self.clock.elapsed(now);
        match self.game.update(game_time, input) {
            TickOutcome::Continue => {},
            TickOutcome::LevelUp => {
                self.game.apply_level_up();
                let menu = self.game.level_up_menu();
                if let Some(outcome) = menu.chosen() {
                    // Nothing to offer: resolve without opening the menu
                    self.game.apply_choice(outcome, game_time);
                } else {
                    self.clock.begin_pause(now);
                    self.menu = Some(menu);
                    self.set_phase(GamePhase::LevelUp);
                }
            },
            TickOutcome::GameOver => self.set_phase(GamePhase::GameOver),
        }
    }

    /// Replaces the game with a fresh one holding only the starter weapon.
    fn restart(&mut self, now: f64) {
        let rng = self.game.fork_rng();
        self.game = GameState::with_rng(self.config.clone(), self.spawn_table.clone(), rng);
        self.menu = None;
        self.clock.reset(now);
        info!("Restarting");
        self.set_phase(GamePhase::Play);
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        info!("Phase {:?} -> {:?}", from, to);
        self.phase = to;
        self.events.publish(GameEvent::PhaseChanged { from, to });
    }
}
