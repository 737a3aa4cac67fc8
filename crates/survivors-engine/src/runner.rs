//! Fixed-rate headless loop.

use serde::{Deserialize, Serialize};
use tracing::info;

use survivors_gameplay::prelude::*;

use crate::autopilot::{Autopilot, AutopilotConfig};

/// Simulated frame rate of the headless loop.
pub const TICK_RATE: f64 = 60.0;

/// Frames run when no count is given (three game minutes).
pub const DEFAULT_TICKS: u64 = 60 * 60 * 3;

/// Level and progression of one weapon at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSummary {
    /// Display name
    pub name: String,
    /// Progression level (0-based)
    pub level: usize,
    /// Attacks in flight
    pub attacks: usize,
}

/// Totals of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunSummary {
    /// Frames simulated
    pub ticks: u64,
    /// Wall-clock seconds simulated
    pub wall_time: f64,
    /// Phase after the last frame
    pub phase: Option<GamePhase>,
    /// Game seconds elapsed in the current game
    pub game_time: f64,
    /// Player level in the current game
    pub level: u32,
    /// XP towards the next level
    pub xp: u32,
    /// Player health
    pub health: i32,
    /// Monsters spawned over every game
    pub monsters_spawned: u32,
    /// Monsters killed over every game
    pub monsters_killed: u32,
    /// Level-ups over every game
    pub level_ups: u32,
    /// Games lost
    pub deaths: u32,
    /// Games won
    pub wins: u32,
    /// Weapons held in the current game
    pub weapons: Vec<WeaponSummary>,
}

impl RunSummary {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::MonsterSpawned { .. } => self.monsters_spawned += 1,
            GameEvent::MonsterKilled { .. } => self.monsters_killed += 1,
            GameEvent::LevelUp { .. } => self.level_ups += 1,
            GameEvent::GameOver { won: true, .. } => self.wins += 1,
            GameEvent::GameOver { won: false, .. } => self.deaths += 1,
            _ => {},
        }
    }

    fn finish(&mut self, session: &Session) {
        let game = session.game();
        self.phase = Some(session.phase());
        self.game_time = game.current_time();
        self.level = game.level();
        self.xp = game.xp();
        self.health = game.player().body.health;
        self.weapons = game
            .weapons()
            .iter()
            .map(|w| WeaponSummary {
                name: w.name().to_string(),
                level: w.level(),
                attacks: w.attacks().len(),
            })
            .collect();
    }
}

/// Runs `ticks` frames of a fresh session at [`TICK_RATE`] with the
/// autopilot at the controls.
pub fn run(
    config: GameConfig,
    spawn_table: SpawnTable,
    ticks: u64,
    autopilot: AutopilotConfig,
) -> RunSummary {
    let frame = 1.0 / TICK_RATE;
    let mut session = Session::new(config, spawn_table, 0.0);
    let mut pilot = Autopilot::new(autopilot);
    let mut summary = RunSummary::default();

    info!("Running {} ticks at {} Hz", ticks, TICK_RATE);
    for tick in 0..ticks {
        let now = tick as f64 * frame;
        let input = pilot.next_input(&session);
        session.update(now, &input);
        for event in session.drain_events() {
            summary.record(&event);
        }
        summary.wall_time = now;
    }

    summary.ticks = pilot.frame();
    summary.finish(&session);
    info!(
        "Run finished: level {} after {:.1}s, {} kills",
        summary.level, summary.game_time, summary.monsters_killed
    );
    summary
}
