//! Monster spawn tables and spawn placement.
//!
//! Spawn tables are read-only data describing which monsters appear during
//! which elapsed minutes. They are stored as RON:
//!
//! ```ron
//! (rows: [
//!     (image: "bat", kind: Chaser, speed: 2, health: 10, damage: 5,
//!      xp_value: 2, minutes: (0, 30)),
//! ])
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use survivors_common::{Rect, SurvivorsError, SurvivorsResult, Vec2};
use tracing::{info, warn};

use crate::constants::MONSTER_HALF_SIZE;
use crate::monster::MonsterKind;
use crate::render::ScreenCoords;

/// Default spawn table file name.
pub const SPAWN_TABLE_FILE: &str = "spawns.ron";

/// Ranged attack stats carried by boss rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossAttack {
    /// Damage per projectile
    pub damage: i32,
    /// Projectile speed in unit steps per tick
    pub speed: u32,
    /// Seconds between volleys
    pub frequency: f64,
}

fn default_half_size() -> Vec2 {
    Vec2::new(MONSTER_HALF_SIZE, MONSTER_HALF_SIZE)
}

/// One monster type and the minutes it appears in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRow {
    /// Base sprite name
    pub image: String,
    /// Behaviour variant
    #[serde(default)]
    pub kind: MonsterKind,
    /// Unit steps per tick
    pub speed: u32,
    /// Starting health
    pub health: i32,
    /// Contact damage dealt to the player
    pub damage: i32,
    /// XP dropped when killed
    pub xp_value: u32,
    /// Sprite sub directory
    #[serde(default)]
    pub image_dir: String,
    /// Inclusive range of elapsed minutes this row spawns in
    pub minutes: (u32, u32),
    /// Hitbox half-extents
    #[serde(default = "default_half_size")]
    pub half_size: Vec2,
    /// Spawn at most once per game
    #[serde(default)]
    pub unique: bool,
    /// Ranged attack stats (bosses only)
    #[serde(default)]
    pub attack: Option<BossAttack>,
}

impl SpawnRow {
    /// Check if this row spawns during `minute`.
    #[must_use]
    pub fn active_in(&self, minute: u32) -> bool {
        (self.minutes.0..=self.minutes.1).contains(&minute)
    }
}

/// All spawnable monster rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnTable {
    /// Rows in spawn order
    pub rows: Vec<SpawnRow>,
}

impl Default for SpawnTable {
    fn default() -> Self {
        let row = |image: &str, kind, speed, health, damage, xp_value, minutes| SpawnRow {
            image: image.to_string(),
            kind,
            speed,
            health,
            damage,
            xp_value,
            image_dir: String::new(),
            minutes,
            half_size: default_half_size(),
            unique: false,
            attack: None,
        };

        let mut lich = row("lich", MonsterKind::Boss, 1, 2000, 50, 500, (10, 10));
        lich.unique = true;
        lich.half_size = Vec2::new(32.0, 40.0);
        lich.attack = Some(BossAttack {
            damage: 20,
            speed: 3,
            frequency: 2.0,
        });

        Self {
            rows: vec![
                row("bat", MonsterKind::Chaser, 2, 10, 5, 2, (0, 30)),
                row("boar", MonsterKind::Charger, 4, 20, 15, 8, (1, 30)),
                row("skeleton", MonsterKind::Chaser, 1, 30, 10, 5, (2, 30)),
                row("ogre", MonsterKind::Chaser, 1, 200, 30, 60, (5, 30)),
                lich,
            ],
        }
    }
}

impl SpawnTable {
    /// Parse and validate a spawn table from a RON document.
    pub fn from_ron_str(contents: &str) -> SurvivorsResult<Self> {
        let table: Self =
            ron::from_str(contents).map_err(|e| SurvivorsError::SpawnTable(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    /// Load and validate a spawn table from a path.
    pub fn load(path: impl AsRef<Path>) -> SurvivorsResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load a spawn table, falling back to the built-in table on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No spawn table at {}, using built-in table", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(table) => {
                info!("Loaded {} spawn rows from {}", table.rows.len(), path.display());
                table
            },
            Err(e) => {
                warn!("Failed to load spawn table {}: {}", path.display(), e);
                Self::default()
            },
        }
    }

    /// Check every row for values the simulation cannot run with.
    pub fn validate(&self) -> SurvivorsResult<()> {
        for row in &self.rows {
            if row.minutes.0 > row.minutes.1 {
                return Err(SurvivorsError::InvalidData(format!(
                    "spawn row '{}' has minutes {:?} out of order",
                    row.image, row.minutes
                )));
            }
            if row.health <= 0 {
                return Err(SurvivorsError::InvalidData(format!(
                    "spawn row '{}' needs positive health",
                    row.image
                )));
            }
        }
        Ok(())
    }

    /// Rows (with their index) that spawn during `minute`.
    pub fn rows_for_minute(&self, minute: u32) -> impl Iterator<Item = (usize, &SpawnRow)> {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, row)| row.active_in(minute))
    }
}

/// Tick counter gating spawn batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnTimer {
    timer: u32,
}

impl SpawnTimer {
    /// Create a timer at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks counted since the last batch.
    #[must_use]
    pub fn ticks(&self) -> u32 {
        self.timer
    }

    /// Counts one tick. Returns true (and restarts) once `rate` ticks have
    /// passed since the last batch.
    pub fn tick(&mut self, rate: u32) -> bool {
        self.timer += 1;
        if self.timer >= rate {
            self.timer = 0;
            true
        } else {
            false
        }
    }
}

/// Picks a spawn point just outside the visible screen.
///
/// One of the four screen edges is chosen uniformly, then a uniform point
/// along it, pushed `distance` outwards and clamped to `bounds`.
pub fn spawn_position(
    screen: &ScreenCoords,
    bounds: Rect,
    distance: f32,
    rng: &mut fastrand::Rng,
) -> Vec2 {
    let along_x = screen.left + rng.f32() * (screen.right - screen.left);
    let along_y = screen.top + rng.f32() * (screen.bottom - screen.top);

    let (x, y) = match rng.u8(0..4) {
        0 => (screen.left - distance, along_y),
        1 => (along_x, screen.top - distance),
        2 => (screen.right + distance, along_y),
        _ => (along_x, screen.bottom + distance),
    };

    Vec2::new(
        x.clamp(bounds.min_x, bounds.max_x),
        y.clamp(bounds.min_y, bounds.max_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let table = SpawnTable::default();
        assert!(table.validate().is_ok());
        assert!(table.rows.iter().any(|r| r.kind == MonsterKind::Charger));
        assert!(table.rows.iter().any(|r| r.unique && r.attack.is_some()));
    }

    #[test]
    fn test_from_ron_with_defaults() {
        let text = r#"(rows: [
            (image: "bat", speed: 2, health: 10, damage: 5, xp_value: 2, minutes: (0, 3)),
            (image: "lich", kind: Boss, speed: 1, health: 900, damage: 40, xp_value: 300,
             minutes: (4, 4), unique: true,
             attack: Some((damage: 10, speed: 3, frequency: 1.5))),
        ])"#;
        let table = SpawnTable::from_ron_str(text).expect("valid spawn table");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].kind, MonsterKind::Chaser);
        assert_eq!(table.rows[0].half_size, default_half_size());
        assert_eq!(table.rows[1].attack.map(|a| a.damage), Some(10));
    }

    #[test]
    fn test_bad_ron_is_spawn_table_error() {
        let result = SpawnTable::from_ron_str("(rows: [ (image: 3) ])");
        assert!(matches!(result, Err(SurvivorsError::SpawnTable(_))));
    }

    #[test]
    fn test_inverted_minutes_rejected() {
        let text = r#"(rows: [
            (image: "bat", speed: 2, health: 10, damage: 5, xp_value: 2, minutes: (5, 1)),
        ])"#;
        assert!(matches!(
            SpawnTable::from_ron_str(text),
            Err(SurvivorsError::InvalidData(_))
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let table = SpawnTable::load_or_default("/nonexistent/spawns.ron");
        assert_eq!(table, SpawnTable::default());
    }

    #[test]
    fn test_rows_for_minute() {
        let table = SpawnTable::default();
        let at_zero: Vec<_> = table.rows_for_minute(0).map(|(_, r)| r.image.as_str()).collect();
        assert_eq!(at_zero, vec!["bat"]);
        let at_ten = table.rows_for_minute(10).count();
        assert_eq!(at_ten, 5);
    }

    #[test]
    fn test_spawn_timer_fires_every_rate_ticks() {
        let mut timer = SpawnTimer::new();
        let fired: Vec<bool> = (0..6).map(|_| timer.tick(3)).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true]);
        assert_eq!(timer.ticks(), 0);
    }

    #[test]
    fn test_spawn_position_outside_screen_inside_level() {
        let screen = ScreenCoords {
            left: 500.0,
            top: 400.0,
            right: 1524.0,
            bottom: 1168.0,
        };
        let bounds = Rect::new(0.0, 0.0, 2250.0, 1500.0);
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..200 {
            let p = spawn_position(&screen, bounds, 50.0, &mut rng);
            assert!(bounds.contains(p));
            let inside_screen =
                p.x > screen.left && p.x < screen.right && p.y > screen.top && p.y < screen.bottom;
            assert!(!inside_screen, "spawned inside the screen at {p:?}");
        }
    }

    #[test]
    fn test_spawn_position_clamped_at_level_edge() {
        let screen = ScreenCoords {
            left: 0.0,
            top: 0.0,
            right: 1024.0,
            bottom: 768.0,
        };
        let bounds = Rect::new(0.0, 0.0, 2250.0, 1500.0);
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..100 {
            let p = spawn_position(&screen, bounds, 50.0, &mut rng);
            assert!(p.x >= 0.0 && p.y >= 0.0);
        }
    }
}
