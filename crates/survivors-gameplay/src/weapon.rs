//! Weapons: progression tables, firing cadence and attack ownership.
//!
//! A weapon fires `quantity` attacks per cycle, `delay` seconds apart,
//! then rests for the remainder of `frequency` seconds. The cadence is
//! stored as an explicit interval sequence walked by a cursor:
//!
//! ```text
//! quantity = 3, delay = 0.2, frequency = 1.0
//! attack_interval = [0.2, 0.2, 0.2, 0.4]
//!                     ^fire ^fire ^fire ^rest (cursor wraps to 0)
//! ```

use serde::{Deserialize, Serialize};
use survivors_common::{SurvivorsError, SurvivorsResult, Vec2};
use tracing::debug;

use crate::attack::{Attack, AttackTemplate, INFINITE_PIERCE};
use crate::config::GameConfig;
use crate::entity::Player;
use crate::monster::Monster;

// ============================================================================
// Weapon kinds and stat tables
// ============================================================================

/// Every weapon the player can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Straight projectile thrown where the player is heading
    ThrownDagger,
    /// Shot at the nearest monster, passes through many
    Arrow,
    /// Homing projectile
    MagicMissile,
}

impl WeaponKind {
    /// All weapon kinds in menu order.
    pub const ALL: [Self; 3] = [Self::ThrownDagger, Self::Arrow, Self::MagicMissile];

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ThrownDagger => "Thrown Dagger",
            Self::Arrow => "Arrow",
            Self::MagicMissile => "Magic Missile",
        }
    }

    /// Sprite key of the attacks this weapon spawns.
    #[must_use]
    pub fn image(self) -> &'static str {
        match self {
            Self::ThrownDagger => "attacks/dagger",
            Self::Arrow => "attacks/arrow",
            Self::MagicMissile => "attacks/missile",
        }
    }

    /// Attack hitbox half-extents.
    #[must_use]
    pub fn attack_half_size(self) -> Vec2 {
        match self {
            Self::ThrownDagger => Vec2::new(6.0, 6.0),
            Self::Arrow => Vec2::new(8.0, 4.0),
            Self::MagicMissile => Vec2::new(8.0, 8.0),
        }
    }

    /// Built-in progression table.
    #[must_use]
    pub fn default_table(self) -> ProgressionTable {
        let row = |speed, damage, duration, pierce, quantity, frequency, description: &str| {
            WeaponStats {
                speed,
                damage,
                duration,
                pierce,
                quantity,
                frequency,
                description: description.to_string(),
            }
        };
        let rows = match self {
            Self::ThrownDagger => vec![
                row(8, 10, 1.5, 1, 1, 1.2, "Throws a dagger where you are heading."),
                row(8, 10, 1.5, 1, 2, 1.2, "Throw one more dagger."),
                row(8, 15, 1.5, 2, 2, 1.2, "Daggers hit harder and pierce one more enemy."),
                row(9, 15, 1.5, 2, 3, 1.0, "Throw one more dagger, more often."),
                row(10, 20, 1.5, 3, 4, 1.0, "Throw one more dagger that hits harder."),
            ],
            Self::Arrow => vec![
                row(10, 15, 2.0, 5, 1, 2.0, "Shoots an arrow at the nearest enemy."),
                row(10, 20, 2.0, 5, 1, 2.0, "Arrows hit harder."),
                row(10, 20, 2.0, 8, 2, 2.0, "Shoot one more arrow that pierces further."),
                row(12, 25, 2.0, 8, 2, 1.6, "Arrows fly faster, more often."),
                row(12, 30, 2.0, INFINITE_PIERCE, 3, 1.6, "Arrows pierce every enemy."),
            ],
            Self::MagicMissile => vec![
                row(4, 12, 3.0, 1, 1, 1.5, "Launches a missile that seeks enemies."),
                row(4, 12, 3.0, 1, 2, 1.5, "Launch one more missile."),
                row(5, 18, 3.0, 1, 2, 1.5, "Missiles hit harder and fly faster."),
                row(5, 18, 4.0, 2, 3, 1.5, "Launch one more missile that lasts longer."),
                row(6, 25, 4.0, 2, 4, 1.2, "Launch one more missile, more often."),
            ],
        };
        ProgressionTable(rows)
    }
}

/// Stat row for one weapon level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Attack speed in unit steps per tick
    pub speed: u32,
    /// Damage per hit
    pub damage: i32,
    /// Attack lifetime in seconds
    pub duration: f64,
    /// Hits per attack, or -1 for unlimited
    pub pierce: i32,
    /// Attacks per cycle
    pub quantity: u32,
    /// Cycle length in seconds
    pub frequency: f64,
    /// Upgrade text shown in the level-up menu
    pub description: String,
}

/// Ordered stat rows, indexed by weapon level (0-based).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressionTable(pub Vec<WeaponStats>);

impl ProgressionTable {
    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Row for `level`.
    #[must_use]
    pub fn get(&self, level: usize) -> Option<&WeaponStats> {
        self.0.get(level)
    }

    /// Check the table can drive a weapon.
    pub fn validate(&self, kind: WeaponKind) -> SurvivorsResult<()> {
        if self.is_empty() {
            return Err(SurvivorsError::InvalidData(format!(
                "{} has an empty progression table",
                kind.name()
            )));
        }
        for (level, stats) in self.0.iter().enumerate() {
            if stats.quantity == 0 {
                return Err(SurvivorsError::InvalidData(format!(
                    "{} level {level} has zero quantity",
                    kind.name()
                )));
            }
            if stats.duration <= 0.0 || stats.frequency <= 0.0 {
                return Err(SurvivorsError::InvalidData(format!(
                    "{} level {level} needs positive duration and frequency",
                    kind.name()
                )));
            }
            if stats.pierce < INFINITE_PIERCE || stats.pierce == 0 {
                return Err(SurvivorsError::InvalidData(format!(
                    "{} level {level} has pierce {}",
                    kind.name(),
                    stats.pierce
                )));
            }
        }
        Ok(())
    }
}

/// Progression tables for every weapon kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponCatalog {
    /// Thrown dagger levels
    pub thrown_dagger: ProgressionTable,
    /// Arrow levels
    pub arrow: ProgressionTable,
    /// Magic missile levels
    pub magic_missile: ProgressionTable,
}

impl Default for WeaponCatalog {
    fn default() -> Self {
        Self {
            thrown_dagger: WeaponKind::ThrownDagger.default_table(),
            arrow: WeaponKind::Arrow.default_table(),
            magic_missile: WeaponKind::MagicMissile.default_table(),
        }
    }
}

impl WeaponCatalog {
    /// Table for a weapon kind.
    #[must_use]
    pub fn table(&self, kind: WeaponKind) -> &ProgressionTable {
        match kind {
            WeaponKind::ThrownDagger => &self.thrown_dagger,
            WeaponKind::Arrow => &self.arrow,
            WeaponKind::MagicMissile => &self.magic_missile,
        }
    }

    /// Check every table.
    pub fn validate(&self) -> SurvivorsResult<()> {
        WeaponKind::ALL
            .iter()
            .try_for_each(|&kind| self.table(kind).validate(kind))
    }
}

/// Builds the cadence sequence: `quantity` copies of `delay` followed by
/// the rest time `frequency - quantity * delay` (never negative).
#[must_use]
pub fn build_attack_interval(quantity: u32, delay: f64, frequency: f64) -> Vec<f64> {
    let mut interval = vec![delay; quantity as usize];
    interval.push((frequency - f64::from(quantity) * delay).max(0.0));
    interval
}

// ============================================================================
// Weapon
// ============================================================================

/// An owned weapon and its live attacks.
#[derive(Debug, Clone)]
pub struct Weapon {
    kind: WeaponKind,
    table: ProgressionTable,
    level: usize,
    level_cap: usize,
    max_level: bool,
    stats: WeaponStats,
    attack_delay: f64,
    attack_interval: Vec<f64>,
    attack_interval_index: usize,
    starting_time: f64,
    attacks: Vec<Attack>,
}

impl Weapon {
    /// Creates a level 0 weapon whose cadence starts at game time `now`.
    ///
    /// An empty `table` falls back to the built-in table for `kind`.
    #[must_use]
    pub fn new(kind: WeaponKind, table: ProgressionTable, attack_delay: f64, now: f64) -> Self {
        let table = if table.is_empty() {
            kind.default_table()
        } else {
            table
        };
        let level_cap = table.len().saturating_sub(1);
        let stats = table.0[0].clone();
        let mut weapon = Self {
            kind,
            table,
            level: 0,
            level_cap,
            max_level: level_cap == 0,
            stats,
            attack_delay,
            attack_interval: Vec::new(),
            attack_interval_index: 0,
            starting_time: now,
            attacks: Vec::new(),
        };
        weapon.set_weapon_stats();
        weapon
    }

    /// Creates a level 0 weapon with the configured table and delay.
    #[must_use]
    pub fn from_config(kind: WeaponKind, config: &GameConfig, now: f64) -> Self {
        Self::new(
            kind,
            config.weapons.table(kind).clone(),
            config.attack_delay,
            now,
        )
    }

    /// Weapon kind.
    #[must_use]
    pub fn kind(&self) -> WeaponKind {
        self.kind
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Current level (0-based).
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Highest level.
    #[must_use]
    pub fn level_cap(&self) -> usize {
        self.level_cap
    }

    /// Check if the weapon is at its highest level.
    #[must_use]
    pub fn is_max_level(&self) -> bool {
        self.max_level
    }

    /// Stats of the current level.
    #[must_use]
    pub fn stats(&self) -> &WeaponStats {
        &self.stats
    }

    /// Stats of the next level, if any.
    #[must_use]
    pub fn next_stats(&self) -> Option<&WeaponStats> {
        self.table.get(self.level + 1)
    }

    /// The cadence sequence.
    #[must_use]
    pub fn attack_interval(&self) -> &[f64] {
        &self.attack_interval
    }

    /// Cursor into the cadence sequence.
    #[must_use]
    pub fn attack_interval_index(&self) -> usize {
        self.attack_interval_index
    }

    /// Live attacks.
    #[must_use]
    pub fn attacks(&self) -> &[Attack] {
        &self.attacks
    }

    /// Loads the current level's row and rebuilds the cadence. The cursor
    /// restarts at the beginning of a cycle.
    pub fn set_weapon_stats(&mut self) {
        if let Some(stats) = self.table.get(self.level) {
            self.stats = stats.clone();
        }
        self.attack_interval =
            build_attack_interval(self.stats.quantity, self.attack_delay, self.stats.frequency);
        self.attack_interval_index = 0;
    }

    /// Raises the level by one. Returns false (and does nothing) at the cap.
    pub fn level_up_weapon(&mut self) -> bool {
        self.set_weapon_level(self.level + 1)
    }

    /// Sets the level. Levels above the cap are rejected as a no-op and
    /// return false.
    pub fn set_weapon_level(&mut self, level: usize) -> bool {
        if level > self.level_cap {
            return false;
        }
        self.level = level;
        self.max_level = level == self.level_cap;
        self.set_weapon_stats();
        debug!("{} set to level {}", self.name(), level);
        true
    }

    /// Runs one tick: sweeps finished attacks, advances the cadence
    /// (possibly spawning one attack) and updates every live attack.
    pub fn update(
        &mut self,
        player: &Player,
        monsters: &mut [Monster],
        now: f64,
        immune_ticks: u32,
        rng: &mut fastrand::Rng,
    ) {
        self.attacks.retain(|a| a.exists);

        let wait = self
            .attack_interval
            .get(self.attack_interval_index)
            .copied()
            .unwrap_or(0.0);
        if now - self.starting_time >= wait {
            self.attack_interval_index += 1;
            self.starting_time = now;
            if self.attack_interval_index < self.attack_interval.len() {
                self.spawn_attack(player, monsters, now, rng);
            } else {
                self.attack_interval_index = 0;
            }
        }

        for attack in &mut self.attacks {
            attack.update(monsters, now, immune_ticks, rng);
        }
    }

    fn spawn_attack(
        &mut self,
        player: &Player,
        monsters: &[Monster],
        now: f64,
        rng: &mut fastrand::Rng,
    ) {
        let template = AttackTemplate {
            speed: self.stats.speed,
            damage: self.stats.damage,
            duration: self.stats.duration,
            pierce: self.stats.pierce,
            image: self.kind.image().to_string(),
            half_size: self.kind.attack_half_size(),
        };
        let origin = player.position();
        let attack = match self.kind {
            WeaponKind::ThrownDagger => {
                Attack::new(&template, origin, player.body.direction, now, rng)
            },
            WeaponKind::Arrow => Attack::aimed(&template, origin, monsters, false, now, rng),
            WeaponKind::MagicMissile => Attack::aimed(&template, origin, monsters, true, now, rng),
        };
        self.attacks.push(attack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::Guidance;
    use proptest::prelude::*;

    fn table(quantity: u32, frequency: f64, levels: usize) -> ProgressionTable {
        ProgressionTable(
            (0..levels)
                .map(|i| WeaponStats {
                    speed: 1,
                    damage: 10 + i as i32,
                    duration: 50.0,
                    pierce: 1,
                    quantity,
                    frequency,
                    description: format!("level {i}"),
                })
                .collect(),
        )
    }

    fn idle_player() -> Player {
        Player::new(&GameConfig::default())
    }

    #[test]
    fn test_attack_interval_shape() {
        let interval = build_attack_interval(3, 0.2, 1.0);
        assert_eq!(interval.len(), 4);
        let expected = [0.2, 0.2, 0.2, 0.4];
        for (got, want) in interval.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{interval:?}");
        }
    }

    #[test]
    fn test_attack_interval_rest_never_negative() {
        assert_eq!(build_attack_interval(4, 0.5, 1.0), vec![0.5, 0.5, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_one_cycle_spawns_quantity_attacks() {
        let mut rng = fastrand::Rng::with_seed(2);
        let player = idle_player();
        let mut weapon = Weapon::new(WeaponKind::ThrownDagger, table(3, 1.0, 1), 0.2, 0.0);
        assert_eq!(weapon.attack_interval().len(), 4);

        let mut spawned = 0;
        let mut wrapped = false;
        for tick in 1..=105 {
            let now = f64::from(tick) / 100.0;
            let before = weapon.attacks().len();
            weapon.update(&player, &mut [], now, 30, &mut rng);
            spawned += weapon.attacks().len() - before;
            if tick > 50 && weapon.attack_interval_index() == 0 {
                wrapped = true;
            }
        }
        assert_eq!(spawned, 3);
        assert!(wrapped);
        assert_eq!(weapon.attack_interval_index(), 0);
    }

    #[test]
    fn test_exact_cadence_timestamps() {
        let mut rng = fastrand::Rng::with_seed(2);
        let player = idle_player();
        let mut weapon = Weapon::new(WeaponKind::ThrownDagger, table(2, 1.0, 1), 0.25, 0.0);
        let mut fired_at = Vec::new();
        for tick in 1..=16 {
            let now = f64::from(tick) * 0.125;
            let before = weapon.attacks().len();
            weapon.update(&player, &mut [], now, 30, &mut rng);
            if weapon.attacks().len() > before {
                fired_at.push(now);
            }
        }
        // Two shots per second, 0.25 apart, then a 0.5 rest
        assert_eq!(fired_at, vec![0.25, 0.5, 1.25, 1.5]);
    }

    #[test]
    fn test_finished_attacks_are_swept() {
        let mut rng = fastrand::Rng::with_seed(2);
        let player = idle_player();
        let mut short = table(1, 10.0, 1);
        short.0[0].duration = 0.5;
        let mut weapon = Weapon::new(WeaponKind::ThrownDagger, short, 0.25, 0.0);
        weapon.update(&player, &mut [], 0.25, 30, &mut rng);
        assert_eq!(weapon.attacks().len(), 1);
        weapon.update(&player, &mut [], 0.75, 30, &mut rng);
        assert!(!weapon.attacks()[0].exists);
        weapon.update(&player, &mut [], 1.0, 30, &mut rng);
        assert!(weapon.attacks().is_empty());
    }

    #[test]
    fn test_level_changes_are_bounds_checked() {
        let mut weapon = Weapon::new(WeaponKind::Arrow, table(1, 1.0, 3), 0.2, 0.0);
        assert_eq!(weapon.level_cap(), 2);
        assert!(!weapon.is_max_level());

        assert!(weapon.level_up_weapon());
        assert_eq!(weapon.stats().damage, 11);
        assert!(weapon.set_weapon_level(2));
        assert!(weapon.is_max_level());
        assert_eq!(weapon.stats().damage, 12);
        assert!(weapon.next_stats().is_none());

        assert!(!weapon.level_up_weapon());
        assert!(!weapon.set_weapon_level(7));
        assert_eq!(weapon.level(), 2);

        assert!(weapon.set_weapon_level(0));
        assert!(!weapon.is_max_level());
    }

    #[test]
    fn test_level_up_rebuilds_cadence() {
        let mut levels = table(1, 1.0, 2);
        levels.0[1].quantity = 3;
        let mut weapon = Weapon::new(WeaponKind::ThrownDagger, levels, 0.2, 0.0);
        assert_eq!(weapon.attack_interval().len(), 2);
        weapon.level_up_weapon();
        assert_eq!(weapon.attack_interval().len(), 4);
        assert_eq!(weapon.attack_interval_index(), 0);
    }

    #[test]
    fn test_empty_table_uses_builtin() {
        let weapon = Weapon::new(WeaponKind::MagicMissile, ProgressionTable(Vec::new()), 0.2, 0.0);
        assert_eq!(weapon.level_cap(), 4);
    }

    #[test]
    fn test_kinds_spawn_their_guidance() {
        let mut rng = fastrand::Rng::with_seed(4);
        let player = idle_player();
        let mut monsters = vec![Monster::test_at(Vec2::new(1400.0, 750.0), 1000)];
        for kind in WeaponKind::ALL {
            let mut weapon = Weapon::new(kind, table(1, 10.0, 1), 0.25, 0.0);
            weapon.update(&player, &mut monsters, 0.25, 30, &mut rng);
            let attack = &weapon.attacks()[0];
            match kind {
                WeaponKind::ThrownDagger => {
                    assert_eq!(attack.guidance, Guidance::Straight);
                    assert!(!attack.direction.is_zero());
                },
                WeaponKind::Arrow => assert!(matches!(
                    attack.guidance,
                    Guidance::Aimed { homing: false, target: Some(_) }
                )),
                WeaponKind::MagicMissile => assert!(matches!(
                    attack.guidance,
                    Guidance::Aimed { homing: true, target: Some(_) }
                )),
            }
        }
    }

    #[test]
    fn test_catalog_validation() {
        let mut catalog = WeaponCatalog::default();
        assert!(catalog.validate().is_ok());
        catalog.arrow.0[2].quantity = 0;
        assert!(matches!(
            catalog.validate(),
            Err(SurvivorsError::InvalidData(msg)) if msg.contains("Arrow")
        ));
        catalog.arrow = ProgressionTable(Vec::new());
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_builtin_tables_have_five_levels() {
        for kind in WeaponKind::ALL {
            assert_eq!(kind.default_table().len(), 5);
        }
    }

    proptest! {
        #[test]
        fn prop_interval_has_one_rest_slot(
            quantity in 1u32..10,
            delay in 0.01f64..1.0,
            frequency in 0.1f64..10.0,
        ) {
            let interval = build_attack_interval(quantity, delay, frequency);
            prop_assert_eq!(interval.len(), quantity as usize + 1);
            prop_assert!(interval.iter().all(|&d| d >= 0.0));
            let cycle: f64 = interval.iter().sum();
            let expected = frequency.max(f64::from(quantity) * delay);
            prop_assert!((cycle - expected).abs() < 1e-9);
        }
    }
}
