//! The running game: every live entity plus XP and progression.
//!
//! [`GameState::update`] advances one tick in a fixed order:
//!
//! 1. Player movement
//! 2. Spawn batch (every `spawn_rate` ticks)
//! 3. Sweep of dead monsters, dropping loot for kills
//! 4. Monster movement and contact damage
//! 5. Collectable pickup, then XP condensation
//! 6. Weapons (cadence, attack movement, hits)
//!
//! Removal always happens in a separate `retain` pass, never while a
//! collection is being iterated.

use ahash::AHashSet;
use survivors_common::Vec2;
use tracing::{debug, info, trace};

use crate::collectable::{condense, Collectable, Pickup};
use crate::config::GameConfig;
use crate::entity::Player;
use crate::events::{EventLog, GameEvent};
use crate::input::InputState;
use crate::level_up::{LevelUpChoice, LevelUpMenu, LevelUpOutcome};
use crate::monster::{Monster, MonsterRules};
use crate::render::{camera_offset, Drawable, Hud, ScreenCoords, Sprite};
use crate::spawn::{spawn_position, SpawnTable, SpawnTimer};
use crate::weapon::{Weapon, WeaponKind};

/// What the session should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep playing
    Continue,
    /// XP reached the cap
    LevelUp,
    /// The player died or survived until the win time
    GameOver,
}

/// All state of one game.
#[derive(Debug)]
pub struct GameState {
    config: GameConfig,
    spawn_table: SpawnTable,
    rules: MonsterRules,
    player: Player,
    monsters: Vec<Monster>,
    collectables: Vec<Collectable>,
    weapons: Vec<Weapon>,
    xp: u32,
    xp_cap: u32,
    level: u32,
    spawn_timer: SpawnTimer,
    current_time: f64,
    current_minute: u32,
    won: bool,
    unique_spawned: AHashSet<usize>,
    rng: fastrand::Rng,
    events: EventLog,
}

impl GameState {
    /// Starts a fresh game, seeding the RNG from the config if a seed is
    /// set.
    #[must_use]
    pub fn new(config: GameConfig, spawn_table: SpawnTable) -> Self {
        let rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self::with_rng(config, spawn_table, rng)
    }

    /// Starts a fresh game with the given RNG.
    ///
    /// The player starts at level 1 holding only the starter weapon.
    #[must_use]
    pub fn with_rng(config: GameConfig, spawn_table: SpawnTable, rng: fastrand::Rng) -> Self {
        let player = Player::new(&config);
        let starter = Weapon::from_config(config.starter_weapon, &config, 0.0);
        let rules = MonsterRules::from_config(&config);
        Self {
            xp_cap: config.level_cap_base,
            player,
            monsters: Vec::new(),
            collectables: Vec::new(),
            weapons: vec![starter],
            xp: 0,
            level: 1,
            spawn_timer: SpawnTimer::new(),
            current_time: 0.0,
            current_minute: 0,
            won: false,
            unique_spawned: AHashSet::new(),
            rng,
            events: EventLog::default(),
            rules,
            spawn_table,
            config,
        }
    }

    // === Accessors ===

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable access to the player.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Monsters in the level, including ones killed this tick.
    #[must_use]
    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    /// Collectables in the level.
    #[must_use]
    pub fn collectables(&self) -> &[Collectable] {
        &self.collectables
    }

    /// Owned weapons, at most one per kind.
    #[must_use]
    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    /// Owned weapon of `kind`.
    #[must_use]
    pub fn weapon(&self, kind: WeaponKind) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.kind() == kind)
    }

    /// XP towards the next level.
    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    /// XP needed for the next level.
    #[must_use]
    pub fn xp_cap(&self) -> u32 {
        self.xp_cap
    }

    /// Player level (starts at 1).
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Game seconds at the last tick.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Whole game minutes at the last tick.
    #[must_use]
    pub fn current_minute(&self) -> u32 {
        self.current_minute
    }

    /// Check if the player survived until the win time.
    #[must_use]
    pub fn won(&self) -> bool {
        self.won
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Takes all pending events.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// A new RNG derived from this game's RNG, for seeding the next game.
    pub fn fork_rng(&mut self) -> fastrand::Rng {
        self.rng.fork()
    }

    /// Grants XP directly.
    pub fn add_xp(&mut self, amount: u32) {
        self.xp += amount;
    }

    // === Tick ===

    /// Advances the game by one tick at game time `game_time`.
    pub fn update(&mut self, game_time: f64, input: &InputState) -> TickOutcome {
        self.current_time = game_time;
        self.current_minute = (game_time / 60.0).floor() as u32;

        self.player.update(input, self.config.level_bounds());
        self.spawn_monsters();
        self.sweep_monsters();
        self.update_monsters();
        self.update_collectables();
        self.condense_collectables();
        self.update_weapons();

        self.check_outcome()
    }

    fn spawn_monsters(&mut self) {
        let rate = self.config.spawn_rate_for_minute(self.current_minute);
        if !self.spawn_timer.tick(rate) {
            return;
        }

        let player_position = self.player.position();
        let screen = ScreenCoords::around(player_position, &self.config);
        let bounds = self.config.level_bounds();
        let before = self.monsters.len();

        for (index, row) in self.spawn_table.rows_for_minute(self.current_minute) {
            if row.unique && !self.unique_spawned.insert(index) {
                continue;
            }
            let position =
                spawn_position(&screen, bounds, self.config.spawn_distance, &mut self.rng);
            let monster = Monster::from_row(row, position, player_position);
            self.events.publish(GameEvent::MonsterSpawned {
                id: monster.id,
                kind: monster.kind(),
            });
            if row.unique {
                info!("{} appeared at minute {}", row.image, self.current_minute);
            }
            self.monsters.push(monster);
        }

        trace!(
            "Spawned {} monsters at minute {}",
            self.monsters.len() - before,
            self.current_minute
        );
    }

    fn sweep_monsters(&mut self) {
        let mut kills: Vec<(Vec2, u32)> = Vec::new();
        let events = &self.events;
        self.monsters.retain(|m| {
            if m.is_alive() {
                return true;
            }
            if m.killed_by_damage() {
                events.publish(GameEvent::MonsterKilled {
                    id: m.id,
                    xp_value: m.xp_value,
                });
                kills.push((m.body.position, m.xp_value));
            } else {
                events.publish(GameEvent::MonsterDespawned { id: m.id });
            }
            false
        });

        for (position, xp_value) in kills {
            self.collectables.push(Collectable::xp(position, xp_value));
            if self.rng.u32(0..100) < self.config.heal_spawn_chance {
                self.collectables
                    .push(Collectable::cake(position, self.config.heal_value));
            }
        }
    }

    fn update_monsters(&mut self) {
        for monster in &mut self.monsters {
            let dealt = monster.update(&mut self.player.body, self.current_time, &self.rules);
            if dealt > 0 {
                self.events.publish(GameEvent::PlayerHurt {
                    damage: dealt,
                    health: self.player.body.health,
                });
            }
        }
    }

    fn update_collectables(&mut self) {
        self.collectables.retain(|c| c.exists);

        let player_rect = self.player.body.rect();
        for collectable in &mut self.collectables {
            match collectable.update(&player_rect) {
                Some(Pickup::Xp(value)) => {
                    self.xp += value;
                    self.events.publish(GameEvent::XpCollected { value });
                },
                Some(Pickup::Heal(amount)) => {
                    let restored = self.player.body.heal(amount);
                    self.events.publish(GameEvent::Healed { amount: restored });
                },
                None => {},
            }
        }
    }

    /// Merges nearby XP around a random sample of drops once the pool is
    /// large enough.
    fn condense_collectables(&mut self) {
        let len = self.collectables.len();
        if len == 0 || len < self.config.condense_threshold {
            return;
        }

        let mut merged = 0;
        for _ in 0..self.config.condense_amount {
            let index = self.rng.usize(..len);
            let Some(tier) = self.collectables.get(index).map(Collectable::tier) else {
                continue;
            };
            if tier == 0 {
                continue;
            }
            let distance = self.config.condense_distance_for_tier(tier);
            merged += condense(&mut self.collectables, index, distance);
        }
        if merged > 0 {
            trace!("Condensed {} XP drops", merged);
        }
    }

    fn update_weapons(&mut self) {
        for weapon in &mut self.weapons {
            weapon.update(
                &self.player,
                &mut self.monsters,
                self.current_time,
                self.config.attack_immune_ticks,
                &mut self.rng,
            );
        }
    }

    fn check_outcome(&mut self) -> TickOutcome {
        let dead = self.player.body.health <= 0;
        if dead || self.current_minute >= self.config.win_time_minutes {
            self.won = !dead;
            info!(
                "Game over: {} at level {} after {:.1}s",
                if self.won { "won" } else { "lost" },
                self.level,
                self.current_time
            );
            self.events.publish(GameEvent::GameOver {
                won: self.won,
                level: self.level,
                time: self.current_time,
            });
            return TickOutcome::GameOver;
        }
        if self.xp >= self.xp_cap {
            return TickOutcome::LevelUp;
        }
        TickOutcome::Continue
    }

    // === Level-up ===

    /// Consumes one level's worth of XP. Overflow carries into the next
    /// level and the cap grows by the configured multiplier.
    pub fn apply_level_up(&mut self) {
        self.xp = self.xp.saturating_sub(self.xp_cap);
        self.xp_cap = (f64::from(self.xp_cap) * self.config.level_cap_multiplier).round() as u32;
        self.level += 1;
        info!("Level up: level {} (next at {} XP)", self.level, self.xp_cap);
        self.events.publish(GameEvent::LevelUp {
            level: self.level,
            xp_cap: self.xp_cap,
        });
    }

    /// Builds the level-up menu for the current weapon set.
    pub fn level_up_menu(&mut self) -> LevelUpMenu {
        LevelUpMenu::new(
            &self.weapons,
            &self.config.weapons,
            self.config.level_up_choices,
            &mut self.rng,
        )
    }

    /// Applies a resolved level-up menu. New weapons start their cadence at
    /// `game_time`.
    pub fn apply_choice(&mut self, outcome: LevelUpOutcome, game_time: f64) {
        match outcome {
            LevelUpOutcome::Heal => {
                let restored = self.player.body.heal(self.config.heal_value);
                self.events.publish(GameEvent::Healed { amount: restored });
            },
            LevelUpOutcome::Choice(LevelUpChoice::Upgrade { kind, .. }) => {
                let Some(weapon) = self.weapons.iter_mut().find(|w| w.kind() == kind) else {
                    return;
                };
                if weapon.level_up_weapon() {
                    info!("{} upgraded to level {}", kind.name(), weapon.level());
                    self.events.publish(GameEvent::WeaponUpgraded {
                        kind,
                        level: weapon.level(),
                    });
                }
            },
            LevelUpOutcome::Choice(LevelUpChoice::Acquire { kind }) => {
                if self.weapon(kind).is_some() {
                    debug!("Ignoring duplicate {}", kind.name());
                    return;
                }
                self.weapons
                    .push(Weapon::from_config(kind, &self.config, game_time));
                info!("Acquired {}", kind.name());
                self.events.publish(GameEvent::WeaponAcquired { kind });
            },
        }
    }

    // === Presentation ===

    /// Draw list in draw order: collectables, monsters, attacks, player.
    #[must_use]
    pub fn sprites(&self) -> Vec<Sprite> {
        let offset = camera_offset(self.player.position(), &self.config);
        let (ox, oy) = (offset.x, offset.y);

        let collectables = self.collectables.iter().filter_map(|c| c.sprite(ox, oy));
        let monsters = self.monsters.iter().filter_map(|m| m.sprite(ox, oy));
        let attacks = self
            .weapons
            .iter()
            .flat_map(Weapon::attacks)
            .filter_map(|a| a.sprite(ox, oy));

        collectables
            .chain(monsters)
            .chain(attacks)
            .chain(self.player.sprite(ox, oy))
            .collect()
    }

    /// Numeric HUD state.
    #[must_use]
    pub fn hud(&self) -> Hud {
        let whole_seconds = self.current_time.max(0.0).floor() as u32;
        Hud {
            xp_fraction: (self.xp as f32 / self.xp_cap.max(1) as f32).clamp(0.0, 1.0),
            health_fraction: self.player.health_fraction(),
            level: self.level,
            minutes: whole_seconds / 60,
            seconds: whole_seconds % 60,
        }
    }
}
