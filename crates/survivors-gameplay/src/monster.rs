//! Monsters and their behaviour variants.
//!
//! Every monster shares the [`CombatEntity`] body and contact damage. The
//! variants only differ in how they steer and in what contact does:
//!
//! - **Chaser** re-aims at the player every tick and despawns on contact.
//! - **Charger** aims once at spawn, hits on contact at most once per
//!   cooldown and is removed after overshooting the level.
//! - **Boss** pursues like a chaser and carries ranged attack stats.

use serde::{Deserialize, Serialize};
use survivors_common::{EntityId, Rect, Vec2};

use crate::config::GameConfig;
use crate::entity::CombatEntity;
use crate::render::{Drawable, Sprite};
use crate::spawn::{BossAttack, SpawnRow};

/// Monster behaviour variant as named in spawn tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Pursues the player
    #[default]
    Chaser,
    /// Charges in a straight line
    Charger,
    /// Pursues the player, carries ranged attack stats
    Boss,
}

/// Per-variant state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behaviour {
    /// Pursuit
    Chaser,
    /// Straight charge with a contact cooldown
    Charger {
        /// Game time of the last hit, `None` when off cooldown
        cooldown_start: Option<f64>,
    },
    /// Pursuit plus ranged stats
    Boss {
        /// Ranged attack stats
        attack: Option<BossAttack>,
    },
}

impl Behaviour {
    /// The kind this behaviour belongs to.
    #[must_use]
    pub fn kind(&self) -> MonsterKind {
        match self {
            Self::Chaser => MonsterKind::Chaser,
            Self::Charger { .. } => MonsterKind::Charger,
            Self::Boss { .. } => MonsterKind::Boss,
        }
    }
}

/// Level-wide values monsters need during their update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonsterRules {
    /// The playable area
    pub level_bounds: Rect,
    /// Game seconds between two charger hits
    pub charger_cooldown: f64,
    /// Distance outside the level at which chargers are removed
    pub despawn_margin: f32,
}

impl MonsterRules {
    /// Build the rules from configuration.
    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            level_bounds: config.level_bounds(),
            charger_cooldown: config.charger_cooldown,
            despawn_margin: config.charger_despawn_margin,
        }
    }
}

/// A hostile creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    /// Stable identifier used by attacks to refer to this monster
    pub id: EntityId,
    /// Shared creature state
    pub body: CombatEntity,
    /// Damage dealt to the player on contact
    pub damage: i32,
    /// XP dropped when killed by damage
    pub xp_value: u32,
    /// Sprite key
    pub image: String,
    /// Variant state
    pub behaviour: Behaviour,
}

impl Monster {
    /// Spawns a monster described by `row` at `position`.
    ///
    /// Chargers fix their heading towards `player_position` here and never
    /// change it again.
    #[must_use]
    pub fn from_row(row: &SpawnRow, position: Vec2, player_position: Vec2) -> Self {
        let mut body = CombatEntity::new(position, row.speed, row.health, row.half_size);
        let behaviour = match row.kind {
            MonsterKind::Chaser => Behaviour::Chaser,
            MonsterKind::Charger => {
                body.direction = position.direction_to(player_position);
                Behaviour::Charger {
                    cooldown_start: None,
                }
            },
            MonsterKind::Boss => Behaviour::Boss { attack: row.attack },
        };
        let image = if row.image_dir.is_empty() {
            format!("monsters/{}", row.image)
        } else {
            format!("monsters/{}/{}", row.image_dir, row.image)
        };

        Self {
            id: EntityId::new(),
            body,
            damage: row.damage,
            xp_value: row.xp_value,
            image,
            behaviour,
        }
    }

    /// The behaviour variant.
    #[must_use]
    pub fn kind(&self) -> MonsterKind {
        self.behaviour.kind()
    }

    /// Check if the monster is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.body.alive
    }

    /// Check if the monster was killed by damage (and should drop loot).
    #[must_use]
    pub fn killed_by_damage(&self) -> bool {
        !self.body.alive && self.body.damage_death
    }

    /// Current hitbox.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    /// Runs one tick against the player. Returns the damage dealt to the
    /// player this tick.
    ///
    /// Movement is `speed` unit steps with a contact check before each
    /// step. A contact that despawns the monster stops the loop at once.
    pub fn update(&mut self, player: &mut CombatEntity, now: f64, rules: &MonsterRules) -> i32 {
        if !self.body.alive {
            return 0;
        }

        match self.behaviour {
            Behaviour::Chaser | Behaviour::Boss { .. } => {
                self.body.direction = self.body.position.direction_to(player.position);
            },
            Behaviour::Charger { .. } => {
                let outer = rules.level_bounds.expanded(rules.despawn_margin);
                if !outer.contains(self.body.position) {
                    self.body.alive = false;
                    return 0;
                }
            },
        }

        self.body.tick_visuals();

        let health_before = player.health;
        for _ in 0..self.body.speed {
            if self.collision(player, now, rules) {
                self.body.alive = false;
                break;
            }
            self.body.step();
        }
        health_before - player.health
    }

    /// Contact check against the player. Returns true if the monster
    /// should despawn.
    fn collision(&mut self, player: &mut CombatEntity, now: f64, rules: &MonsterRules) -> bool {
        let touching = self.rect().overlaps(&player.rect());
        match &mut self.behaviour {
            Behaviour::Chaser | Behaviour::Boss { .. } => {
                if touching {
                    player.hurt(self.damage);
                }
                touching
            },
            Behaviour::Charger { cooldown_start } => {
                if let Some(start) = *cooldown_start {
                    if now - start >= rules.charger_cooldown {
                        *cooldown_start = None;
                    }
                }
                if touching && cooldown_start.is_none() {
                    player.hurt(self.damage);
                    *cooldown_start = Some(now);
                }
                false
            },
        }
    }
}

#[cfg(test)]
impl Monster {
    /// Stationary chaser used by tests of other modules.
    pub(crate) fn test_at(position: Vec2, health: i32) -> Self {
        Self {
            id: EntityId::new(),
            body: CombatEntity::new(position, 0, health, Vec2::new(8.0, 8.0)),
            damage: 1,
            xp_value: 1,
            image: "monsters/test".to_string(),
            behaviour: Behaviour::Chaser,
        }
    }
}

impl Drawable for Monster {
    fn sprite(&self, offset_x: f32, offset_y: f32) -> Option<Sprite> {
        if !self.body.alive {
            return None;
        }
        Some(Sprite::for_body(&self.image, &self.body, offset_x, offset_y))
    }
}
