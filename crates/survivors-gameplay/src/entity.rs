//! Combat entities: the shared body of every creature, and the player.
//!
//! A creature moves as `speed` discrete unit steps per tick rather than a
//! single `direction * speed` jump, so collision checks run at sub-step
//! granularity and fast entities cannot tunnel through thin hitboxes.

use serde::{Deserialize, Serialize};
use survivors_common::{Rect, Vec2};

use crate::config::GameConfig;
use crate::constants::HURT_DURATION;
use crate::input::InputState;
use crate::render::{Drawable, Sprite};

/// Image key of the player sprite.
pub const PLAYER_IMAGE: &str = "player/player";

/// Horizontal facing used to pick the sprite orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing left
    Left,
    /// Facing right
    #[default]
    Right,
}

/// Moving, collidable creature with health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEntity {
    /// Center position in level coordinates
    pub position: Vec2,
    /// Unit movement direction (or zero when standing still)
    pub direction: Vec2,
    /// Unit steps per tick
    pub speed: u32,
    /// Current health
    pub health: i32,
    /// Maximum health, if the creature can be healed
    pub max_health: Option<i32>,
    /// False once health reaches zero or the creature despawns
    pub alive: bool,
    /// True only if `alive` was cleared by damage
    pub damage_death: bool,
    /// Remaining ticks of the hurt sprite
    pub hurt_frames_remaining: u32,
    /// Hitbox half-extents
    pub half_size: Vec2,
    /// Sprite orientation
    pub facing: Facing,
}

impl CombatEntity {
    /// Creates a living entity at rest.
    #[must_use]
    pub fn new(position: Vec2, speed: u32, health: i32, half_size: Vec2) -> Self {
        Self {
            position,
            direction: Vec2::ZERO,
            speed,
            health,
            max_health: None,
            alive: true,
            damage_death: false,
            hurt_frames_remaining: 0,
            half_size,
            facing: Facing::Right,
        }
    }

    /// Sets the maximum health.
    #[must_use]
    pub fn with_max_health(mut self, max_health: i32) -> Self {
        self.max_health = Some(max_health);
        self
    }

    /// Reduces health and shows the hurt sprite. Reaching zero health kills
    /// the entity and records that it died from damage.
    pub fn hurt(&mut self, damage: i32) {
        self.health -= damage;
        self.hurt_frames_remaining = HURT_DURATION;
        if self.health <= 0 && self.alive {
            self.alive = false;
            self.damage_death = true;
        }
    }

    /// Restores health up to `max_health`. Returns the amount restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health += amount;
        if let Some(max) = self.max_health {
            self.health = self.health.min(max);
        }
        self.health - before
    }

    /// Current hitbox.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.half_size)
    }

    /// Check if the hurt sprite should be shown.
    #[must_use]
    pub fn is_hurt(&self) -> bool {
        self.hurt_frames_remaining > 0
    }

    /// Advances visual state by one tick.
    pub fn tick_visuals(&mut self) {
        self.hurt_frames_remaining = self.hurt_frames_remaining.saturating_sub(1);
        if self.direction.x < 0.0 {
            self.facing = Facing::Left;
        } else if self.direction.x > 0.0 {
            self.facing = Facing::Right;
        }
    }

    /// Moves one unit step along `direction`.
    pub fn step(&mut self) {
        self.position += self.direction;
    }
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Shared creature state
    pub body: CombatEntity,
    /// Last non-zero movement direction
    pub aim: Vec2,
}

impl Player {
    /// Creates the player in the middle of the level at full health.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let center = Vec2::new(config.level_width / 2.0, config.level_height / 2.0);
        let body = CombatEntity::new(
            center,
            config.player_speed,
            config.player_health,
            config.player_half_size(),
        )
        .with_max_health(config.player_health);
        Self {
            body,
            aim: Vec2::RIGHT,
        }
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Check if the player is standing still.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.body.direction.is_zero()
    }

    /// Fraction of health remaining (0.0 - 1.0).
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        let max = self.body.max_health.unwrap_or(self.body.health).max(1);
        (self.body.health as f32 / max as f32).clamp(0.0, 1.0)
    }

    /// Runs one tick: reads the movement direction and moves within `bounds`.
    pub fn update(&mut self, input: &InputState, bounds: Rect) {
        self.body.direction = input.movement();
        if !self.body.direction.is_zero() {
            self.aim = self.body.direction;
        }
        self.body.tick_visuals();
        self.move_within(bounds);
    }

    /// Moves `speed` unit steps, clamping to the level after every step so
    /// the hitbox never leaves `bounds`, even partially.
    pub fn move_within(&mut self, bounds: Rect) {
        let half = self.body.half_size;
        for _ in 0..self.body.speed {
            self.body.step();
            let p = &mut self.body.position;
            p.x = clamp_axis(p.x, bounds.min_x + half.x, bounds.max_x - half.x);
            p.y = clamp_axis(p.y, bounds.min_y + half.y, bounds.max_y - half.y);
        }
    }
}

/// Clamps `value` to `[min, max]`. A hitbox wider than the bounds is
/// pinned to `min` instead of panicking.
fn clamp_axis(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

impl Drawable for Player {
    fn sprite(&self, offset_x: f32, offset_y: f32) -> Option<Sprite> {
        Some(Sprite::for_body(PLAYER_IMAGE, &self.body, offset_x, offset_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> CombatEntity {
        CombatEntity::new(Vec2::new(10.0, 10.0), 3, 20, Vec2::new(4.0, 4.0))
    }

    #[test]
    fn test_hurt_kills_at_zero() {
        let mut e = body();
        e.hurt(5);
        assert!(e.alive);
        assert!(e.is_hurt());
        assert_eq!(e.hurt_frames_remaining, HURT_DURATION);

        e.hurt(15);
        assert!(!e.alive);
        assert!(e.damage_death);
        assert_eq!(e.health, 0);
    }

    #[test]
    fn test_despawn_is_not_damage_death() {
        let mut e = body();
        e.alive = false;
        e.hurt(100);
        assert!(!e.damage_death);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut e = body().with_max_health(25);
        e.hurt(10);
        assert_eq!(e.heal(20), 10);
        assert_eq!(e.health, 25);
    }

    #[test]
    fn test_tick_visuals_facing_and_hurt_timer() {
        let mut e = body();
        e.hurt(1);
        e.direction = Vec2::new(-1.0, 0.0);
        e.tick_visuals();
        assert_eq!(e.facing, Facing::Left);
        e.tick_visuals();
        assert!(!e.is_hurt());

        // Vertical movement keeps the previous facing
        e.direction = Vec2::new(0.0, 1.0);
        e.tick_visuals();
        assert_eq!(e.facing, Facing::Left);
    }

    #[test]
    fn test_player_starts_centered() {
        let config = GameConfig::default();
        let player = Player::new(&config);
        assert_eq!(player.position(), Vec2::new(1125.0, 750.0));
        assert_eq!(player.body.max_health, Some(config.player_health));
        assert!(player.is_idle());
    }

    #[test]
    fn test_player_moves_speed_steps() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        let input = InputState {
            right: true,
            ..InputState::default()
        };
        player.update(&input, config.level_bounds());
        assert_eq!(player.position(), Vec2::new(1130.0, 750.0));
        assert_eq!(player.aim, Vec2::RIGHT);
    }

    #[test]
    fn test_player_clamped_every_step() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.body.position = Vec2::new(18.0, 33.0);
        let input = InputState {
            left: true,
            up: true,
            ..InputState::default()
        };
        player.update(&input, config.level_bounds());
        assert_eq!(player.position().x, config.player_half_width);
        assert_eq!(player.position().y, config.player_half_height);
        assert!(player.aim.x < 0.0 && player.aim.y < 0.0);
    }

    #[test]
    fn test_idle_keeps_aim() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        let left = InputState {
            left: true,
            ..InputState::default()
        };
        player.update(&left, config.level_bounds());
        player.update(&InputState::default(), config.level_bounds());
        assert!(player.is_idle());
        assert_eq!(player.aim, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_hitbox_wider_than_level_does_not_panic() {
        let config = GameConfig {
            player_half_width: 2000.0,
            ..GameConfig::default()
        };
        let mut player = Player::new(&config);
        let right = InputState {
            right: true,
            ..InputState::default()
        };
        player.update(&right, config.level_bounds());
        assert_eq!(player.position().x, 2000.0);
        assert_eq!(player.position().y, 750.0);
    }
}
