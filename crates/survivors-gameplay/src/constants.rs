//! Default tuning values. Every one of these can be overridden through
//! [`GameConfig`](crate::config::GameConfig).

/// Width of the visible window in pixels.
pub const WIDTH: f32 = 1024.0;
/// Height of the visible window in pixels.
pub const HEIGHT: f32 = 768.0;

/// Width of the level in pixels.
pub const LEVEL_W: f32 = 2250.0;
/// Height of the level in pixels.
pub const LEVEL_H: f32 = 1500.0;

/// Player hitbox half-width, also the clamp margin at the level edge.
pub const PLAYER_HALF_W: f32 = 16.0;
/// Player hitbox half-height, also the clamp margin at the level edge.
pub const PLAYER_HALF_H: f32 = 32.0;
/// Player speed in unit steps per tick.
pub const PLAYER_SPEED: u32 = 5;
/// Player starting (and maximum) health.
pub const PLAYER_HEALTH: i32 = 200;

/// Ticks an entity shows its hurt sprite after taking damage.
pub const HURT_DURATION: u32 = 2;
/// Game seconds a charger waits before it can damage the player again.
pub const HURT_COOLDOWN: f64 = 10.0;
/// Chargers further than this outside the level are removed.
pub const CHARGER_DESPAWN_MARGIN: f32 = 100.0;

/// Ticks between spawn batches, indexed by elapsed minute.
/// Minutes past the end use the last entry.
pub const SPAWN_RATE: [u32; 8] = [20, 20, 15, 15, 10, 10, 5, 5];
/// How far outside the visible screen monsters appear.
pub const SPAWN_DISTANCE: f32 = 50.0;
/// Default monster hitbox half-size.
pub const MONSTER_HALF_SIZE: f32 = 16.0;

/// Seconds between consecutive shots inside one volley.
pub const ATTACK_DELAY: f64 = 0.2;
/// Ticks during which an attack cannot hit the monster it last hit.
pub const ATTACK_IMMUNE: u32 = 30;

/// Collectable count at which XP condensation starts.
pub const CONDENSE_THRESHOLD: usize = 50;
/// Number of collectables sampled for condensation per tick.
pub const CONDENSE_AMOUNT: usize = 10;
/// Condensation search distance for XP tiers 1, 2 and 3.
pub const CONDENSE_DISTANCE: [f32; 3] = [20.0, 40.0, 60.0];
/// XP below this value shows as tier 1.
pub const XP_TIER_2: u32 = 10;
/// XP below this value (and not tier 1) shows as tier 2.
pub const XP_TIER_3: u32 = 50;
/// Collectable hitbox half-size.
pub const COLLECTABLE_HALF_SIZE: f32 = 8.0;

/// Health restored by a cake or by the level-up heal outcome.
pub const HEAL_VALUE: i32 = 20;
/// Percent chance that a killed monster also drops a cake.
pub const HEAL_SPAWN_CHANCE: u32 = 1;

/// XP required for the first level-up.
pub const LEVEL_CAP_BASE: u32 = 20;
/// Growth of the XP cap per level.
pub const LEVEL_CAP_MULTIPLIER: f64 = 1.1;
/// Maximum number of options offered by the level-up menu.
pub const LEVEL_UP_CHOICES_COUNT: usize = 3;

/// Minutes the player must survive to win.
pub const WIN_TIME_MINUTES: u32 = 30;
