//! Game configuration.
//!
//! Provides the tunable parameters of the simulation. Configuration is read
//! from a TOML file; every field is optional and falls back to the values in
//! [`crate::constants`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use survivors_common::{Rect, SurvivorsError, SurvivorsResult, Vec2};
use tracing::{info, warn};

use crate::constants::{
    ATTACK_DELAY, ATTACK_IMMUNE, CHARGER_DESPAWN_MARGIN, CONDENSE_AMOUNT, CONDENSE_DISTANCE,
    CONDENSE_THRESHOLD, HEAL_SPAWN_CHANCE, HEAL_VALUE, HEIGHT, HURT_COOLDOWN, LEVEL_CAP_BASE,
    LEVEL_CAP_MULTIPLIER, LEVEL_H, LEVEL_UP_CHOICES_COUNT, LEVEL_W, PLAYER_HALF_H, PLAYER_HALF_W,
    PLAYER_HEALTH, PLAYER_SPEED, SPAWN_DISTANCE, SPAWN_RATE, WIDTH, WIN_TIME_MINUTES,
};
use crate::weapon::{WeaponCatalog, WeaponKind};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "survivors.toml";

/// Simulation configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Screen & Level ===
    /// Visible window width in pixels
    pub window_width: f32,
    /// Visible window height in pixels
    pub window_height: f32,
    /// Level width in pixels
    pub level_width: f32,
    /// Level height in pixels
    pub level_height: f32,

    // === Player ===
    /// Unit steps the player moves per tick
    pub player_speed: u32,
    /// Starting and maximum player health
    pub player_health: i32,
    /// Player hitbox half-width
    pub player_half_width: f32,
    /// Player hitbox half-height
    pub player_half_height: f32,

    // === Monsters ===
    /// Ticks between spawn batches, indexed by elapsed minute
    pub spawn_rate: Vec<u32>,
    /// Distance outside the screen at which monsters appear
    pub spawn_distance: f32,
    /// Game seconds between two charger hits
    pub charger_cooldown: f64,
    /// Distance outside the level at which chargers are removed
    pub charger_despawn_margin: f32,

    // === Attacks ===
    /// Seconds between shots inside one volley
    pub attack_delay: f64,
    /// Ticks an attack ignores the monster it last hit
    pub attack_immune_ticks: u32,

    // === Collectables ===
    /// Collectable count that enables XP condensation
    pub condense_threshold: usize,
    /// Collectables sampled for condensation per tick
    pub condense_amount: usize,
    /// Condensation search distance per XP tier
    pub condense_distance: [f32; 3],
    /// Health restored by a cake
    pub heal_value: i32,
    /// Percent chance of a cake drop per kill
    pub heal_spawn_chance: u32,

    // === Progression ===
    /// XP needed for the first level-up
    pub level_cap_base: u32,
    /// XP cap growth per level
    pub level_cap_multiplier: f64,
    /// Options offered per level-up
    pub level_up_choices: usize,
    /// Minutes to survive for a win
    pub win_time_minutes: u32,
    /// Weapon the player starts every game with
    pub starter_weapon: WeaponKind,

    // === Misc ===
    /// RNG seed (None = random)
    pub seed: Option<u64>,

    // === Weapons ===
    /// Progression tables for every weapon
    pub weapons: WeaponCatalog,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: WIDTH,
            window_height: HEIGHT,
            level_width: LEVEL_W,
            level_height: LEVEL_H,

            player_speed: PLAYER_SPEED,
            player_health: PLAYER_HEALTH,
            player_half_width: PLAYER_HALF_W,
            player_half_height: PLAYER_HALF_H,

            spawn_rate: SPAWN_RATE.to_vec(),
            spawn_distance: SPAWN_DISTANCE,
            charger_cooldown: HURT_COOLDOWN,
            charger_despawn_margin: CHARGER_DESPAWN_MARGIN,

            attack_delay: ATTACK_DELAY,
            attack_immune_ticks: ATTACK_IMMUNE,

            condense_threshold: CONDENSE_THRESHOLD,
            condense_amount: CONDENSE_AMOUNT,
            condense_distance: CONDENSE_DISTANCE,
            heal_value: HEAL_VALUE,
            heal_spawn_chance: HEAL_SPAWN_CHANCE,

            level_cap_base: LEVEL_CAP_BASE,
            level_cap_multiplier: LEVEL_CAP_MULTIPLIER,
            level_up_choices: LEVEL_UP_CHOICES_COUNT,
            win_time_minutes: WIN_TIME_MINUTES,
            starter_weapon: WeaponKind::ThrownDagger,

            seed: None,

            weapons: WeaponCatalog::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a path.
    /// Returns the default config if the file is missing or invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::try_load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            },
        }
    }

    /// Load and validate configuration from a path.
    pub fn try_load(path: impl AsRef<Path>) -> SurvivorsResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML document.
    pub fn from_toml_str(contents: &str) -> SurvivorsResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| SurvivorsError::Config(e.to_string()))?;
        let problems = config.validate();
        if problems.is_empty() {
            Ok(config)
        } else {
            Err(SurvivorsError::InvalidData(problems.join("; ")))
        }
    }

    /// Serialize the configuration to a TOML document.
    pub fn to_toml_string(&self) -> SurvivorsResult<String> {
        toml::to_string_pretty(self).map_err(|e| SurvivorsError::Config(e.to_string()))
    }

    /// Check the configuration for values the simulation cannot run with.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.level_width < self.window_width || self.level_height < self.window_height {
            problems.push("level must be at least as large as the window".to_string());
        }
        if self.player_health <= 0 {
            problems.push("player_health must be positive".to_string());
        }
        if self.player_speed == 0 {
            problems.push("player_speed must be positive".to_string());
        }
        if self.player_half_width <= 0.0 || self.player_half_height <= 0.0 {
            problems.push("player half-size must be positive".to_string());
        }
        if 2.0 * self.player_half_width > self.level_width
            || 2.0 * self.player_half_height > self.level_height
        {
            problems.push("player hitbox must fit inside the level".to_string());
        }
        if self.spawn_rate.is_empty() || self.spawn_rate.contains(&0) {
            problems.push("spawn_rate must be non-empty with non-zero entries".to_string());
        }
        if self.attack_delay <= 0.0 {
            problems.push("attack_delay must be positive".to_string());
        }
        if self.level_cap_base == 0 {
            problems.push("level_cap_base must be positive".to_string());
        }
        if self.level_cap_multiplier < 1.0 {
            problems.push("level_cap_multiplier must be at least 1.0".to_string());
        }
        if self.level_up_choices == 0 {
            problems.push("level_up_choices must be at least 1".to_string());
        }
        if self.condense_threshold == 0 {
            problems.push("condense_threshold must be positive".to_string());
        }
        if self.heal_spawn_chance > 100 {
            problems.push("heal_spawn_chance is a percentage (0-100)".to_string());
        }
        if let Err(e) = self.weapons.validate() {
            problems.push(e.to_string());
        }

        problems
    }

    /// The playable area.
    #[must_use]
    pub fn level_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.level_width, self.level_height)
    }

    /// The player hitbox half-extents.
    #[must_use]
    pub fn player_half_size(&self) -> Vec2 {
        Vec2::new(self.player_half_width, self.player_half_height)
    }

    /// Ticks between spawn batches during `minute`.
    #[must_use]
    pub fn spawn_rate_for_minute(&self, minute: u32) -> u32 {
        let index = (minute as usize).min(self.spawn_rate.len().saturating_sub(1));
        self.spawn_rate.get(index).copied().unwrap_or(1).max(1)
    }

    /// Condensation search distance for an XP display tier (1-3).
    #[must_use]
    pub fn condense_distance_for_tier(&self, tier: u8) -> f32 {
        let index = usize::from(tier.clamp(1, 3) - 1);
        self.condense_distance[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.level_bounds(), Rect::new(0.0, 0.0, 2250.0, 1500.0));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str("player_speed = 7\nseed = 42\n")
            .expect("partial config should parse");
        assert_eq!(config.player_speed, 7);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.player_health, PLAYER_HEALTH);
        assert_eq!(config.spawn_rate, SPAWN_RATE.to_vec());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = GameConfig::from_toml_str("player_speed = \"fast\"");
        assert!(matches!(result, Err(SurvivorsError::Config(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = GameConfig::from_toml_str("spawn_rate = []\nlevel_cap_multiplier = 0.5");
        match result {
            Err(SurvivorsError::InvalidData(msg)) => {
                assert!(msg.contains("spawn_rate"));
                assert!(msg.contains("level_cap_multiplier"));
            },
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_player_rejected() {
        let result = GameConfig::from_toml_str("player_half_width = 2000.0");
        match result {
            Err(SurvivorsError::InvalidData(msg)) => assert!(msg.contains("hitbox")),
            other => panic!("expected InvalidData, got {other:?}"),
        }
        assert!(GameConfig::from_toml_str("player_half_height = 751.0").is_err());
        // Exactly the level height still leaves one valid position
        assert!(GameConfig::from_toml_str("player_half_height = 750.0").is_ok());
    }

    #[test]
    fn test_degenerate_player_rejected() {
        assert!(GameConfig::from_toml_str("player_speed = 0").is_err());
        assert!(GameConfig::from_toml_str("player_half_width = 0.0").is_err());
        assert!(GameConfig::from_toml_str("player_half_height = -4.0").is_err());
    }

    #[test]
    fn test_zero_level_up_choices_rejected() {
        let result = GameConfig::from_toml_str("level_up_choices = 0");
        match result {
            Err(SurvivorsError::InvalidData(msg)) => assert!(msg.contains("level_up_choices")),
            other => panic!("expected InvalidData, got {other:?}"),
        }
        assert!(GameConfig::from_toml_str("level_up_choices = 1").is_ok());
    }

    #[test]
    fn test_zero_condense_threshold_rejected() {
        let result = GameConfig::from_toml_str("condense_threshold = 0");
        match result {
            Err(SurvivorsError::InvalidData(msg)) => assert!(msg.contains("condense_threshold")),
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn test_toml_roundtrip_through_string() {
        let config = GameConfig::default();
        let text = config.to_toml_string().expect("serialize");
        let parsed = GameConfig::from_toml_str(&text).expect("parse back");
        assert_eq!(parsed.level_cap_base, config.level_cap_base);
        assert_eq!(parsed.starter_weapon, config.starter_weapon);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = GameConfig::load_from("/nonexistent/survivors.toml");
        assert_eq!(config.player_health, PLAYER_HEALTH);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "win_time_minutes = 5").expect("write");
        let config = GameConfig::load_from(file.path());
        assert_eq!(config.win_time_minutes, 5);
    }

    #[test]
    fn test_load_from_bad_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "this is not toml = = =").expect("write");
        let config = GameConfig::load_from(file.path());
        assert_eq!(config.win_time_minutes, WIN_TIME_MINUTES);
    }

    #[test]
    fn test_spawn_rate_for_minute_clamps() {
        let config = GameConfig::default();
        assert_eq!(config.spawn_rate_for_minute(0), 20);
        assert_eq!(config.spawn_rate_for_minute(4), 10);
        assert_eq!(config.spawn_rate_for_minute(99), 5);
    }

    #[test]
    fn test_condense_distance_for_tier() {
        let config = GameConfig::default();
        assert_eq!(config.condense_distance_for_tier(1), 20.0);
        assert_eq!(config.condense_distance_for_tier(3), 60.0);
        assert_eq!(config.condense_distance_for_tier(9), 60.0);
    }
}
