//! Render contract.
//!
//! The core never touches a display surface. After each update the
//! renderer asks every entity for a [`Sprite`] positioned relative to the
//! camera offset, and reads numeric HUD values from [`Hud`].

use serde::{Deserialize, Serialize};
use survivors_common::Vec2;

use crate::config::GameConfig;
use crate::entity::{CombatEntity, Facing};

/// What the renderer should draw for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Image key, e.g. `monsters/bat`
    pub image: String,
    /// Screen X of the sprite center
    pub x: f32,
    /// Screen Y of the sprite center
    pub y: f32,
    /// Horizontal orientation
    pub facing: Facing,
    /// Show the hurt variant of the image
    pub hurt: bool,
}

impl Sprite {
    /// Sprite for a static item at `position`.
    #[must_use]
    pub fn new(image: impl Into<String>, position: Vec2, offset_x: f32, offset_y: f32) -> Self {
        Self {
            image: image.into(),
            x: position.x - offset_x,
            y: position.y - offset_y,
            facing: Facing::Right,
            hurt: false,
        }
    }

    /// Sprite for a creature, carrying its facing and hurt hint.
    #[must_use]
    pub fn for_body(image: &str, body: &CombatEntity, offset_x: f32, offset_y: f32) -> Self {
        Self {
            facing: body.facing,
            hurt: body.is_hurt(),
            ..Self::new(image, body.position, offset_x, offset_y)
        }
    }
}

/// Anything the renderer can draw.
pub trait Drawable {
    /// The sprite to draw with the camera at (`offset_x`, `offset_y`), or
    /// `None` if nothing should be drawn.
    fn sprite(&self, offset_x: f32, offset_y: f32) -> Option<Sprite>;
}

/// Camera offset that centers `focus` while keeping the view inside the
/// level.
#[must_use]
pub fn camera_offset(focus: Vec2, config: &GameConfig) -> Vec2 {
    let max_x = (config.level_width - config.window_width).max(0.0);
    let max_y = (config.level_height - config.window_height).max(0.0);
    Vec2::new(
        (focus.x - config.window_width / 2.0).clamp(0.0, max_x),
        (focus.y - config.window_height / 2.0).clamp(0.0, max_y),
    )
}

/// Visible part of the level in level coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenCoords {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Right edge
    pub right: f32,
    /// Bottom edge
    pub bottom: f32,
}

impl ScreenCoords {
    /// The screen rectangle with the camera following `focus`.
    #[must_use]
    pub fn around(focus: Vec2, config: &GameConfig) -> Self {
        let offset = camera_offset(focus, config);
        Self {
            left: offset.x,
            top: offset.y,
            right: offset.x + config.window_width,
            bottom: offset.y + config.window_height,
        }
    }

    /// Check if a point is on screen.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }
}

/// Numeric state of the health bar, XP bar and timer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    /// XP progress towards the next level (0.0 - 1.0)
    pub xp_fraction: f32,
    /// Health remaining (0.0 - 1.0)
    pub health_fraction: f32,
    /// Player level
    pub level: u32,
    /// Elapsed whole minutes
    pub minutes: u32,
    /// Elapsed seconds within the current minute
    pub seconds: u32,
}
