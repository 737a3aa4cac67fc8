//! Collectable drops: XP gems and healing cakes.

use serde::{Deserialize, Serialize};
use survivors_common::{EntityId, Rect, Vec2};

use crate::constants::{COLLECTABLE_HALF_SIZE, XP_TIER_2, XP_TIER_3};
use crate::render::{Drawable, Sprite};

/// What a collectable gives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectableKind {
    /// Experience points
    Xp {
        /// XP granted
        value: u32,
    },
    /// Restores health
    Cake {
        /// Health restored
        heal: i32,
    },
}

/// Effect of picking up a collectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pickup {
    /// Gain XP
    Xp(u32),
    /// Restore health
    Heal(i32),
}

/// An item lying in the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectable {
    /// Collectable ID
    pub id: EntityId,
    /// Center position
    pub position: Vec2,
    /// False once the player touched it
    pub visible: bool,
    /// False once it should be removed
    pub exists: bool,
    /// Touched by the player, effect not applied yet
    pub active: bool,
    /// Payload
    pub kind: CollectableKind,
    /// Hitbox half-extents
    pub half_size: Vec2,
}

impl Collectable {
    fn new(position: Vec2, kind: CollectableKind) -> Self {
        Self {
            id: EntityId::new(),
            position,
            visible: true,
            exists: true,
            active: false,
            kind,
            half_size: Vec2::new(COLLECTABLE_HALF_SIZE, COLLECTABLE_HALF_SIZE),
        }
    }

    /// An XP drop.
    #[must_use]
    pub fn xp(position: Vec2, value: u32) -> Self {
        Self::new(position, CollectableKind::Xp { value })
    }

    /// A cake restoring `heal` health.
    #[must_use]
    pub fn cake(position: Vec2, heal: i32) -> Self {
        Self::new(position, CollectableKind::Cake { heal })
    }

    /// XP carried, if this is an XP drop.
    #[must_use]
    pub fn xp_value(&self) -> Option<u32> {
        match self.kind {
            CollectableKind::Xp { value } => Some(value),
            CollectableKind::Cake { .. } => None,
        }
    }

    /// Display tier of an XP drop (1-3), 0 for other kinds.
    #[must_use]
    pub fn tier(&self) -> u8 {
        match self.xp_value() {
            Some(v) if v < XP_TIER_2 => 1,
            Some(v) if v < XP_TIER_3 => 2,
            Some(_) => 3,
            None => 0,
        }
    }

    /// Sprite key.
    #[must_use]
    pub fn image(&self) -> String {
        match self.kind {
            CollectableKind::Xp { .. } => format!("collectables/xp{}", self.tier()),
            CollectableKind::Cake { .. } => "collectables/cake".to_string(),
        }
    }

    /// Current hitbox.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.half_size)
    }

    /// Check if the item can still be picked up or merged.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.exists && self.visible
    }

    /// Runs one tick against the player hitbox.
    ///
    /// The first overlap hides the item for good and activates it; an
    /// active item yields its effect exactly once and stops existing.
    pub fn update(&mut self, player: &Rect) -> Option<Pickup> {
        if !self.exists {
            return None;
        }
        if self.visible && self.rect().overlaps(player) {
            self.visible = false;
            self.active = true;
        }
        if !self.active {
            return None;
        }
        self.active = false;
        self.exists = false;
        Some(match self.kind {
            CollectableKind::Xp { value } => Pickup::Xp(value),
            CollectableKind::Cake { heal } => Pickup::Heal(heal),
        })
    }
}

/// Merges every other available XP drop within `search_distance` of
/// `pool[index]` into it. Merged drops stop existing. Returns how many
/// drops were merged.
pub fn condense(pool: &mut [Collectable], index: usize, search_distance: f32) -> usize {
    let Some(center) = pool.get(index) else {
        return 0;
    };
    if !center.is_available() || center.xp_value().is_none() {
        return 0;
    }
    let origin = center.position;

    let mut gained = 0;
    let mut merged = 0;
    for (i, other) in pool.iter_mut().enumerate() {
        if i == index || !other.is_available() {
            continue;
        }
        let Some(value) = other.xp_value() else {
            continue;
        };
        if origin.distance(other.position) <= search_distance {
            gained += value;
            merged += 1;
            other.exists = false;
        }
    }

    if let Some(CollectableKind::Xp { value }) = pool.get_mut(index).map(|c| &mut c.kind) {
        *value += gained;
    }
    merged
}

impl Drawable for Collectable {
    fn sprite(&self, offset_x: f32, offset_y: f32) -> Option<Sprite> {
        if !self.is_available() {
            return None;
        }
        Some(Sprite::new(self.image(), self.position, offset_x, offset_y))
    }
}
