//! Attack entities spawned by weapons.
//!
//! An attack moves in `speed` unit steps per tick and checks the monster
//! list after every step. The first overlapping living monster takes the
//! hit, unless it is the monster hit last and the per-tick immunity window
//! is still open. Monsters are referred to by [`EntityId`] only, so a
//! monster removed from the level simply stops resolving.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use survivors_common::{EntityId, Rect, Vec2};

use crate::entity::Facing;
use crate::monster::Monster;
use crate::render::{Drawable, Sprite};

/// Pierce value that is never used up.
pub const INFINITE_PIERCE: i32 = -1;

/// How an attack steers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Guidance {
    /// Flies along its initial direction
    Straight,
    /// Launched at a monster
    Aimed {
        /// Monster currently aimed at
        target: Option<EntityId>,
        /// Retarget every tick
        homing: bool,
    },
}

/// Stats a weapon hands to every attack it spawns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackTemplate {
    /// Unit steps per tick
    pub speed: u32,
    /// Damage per hit
    pub damage: i32,
    /// Lifetime in game seconds
    pub duration: f64,
    /// Hits before the attack is used up, or [`INFINITE_PIERCE`]
    pub pierce: i32,
    /// Sprite key
    pub image: String,
    /// Hitbox half-extents
    pub half_size: Vec2,
}

/// Uniformly random unit direction.
pub fn random_direction(rng: &mut fastrand::Rng) -> Vec2 {
    let angle = rng.f32() * TAU;
    Vec2::new(angle.cos(), angle.sin())
}

/// The living monster closest to `position`. Ties go to the earliest in
/// the list.
#[must_use]
pub fn nearest_monster(position: Vec2, monsters: &[Monster]) -> Option<&Monster> {
    let mut best: Option<(&Monster, f32)> = None;
    for monster in monsters.iter().filter(|m| m.is_alive()) {
        let distance = position.distance(monster.body.position);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((monster, distance));
        }
    }
    best.map(|(m, _)| m)
}

/// A projectile owned by a weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    /// Attack ID
    pub id: EntityId,
    /// Center position
    pub position: Vec2,
    /// Unit direction, never zero
    pub direction: Vec2,
    /// Unit steps per tick
    pub speed: u32,
    /// Damage per hit
    pub damage: i32,
    /// Lifetime in game seconds
    pub duration: f64,
    /// Remaining hits, or [`INFINITE_PIERCE`]
    pub pierce: i32,
    /// Game time the attack was spawned
    pub spawn_time: f64,
    /// False once the attack should be removed
    pub exists: bool,
    /// Ticks left before `last_hit` can be hit again
    pub immune_counter: u32,
    /// Monster damaged most recently
    pub last_hit: Option<EntityId>,
    /// Steering
    pub guidance: Guidance,
    /// Sprite key
    pub image: String,
    /// Hitbox half-extents
    pub half_size: Vec2,
}

impl Attack {
    /// Spawns a straight attack. A zero `direction` is replaced with a
    /// random one.
    pub fn new(
        template: &AttackTemplate,
        position: Vec2,
        direction: Vec2,
        spawn_time: f64,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let direction = if direction.is_zero() {
            random_direction(rng)
        } else {
            direction.normalized()
        };
        Self {
            id: EntityId::new(),
            position,
            direction,
            speed: template.speed,
            damage: template.damage,
            duration: template.duration,
            pierce: template.pierce,
            spawn_time,
            exists: true,
            immune_counter: 0,
            last_hit: None,
            guidance: Guidance::Straight,
            image: template.image.clone(),
            half_size: template.half_size,
        }
    }

    /// Spawns an attack aimed at the nearest living monster, or in a
    /// random direction if there is none.
    pub fn aimed(
        template: &AttackTemplate,
        position: Vec2,
        monsters: &[Monster],
        homing: bool,
        spawn_time: f64,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let target = nearest_monster(position, monsters);
        let direction = target.map_or(Vec2::ZERO, |m| position.direction_to(m.body.position));
        let mut attack = Self::new(template, position, direction, spawn_time, rng);
        attack.guidance = Guidance::Aimed {
            target: target.map(|m| m.id),
            homing,
        };
        attack
    }

    /// Current hitbox.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.half_size)
    }

    /// Check if pierce is unlimited.
    #[must_use]
    pub fn has_infinite_pierce(&self) -> bool {
        self.pierce == INFINITE_PIERCE
    }

    /// Monster currently aimed at, if any.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match self.guidance {
            Guidance::Aimed { target, .. } => target,
            Guidance::Straight => None,
        }
    }

    /// Runs one tick: immunity countdown, homing, movement with per-step
    /// collision, then the lifetime check.
    pub fn update(
        &mut self,
        monsters: &mut [Monster],
        now: f64,
        immune_ticks: u32,
        rng: &mut fastrand::Rng,
    ) {
        if !self.exists {
            return;
        }

        self.immune_counter = self.immune_counter.saturating_sub(1);

        if matches!(self.guidance, Guidance::Aimed { homing: true, .. }) {
            self.retarget(monsters, rng);
        }

        for _ in 0..self.speed {
            self.position += self.direction;
            self.collision(monsters, immune_ticks);
            if !self.exists {
                break;
            }
        }

        self.check_duration(now);
    }

    /// Keeps a homing attack pointed at a living monster.
    fn retarget(&mut self, monsters: &[Monster], rng: &mut fastrand::Rng) {
        let Guidance::Aimed { target, .. } = &mut self.guidance else {
            return;
        };

        let current = target.and_then(|id| monsters.iter().find(|m| m.id == id && m.is_alive()));
        let chosen = current.or_else(|| nearest_monster(self.position, monsters));

        match chosen {
            Some(monster) => {
                *target = Some(monster.id);
                let heading = self.position.direction_to(monster.body.position);
                if !heading.is_zero() {
                    self.direction = heading;
                }
            },
            None => {
                // Lost the last monster: pick a new random heading once,
                // then keep flying straight.
                if target.take().is_some() || self.direction.is_zero() {
                    self.direction = random_direction(rng);
                }
            },
        }
    }

    /// Resolves a hit against the first overlapping living monster.
    fn collision(&mut self, monsters: &mut [Monster], immune_ticks: u32) {
        let rect = self.rect();
        let Some(monster) = monsters
            .iter_mut()
            .find(|m| m.is_alive() && m.rect().overlaps(&rect))
        else {
            return;
        };

        if self.last_hit == Some(monster.id) && self.immune_counter > 0 {
            return;
        }

        monster.body.hurt(self.damage);
        self.last_hit = Some(monster.id);
        self.immune_counter = immune_ticks;

        if self.pierce > 0 {
            self.pierce -= 1;
            if self.pierce == 0 {
                self.exists = false;
            }
        }
    }

    fn check_duration(&mut self, now: f64) {
        if now - self.spawn_time >= self.duration {
            self.exists = false;
        }
    }
}

impl Drawable for Attack {
    fn sprite(&self, offset_x: f32, offset_y: f32) -> Option<Sprite> {
        if !self.exists {
            return None;
        }
        let mut sprite = Sprite::new(self.image.as_str(), self.position, offset_x, offset_y);
        if self.direction.x < 0.0 {
            sprite.facing = Facing::Left;
        }
        Some(sprite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(speed: u32, pierce: i32) -> AttackTemplate {
        AttackTemplate {
            speed,
            damage: 5,
            duration: 100.0,
            pierce,
            image: "attacks/test".to_string(),
            half_size: Vec2::new(4.0, 4.0),
        }
    }

    fn row_of_monsters() -> Vec<Monster> {
        vec![
            Monster::test_at(Vec2::new(20.0, 0.0), 100),
            Monster::test_at(Vec2::new(60.0, 0.0), 100),
            Monster::test_at(Vec2::new(100.0, 0.0), 100),
        ]
    }

    fn run(attack: &mut Attack, monsters: &mut [Monster], ticks: u32, rng: &mut fastrand::Rng) {
        for tick in 0..ticks {
            attack.update(monsters, f64::from(tick) * 0.016, 30, rng);
        }
    }

    #[test]
    fn test_zero_direction_is_randomized() {
        let mut rng = fastrand::Rng::with_seed(11);
        let attack = Attack::new(&template(1, 1), Vec2::ZERO, Vec2::ZERO, 0.0, &mut rng);
        assert!(!attack.direction.is_zero());
        assert!((attack.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_pierce_runs_out_after_distinct_hits() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut monsters = row_of_monsters();
        let mut attack = Attack::new(&template(10, 2), Vec2::ZERO, Vec2::RIGHT, 0.0, &mut rng);
        run(&mut attack, &mut monsters, 10, &mut rng);

        assert!(!attack.exists);
        assert_eq!(attack.pierce, 0);
        assert_eq!(monsters[0].body.health, 95);
        assert_eq!(monsters[1].body.health, 95);
        assert_eq!(monsters[2].body.health, 100);
        // Stopped on the step of the second hit
        assert_eq!(attack.position, Vec2::new(49.0, 0.0));
    }

    #[test]
    fn test_infinite_pierce_never_expires_from_hits() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut monsters = row_of_monsters();
        let mut attack = Attack::new(
            &template(10, INFINITE_PIERCE),
            Vec2::ZERO,
            Vec2::RIGHT,
            0.0,
            &mut rng,
        );
        run(&mut attack, &mut monsters, 10, &mut rng);

        assert!(attack.exists);
        assert!(attack.has_infinite_pierce());
        assert!(monsters.iter().all(|m| m.body.health == 95));
    }

    #[test]
    fn test_immunity_window_is_per_tick() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut monsters = vec![Monster::test_at(Vec2::new(20.0, 0.0), 1000)];
        let mut attack = Attack::new(
            &template(1, INFINITE_PIERCE),
            Vec2::new(20.0, 0.0),
            Vec2::RIGHT,
            0.0,
            &mut rng,
        );

        for tick in 0..5 {
            attack.update(&mut monsters, f64::from(tick), 5, &mut rng);
        }
        assert_eq!(monsters[0].body.health, 995);

        attack.update(&mut monsters, 5.0, 5, &mut rng);
        assert_eq!(monsters[0].body.health, 990);
    }

    #[test]
    fn test_immune_first_overlap_shields_the_one_behind() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut monsters = vec![
            Monster::test_at(Vec2::new(20.0, 0.0), 1000),
            Monster::test_at(Vec2::new(22.0, 0.0), 1000),
        ];
        let mut attack =
            Attack::new(&template(1, 3), Vec2::new(20.0, 0.0), Vec2::RIGHT, 0.0, &mut rng);

        attack.update(&mut monsters, 0.0, 5, &mut rng);
        assert_eq!(monsters[0].body.health, 995);
        assert_eq!(attack.pierce, 2);

        // Both overlap, but the first match is the immune last hit
        for tick in 1..5 {
            attack.update(&mut monsters, f64::from(tick), 5, &mut rng);
            assert!(attack.rect().overlaps(&monsters[1].rect()));
        }
        assert_eq!(monsters[0].body.health, 995);
        assert_eq!(monsters[1].body.health, 1000);
        assert_eq!(attack.pierce, 2);
        assert!(attack.exists);
    }

    #[test]
    fn test_dead_monsters_are_not_hit() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut monsters = row_of_monsters();
        monsters[0].body.alive = false;
        let mut attack = Attack::new(&template(10, 1), Vec2::ZERO, Vec2::RIGHT, 0.0, &mut rng);
        run(&mut attack, &mut monsters, 10, &mut rng);
        assert_eq!(monsters[0].body.health, 100);
        assert_eq!(monsters[1].body.health, 95);
    }

    #[test]
    fn test_duration_expires() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut short = template(1, 1);
        short.duration = 2.0;
        let mut attack = Attack::new(&short, Vec2::ZERO, Vec2::RIGHT, 1.0, &mut rng);
        attack.update(&mut [], 2.9, 30, &mut rng);
        assert!(attack.exists);
        attack.update(&mut [], 3.0, 30, &mut rng);
        assert!(!attack.exists);
    }

    #[test]
    fn test_aimed_picks_nearest_first_on_ties() {
        let mut rng = fastrand::Rng::with_seed(1);
        let monsters = vec![
            Monster::test_at(Vec2::new(100.0, 0.0), 10),
            Monster::test_at(Vec2::new(0.0, 50.0), 10),
            Monster::test_at(Vec2::new(0.0, -50.0), 10),
        ];
        let attack = Attack::aimed(&template(1, 1), Vec2::ZERO, &monsters, false, 0.0, &mut rng);
        assert_eq!(attack.target(), Some(monsters[1].id));
        assert_eq!(attack.direction, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_aimed_without_monsters_is_random() {
        let mut rng = fastrand::Rng::with_seed(5);
        let attack = Attack::aimed(&template(1, 1), Vec2::ZERO, &[], true, 0.0, &mut rng);
        assert_eq!(attack.target(), None);
        assert!(!attack.direction.is_zero());
    }

    #[test]
    fn test_non_homing_keeps_direction() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut monsters = vec![Monster::test_at(Vec2::new(0.0, 500.0), 10)];
        let mut attack =
            Attack::aimed(&template(1, 1), Vec2::ZERO, &monsters, false, 0.0, &mut rng);
        monsters[0].body.position = Vec2::new(500.0, 0.0);
        attack.update(&mut monsters, 0.1, 30, &mut rng);
        assert_eq!(attack.direction, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_homing_retargets_when_target_dies() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut monsters = vec![
            Monster::test_at(Vec2::new(0.0, 300.0), 10),
            Monster::test_at(Vec2::new(400.0, 0.0), 10),
        ];
        let mut attack = Attack::aimed(&template(1, 1), Vec2::ZERO, &monsters, true, 0.0, &mut rng);
        assert_eq!(attack.target(), Some(monsters[0].id));

        monsters[0].body.alive = false;
        attack.update(&mut monsters, 0.1, 30, &mut rng);
        assert_eq!(attack.target(), Some(monsters[1].id));
        assert_eq!(attack.direction, Vec2::RIGHT);
    }

    #[test]
    fn test_homing_follows_moving_target() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut monsters = vec![Monster::test_at(Vec2::new(300.0, 0.0), 10)];
        let mut attack = Attack::aimed(&template(1, 1), Vec2::ZERO, &monsters, true, 0.0, &mut rng);
        monsters[0].body.position = Vec2::new(0.0, 300.0);
        attack.update(&mut monsters, 0.1, 30, &mut rng);
        assert_eq!(attack.direction, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_homing_with_no_monsters_left_keeps_flying() {
        let mut rng = fastrand::Rng::with_seed(9);
        let monsters = vec![Monster::test_at(Vec2::new(300.0, 0.0), 10)];
        let mut attack = Attack::aimed(&template(1, 1), Vec2::ZERO, &monsters, true, 0.0, &mut rng);

        attack.update(&mut [], 0.1, 30, &mut rng);
        assert_eq!(attack.target(), None);
        let heading = attack.direction;
        assert!((heading.length() - 1.0).abs() < 1e-5);

        attack.update(&mut [], 0.2, 30, &mut rng);
        assert_eq!(attack.direction, heading);
    }

    #[test]
    fn test_sprite_faces_travel_direction() {
        let mut rng = fastrand::Rng::with_seed(1);
        let left = Vec2::new(-1.0, 0.0);
        let attack = Attack::new(&template(1, 1), Vec2::new(50.0, 50.0), left, 0.0, &mut rng);
        let sprite = attack.sprite(0.0, 0.0).expect("live attack is drawn");
        assert_eq!(sprite.facing, Facing::Left);
    }
}
