//! Projectiles
//!
//! Shared by player weapons and enemy fire, tagged by side. Supports piercing
//! (a hit budget instead of delete-on-first-hit) and homing (heading blends
//! toward the nearest enemy, speed preserved).

use glam::{Vec2, Vec4};

use crate::palette;

use super::enemy::{self, Enemy};

/// Homing retargets within this radius every tick
const HOMING_SEARCH_RANGE: f32 = 300.0;

/// Trail history length (newest first)
const TRAIL_LENGTH: usize = 10;
/// Minimum interval between trail samples (seconds)
const TRAIL_INTERVAL: f32 = 0.02;

#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub radius: f32,
    pub color: Vec4,

    pub damage: f32,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub from_player: bool,

    pub piercing: bool,
    pub pierce_count: u32,
    pub max_pierce_count: u32,

    pub homing: bool,
    pub homing_strength: f32,

    /// Recent positions for the renderer's trail effect (newest first)
    pub trail: Vec<Vec2>,
    trail_timer: f32,

    pub marked_for_deletion: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, vel: Vec2, damage: f32, from_player: bool) -> Self {
        Self {
            pos,
            vel,
            size: Vec2::splat(8.0),
            rotation: 0.0,
            radius: 4.0,
            color: if from_player {
                palette::CYAN
            } else {
                palette::ORANGE
            },
            damage,
            lifetime: 0.0,
            max_lifetime: 2.0,
            from_player,
            piercing: false,
            pierce_count: 0,
            max_pierce_count: 0,
            homing: false,
            homing_strength: 0.0,
            trail: Vec::with_capacity(TRAIL_LENGTH),
            trail_timer: 0.0,
            marked_for_deletion: false,
        }
    }

    pub fn set_homing(&mut self, strength: f32) {
        self.homing = true;
        self.homing_strength = strength;
    }

    pub fn set_piercing(&mut self, count: u32) {
        self.piercing = true;
        self.max_pierce_count = count;
        self.pierce_count = 0;
    }

    pub fn update(&mut self, dt: f32, enemies: &[Enemy]) {
        self.lifetime += dt;
        if self.lifetime >= self.max_lifetime {
            self.marked_for_deletion = true;
            return;
        }

        if self.homing && self.from_player {
            self.update_homing(dt, enemies);
        }

        self.update_trail(dt);

        if self.vel.length() > 0.1 {
            self.rotation = self.vel.y.atan2(self.vel.x);
        }

        self.pos += self.vel * dt;
    }

    /// Blend heading toward the nearest enemy at `homing_strength * dt`.
    /// Steering changes direction only; speed is preserved.
    fn update_homing(&mut self, dt: f32, enemies: &[Enemy]) {
        let Some(idx) = enemy::nearest_enemy(enemies, self.pos, HOMING_SEARCH_RANGE) else {
            return;
        };

        let to_target = (enemies[idx].pos - self.pos).normalize_or_zero();
        let current = self.vel.normalize_or_zero();
        let new_dir = (current + to_target * self.homing_strength * dt).normalize_or_zero();

        let speed = self.vel.length();
        self.vel = new_dir * speed;
    }

    fn update_trail(&mut self, dt: f32) {
        self.trail_timer += dt;
        if self.trail_timer >= TRAIL_INTERVAL {
            self.trail_timer = 0.0;
            self.trail.insert(0, self.pos);
            if self.trail.len() > TRAIL_LENGTH {
                self.trail.pop();
            }
        }
    }

    /// Apply the post-hit deletion rule: piercing shots spend one unit of
    /// budget and die once it's exhausted, everything else dies on the spot.
    pub fn register_hit(&mut self) {
        if self.piercing {
            self.pierce_count += 1;
            if self.pierce_count >= self.max_pierce_count {
                self.marked_for_deletion = true;
            }
        } else {
            self.marked_for_deletion = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;

    #[test]
    fn test_expires_after_max_lifetime() {
        let mut proj = Projectile::new(Vec2::ZERO, Vec2::new(100.0, 0.0), 10.0, true);
        proj.max_lifetime = 0.49;

        for _ in 0..29 {
            proj.update(1.0 / 60.0, &[]);
        }
        assert!(!proj.marked_for_deletion);
        proj.update(1.0 / 60.0, &[]);
        assert!(proj.marked_for_deletion);
    }

    #[test]
    fn test_homing_preserves_speed_and_turns() {
        let mut proj = Projectile::new(Vec2::ZERO, Vec2::new(200.0, 0.0), 10.0, true);
        proj.set_homing(5.0);

        // Target above the flight path, inside search range
        let enemies = vec![Enemy::new(EnemyKind::Basic, Vec2::new(50.0, 100.0))];

        let speed_before = proj.vel.length();
        for _ in 0..10 {
            proj.update(1.0 / 60.0, &enemies);
        }
        assert!((proj.vel.length() - speed_before).abs() < 0.5);
        assert!(proj.vel.y > 0.0, "heading should bend toward the target");
    }

    #[test]
    fn test_homing_ignores_targets_out_of_range() {
        let mut proj = Projectile::new(Vec2::ZERO, Vec2::new(200.0, 0.0), 10.0, true);
        proj.set_homing(5.0);

        let enemies = vec![Enemy::new(EnemyKind::Basic, Vec2::new(50.0, 1000.0))];
        for _ in 0..10 {
            proj.update(1.0 / 60.0, &enemies);
        }
        assert_eq!(proj.vel.y, 0.0);
    }

    #[test]
    fn test_pierce_budget() {
        let mut proj = Projectile::new(Vec2::ZERO, Vec2::X, 10.0, true);
        proj.set_piercing(2);

        proj.register_hit();
        assert!(!proj.marked_for_deletion);
        proj.register_hit();
        assert!(proj.marked_for_deletion);
    }

    #[test]
    fn test_non_piercing_dies_on_first_hit() {
        let mut proj = Projectile::new(Vec2::ZERO, Vec2::X, 10.0, true);
        proj.register_hit();
        assert!(proj.marked_for_deletion);
    }

    #[test]
    fn test_trail_is_bounded_and_sampled() {
        let mut proj = Projectile::new(Vec2::ZERO, Vec2::new(100.0, 0.0), 10.0, true);
        proj.max_lifetime = f32::MAX;

        for _ in 0..600 {
            proj.update(1.0 / 60.0, &[]);
        }
        assert_eq!(proj.trail.len(), TRAIL_LENGTH);
        // Newest sample first
        assert!(proj.trail[0].x > proj.trail[TRAIL_LENGTH - 1].x);
    }
}
