//! The player ship
//!
//! Movement with inertia, the XP/leveling curve, the invincibility window and
//! the stat multipliers weapons read every frame.

use glam::{Vec2, Vec4};

use crate::consts::*;
use crate::{palette, shortest_arc};

use super::state::{GameEvent, UpgradeChoice, UpgradeKind};

/// Velocity blend rate toward the input target (per second)
const ACCELERATION: f32 = 10.0;
/// Rotation blend rate toward the travel direction (per second)
const TURN_RATE: f32 = 8.0;
/// Below this speed the ship keeps its last heading (no jitter at rest)
const TURN_SPEED_THRESHOLD: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub radius: f32,
    pub color: Vec4,

    pub health: f32,
    pub max_health: f32,
    pub move_speed: f32,
    pub pickup_radius: f32,

    pub experience: u32,
    pub level: u32,
    pub xp_to_next_level: u32,

    // Combat multipliers consumed by the weapon stat sync
    pub damage_multiplier: f32,
    pub fire_rate_multiplier: f32,
    pub projectile_count_bonus: u32,
    pub projectile_size_multiplier: f32,

    pub move_input: Vec2,

    pub invincibility_timer: f32,
    pub invincibility_duration: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: Vec2::splat(PLAYER_SIZE),
            rotation: 0.0,
            radius: PLAYER_SIZE * 0.4,
            color: palette::PLAYER_BLUE,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            move_speed: PLAYER_SPEED,
            pickup_radius: PLAYER_PICKUP_RADIUS,
            experience: 0,
            level: 1,
            xp_to_next_level: BASE_XP_REQUIREMENT,
            damage_multiplier: 1.0,
            fire_rate_multiplier: 1.0,
            projectile_count_bonus: 0,
            projectile_size_multiplier: 1.0,
            move_input: Vec2::ZERO,
            invincibility_timer: 0.0,
            invincibility_duration: 1.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.invincibility_timer > 0.0 {
            self.invincibility_timer -= dt;
        }

        self.update_movement(dt);

        self.pos += self.vel * dt;

        // Keep the ship inside the world, inset by its collision radius
        let half_w = WORLD_WIDTH * 0.5;
        let half_h = WORLD_HEIGHT * 0.5;
        self.pos.x = self.pos.x.clamp(-half_w + self.radius, half_w - self.radius);
        self.pos.y = self.pos.y.clamp(-half_h + self.radius, half_h - self.radius);
    }

    fn update_movement(&mut self, dt: f32) {
        // Normalize only when the intent exceeds unit length, so analog
        // sticks keep fine control but diagonals grant no speed boost
        let input = if self.move_input.length() > 1.0 {
            self.move_input.normalize_or_zero()
        } else {
            self.move_input
        };

        let target_vel = input * self.move_speed;
        self.vel = self.vel.lerp(target_vel, (dt * ACCELERATION).min(1.0));

        // Turn toward travel direction via the shortest angular path
        if self.vel.length() > TURN_SPEED_THRESHOLD {
            let target = self.vel.y.atan2(self.vel.x);
            let diff = shortest_arc(self.rotation, target);
            self.rotation += diff * (dt * TURN_RATE).min(1.0);
        }
    }

    /// Apply incoming damage. A no-op while the invincibility window is open;
    /// otherwise opens a fresh window. Emits `PlayerDied` exactly once when
    /// health reaches zero.
    pub fn take_damage(&mut self, amount: f32, events: &mut Vec<GameEvent>) {
        if self.is_invincible() {
            return;
        }

        let was_alive = self.health > 0.0;
        self.health = (self.health - amount).max(0.0);
        self.invincibility_timer = self.invincibility_duration;

        if was_alive && self.health <= 0.0 {
            events.push(GameEvent::PlayerDied);
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Award XP, leveling as many times as the amount covers. One `LevelUp`
    /// event per level crossed (a single large award can jump several).
    pub fn add_experience(&mut self, amount: u32, events: &mut Vec<GameEvent>) {
        self.experience += amount;

        while self.experience >= self.xp_to_next_level {
            self.experience -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = Self::xp_for_level(self.level);
            events.push(GameEvent::LevelUp { level: self.level });
        }
    }

    /// XP required to clear the given level (geometric curve)
    pub fn xp_for_level(level: u32) -> u32 {
        (BASE_XP_REQUIREMENT as f32 * XP_SCALING.powi(level as i32 - 1)) as u32
    }

    /// Apply a flat stat upgrade. Weapon choices are handled by the weapon
    /// manager and are a no-op here.
    pub fn apply_upgrade(&mut self, upgrade: &UpgradeChoice) {
        match upgrade.kind {
            UpgradeKind::Damage => self.damage_multiplier += upgrade.value,
            UpgradeKind::FireRate => self.fire_rate_multiplier += upgrade.value,
            UpgradeKind::ProjectileCount => self.projectile_count_bonus += upgrade.value as u32,
            UpgradeKind::ProjectileSize => self.projectile_size_multiplier += upgrade.value,
            UpgradeKind::MoveSpeed => self.move_speed += upgrade.value,
            UpgradeKind::MaxHealth => {
                self.max_health += upgrade.value;
                self.health = (self.health + upgrade.value).min(self.max_health);
            }
            UpgradeKind::PickupRadius => self.pickup_radius += upgrade.value,
            UpgradeKind::NewWeapon(_) | UpgradeKind::WeaponLevel(_) => {}
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_multi_level_jump() {
        let mut player = Player::new();
        let mut events = Vec::new();

        // Level 1 needs 10, level 2 needs 15. Award both at once plus change.
        let l1 = Player::xp_for_level(1);
        let l2 = Player::xp_for_level(2);
        player.add_experience(l1 + l2 + 3, &mut events);

        assert_eq!(player.level, 3);
        assert_eq!(player.experience, 3);
        assert_eq!(
            events,
            vec![
                GameEvent::LevelUp { level: 2 },
                GameEvent::LevelUp { level: 3 },
            ]
        );
    }

    #[test]
    fn test_invincibility_gates_damage() {
        let mut player = Player::new();
        let mut events = Vec::new();

        player.take_damage(30.0, &mut events);
        assert_eq!(player.health, 70.0);
        assert!(player.is_invincible());

        // Second hit inside the window is a no-op
        player.take_damage(30.0, &mut events);
        assert_eq!(player.health, 70.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_health_floors_at_zero_and_dies_once() {
        let mut player = Player::new();
        let mut events = Vec::new();

        player.take_damage(500.0, &mut events);
        assert_eq!(player.health, 0.0);
        assert_eq!(events, vec![GameEvent::PlayerDied]);

        // Even after the window closes, a dead player reports death only once
        player.invincibility_timer = 0.0;
        player.take_damage(10.0, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_diagonal_input_no_speed_boost() {
        let mut player = Player::new();
        player.move_input = Vec2::new(1.0, 1.0);

        // Long enough that velocity settles on the target
        for _ in 0..120 {
            player.update(1.0 / 60.0);
        }
        assert!(player.vel.length() <= player.move_speed + 1.0);
    }

    #[test]
    fn test_position_clamped_to_world() {
        let mut player = Player::new();
        player.pos = Vec2::new(10_000.0, -10_000.0);
        player.update(1.0 / 60.0);

        let half = crate::consts::WORLD_WIDTH * 0.5;
        assert_eq!(player.pos.x, half - player.radius);
        assert_eq!(player.pos.y, -half + player.radius);
    }

    #[test]
    fn test_max_health_upgrade_heals() {
        let mut player = Player::new();
        let mut events = Vec::new();
        player.take_damage(50.0, &mut events);

        player.apply_upgrade(&UpgradeChoice::stat(
            "+25 Max Health",
            "",
            UpgradeKind::MaxHealth,
            25.0,
        ));
        assert_eq!(player.max_health, 125.0);
        assert_eq!(player.health, 75.0);
    }

    proptest! {
        #[test]
        fn xp_curve_is_strictly_increasing(level in 1u32..30) {
            prop_assert!(Player::xp_for_level(level + 1) > Player::xp_for_level(level));
        }
    }
}
