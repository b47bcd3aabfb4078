//! XP orbs
//!
//! Dropped by dying enemies. An orb drifts until the player's pickup radius
//! reaches it, then magnetizes: accelerating toward the player with a capped
//! magnet speed. Collection is irreversible once triggered.

use glam::{Vec2, Vec4};

use crate::palette;

/// Magnet acceleration once collection starts (units/s²)
const MAGNET_ACCEL: f32 = 2000.0;
/// Magnet speed cap (units/s)
const MAGNET_MAX_SPEED: f32 = 800.0;
/// Idle drift decay per tick at 60 Hz
const DRIFT_DRAG: f32 = 0.95;

#[derive(Debug, Clone)]
pub struct XpOrb {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub radius: f32,
    pub color: Vec4,

    pub value: u32,
    pub magnet_speed: f32,
    pub being_collected: bool,
    pub lifetime: f32,
    /// Drives the renderer's pulse animation
    pub pulse_timer: f32,

    pub marked_for_deletion: bool,
}

impl XpOrb {
    pub fn new(pos: Vec2, value: u32) -> Self {
        let size = 12.0 + value as f32 * 2.0;
        Self {
            pos,
            vel: Vec2::ZERO,
            size: Vec2::splat(size),
            rotation: 0.0,
            radius: size * 0.5,
            color: palette::XP_GREEN,
            value,
            magnet_speed: 0.0,
            being_collected: false,
            lifetime: 0.0,
            pulse_timer: 0.0,
            marked_for_deletion: false,
        }
    }

    /// Advance one frame. `player` is the player's position and pickup radius
    /// when one exists; without a player the orb simply waits.
    pub fn update(&mut self, dt: f32, player: Option<(Vec2, f32)>) {
        self.lifetime += dt;
        self.pulse_timer += dt * 3.0;

        let Some((player_pos, pickup_radius)) = player else {
            return;
        };

        if self.pos.distance(player_pos) < pickup_radius {
            self.being_collected = true;
        }

        if self.being_collected {
            self.magnet_speed = (self.magnet_speed + MAGNET_ACCEL * dt).min(MAGNET_MAX_SPEED);
            let dir = (player_pos - self.pos).normalize_or_zero();
            self.vel = dir * self.magnet_speed;
        } else {
            // Scatter velocity from the spawn bleeds off
            self.vel *= DRIFT_DRAG.powf(dt * 60.0);
        }

        self.pos += self.vel * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnetizes_inside_pickup_radius() {
        let mut orb = XpOrb::new(Vec2::new(50.0, 0.0), 1);
        orb.update(1.0 / 60.0, Some((Vec2::ZERO, 80.0)));

        assert!(orb.being_collected);
        assert!(orb.vel.x < 0.0, "orb accelerates toward the player");
    }

    #[test]
    fn test_idles_outside_pickup_radius() {
        let mut orb = XpOrb::new(Vec2::new(500.0, 0.0), 1);
        orb.vel = Vec2::new(40.0, 0.0);
        orb.update(1.0 / 60.0, Some((Vec2::ZERO, 80.0)));

        assert!(!orb.being_collected);
        assert!(orb.vel.x < 40.0, "drift decays");
    }

    #[test]
    fn test_collection_is_irreversible() {
        let mut orb = XpOrb::new(Vec2::new(50.0, 0.0), 1);
        orb.update(1.0 / 60.0, Some((Vec2::ZERO, 80.0)));
        assert!(orb.being_collected);

        // Player teleports away; the orb keeps chasing
        orb.update(1.0 / 60.0, Some((Vec2::new(2000.0, 0.0), 80.0)));
        assert!(orb.being_collected);
        assert!(orb.vel.x > 0.0);
    }

    #[test]
    fn test_magnet_speed_is_capped() {
        let mut orb = XpOrb::new(Vec2::new(50.0, 0.0), 1);
        for _ in 0..120 {
            orb.update(1.0 / 60.0, Some((Vec2::new(5000.0, 0.0), 8000.0)));
        }
        assert!(orb.magnet_speed <= MAGNET_MAX_SPEED);
        assert!(orb.vel.length() <= MAGNET_MAX_SPEED + 0.001);
    }
}
