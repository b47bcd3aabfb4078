//! Void Swarm - an arcade space survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, weapons, collisions, director)
//! - `highscores`: Top-10 leaderboard with JSON persistence
//! - `settings`: Quality presets and effect toggles
//!
//! Rendering, windowing and audio are external collaborators: the sim exposes
//! sprite data and HUD accessors and never issues draw calls itself.

pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// World extent, centered on the origin
    pub const WORLD_WIDTH: f32 = 3000.0;
    pub const WORLD_HEIGHT: f32 = 3000.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 250.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const PLAYER_PICKUP_RADIUS: f32 = 80.0;

    /// XP curve: required(level) = BASE_XP_REQUIREMENT * XP_SCALING^(level-1)
    pub const BASE_XP_REQUIREMENT: u32 = 10;
    pub const XP_SCALING: f32 = 1.5;

    /// Enemy spawn cadence (seconds between spawn squads)
    pub const BASE_SPAWN_RATE: f32 = 2.0;
    pub const MIN_SPAWN_RATE: f32 = 0.3;
    /// Spawn ring distance from the player
    pub const SPAWN_DISTANCE_MIN: f32 = 400.0;
    pub const SPAWN_DISTANCE_MAX: f32 = 600.0;

    /// Particle pool capacity (slots are reused, never reallocated)
    pub const MAX_PARTICLES: usize = 5000;

    /// Upper bound on a single frame's delta time (seconds). Callers clamp
    /// before passing dt into the sim so frame hitches can't teleport entities.
    pub const MAX_DELTA_TIME: f32 = 0.1;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest signed angular difference from `from` to `to`, in [-π, π)
#[inline]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Circle-circle overlap test via squared distance (no sqrt)
#[inline]
pub fn circle_overlap(p1: Vec2, r1: f32, p2: Vec2, r2: f32) -> bool {
    let sum = r1 + r2;
    p1.distance_squared(p2) < sum * sum
}

/// Unit vector for an angle (radians)
#[inline]
pub fn dir_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Sprite tint constants
pub mod palette {
    use glam::Vec4;

    pub const WHITE: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Vec4 = Vec4::new(1.0, 0.2, 0.2, 1.0);
    pub const ORANGE: Vec4 = Vec4::new(1.0, 0.5, 0.1, 1.0);
    pub const YELLOW: Vec4 = Vec4::new(1.0, 1.0, 0.2, 1.0);
    pub const CYAN: Vec4 = Vec4::new(0.2, 1.0, 1.0, 1.0);
    pub const PURPLE: Vec4 = Vec4::new(0.6, 0.2, 0.8, 1.0);
    pub const PLAYER_BLUE: Vec4 = Vec4::new(0.3, 0.6, 1.0, 1.0);
    pub const XP_GREEN: Vec4 = Vec4::new(0.4, 1.0, 0.4, 1.0);
    pub const SHIELD_CYAN: Vec4 = Vec4::new(0.3, 0.8, 1.0, 0.6);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-5);
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_shortest_arc_crosses_wrap() {
        // From just below π to just above -π is a tiny positive step
        let d = shortest_arc(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_circle_overlap_touching_is_miss() {
        // Exact touch (distance == r1+r2) does not count as overlap
        let a = Vec2::ZERO;
        let b = Vec2::new(10.0, 0.0);
        assert!(!circle_overlap(a, 5.0, b, 5.0));
        assert!(circle_overlap(a, 5.0, b, 5.1));
    }

    proptest! {
        #[test]
        fn normalize_angle_in_range(angle in -100.0f32..100.0) {
            let n = normalize_angle(angle);
            prop_assert!((-PI..PI).contains(&n));
        }

        #[test]
        fn circle_overlap_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            r1 in 0.1f32..100.0, r2 in 0.1f32..100.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            prop_assert_eq!(circle_overlap(a, r1, b, r2), circle_overlap(b, r2, a, r1));
        }
    }
}
