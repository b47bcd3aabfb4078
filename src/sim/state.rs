//! Shared simulation types
//!
//! Frame input, the per-frame event queue, upgrade records and the render-sink
//! view types. Everything the outer shell exchanges with the sim goes through
//! these.

use glam::{Vec2, Vec4};

use super::enemy::EnemyKind;
use super::weapons::WeaponKind;

/// Input intent for a single frame (deterministic)
///
/// The shell translates raw devices into this; the sim never reads input
/// hardware. Discrete menu actions (upgrade selection, pause) go to the
/// [`Director`](super::Director) instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Movement intent. Magnitudes above 1 are normalized by the player so
    /// diagonals grant no speed boost.
    pub move_dir: Vec2,
}

/// Notifications produced during a frame, drained by the director
///
/// The sim pushes these while updating; the surrounding game-state machine
/// consumes them (level-up menu, game-over transition, score tallies).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Player crossed an XP threshold (one event per level gained)
    LevelUp { level: u32 },
    /// Player health reached zero (emitted exactly once)
    PlayerDied,
    /// An enemy was destroyed
    EnemyKilled { kind: EnemyKind },
    /// An XP orb was picked up
    XpCollected { amount: u32 },
}

/// What a level-up choice does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeKind {
    /// Additive bonus to the player's damage multiplier
    Damage,
    /// Additive bonus to the player's fire-rate multiplier
    FireRate,
    /// Flat extra projectiles on every projectile weapon
    ProjectileCount,
    /// Additive bonus to the projectile-size multiplier
    ProjectileSize,
    /// Flat move-speed bonus (units/sec)
    MoveSpeed,
    /// Flat max-health bonus (also heals by the same amount)
    MaxHealth,
    /// Flat pickup-radius bonus (units)
    PickupRadius,
    /// Acquire a weapon the player doesn't own yet
    NewWeapon(WeaponKind),
    /// Level up an already-owned weapon
    WeaponLevel(WeaponKind),
}

/// One entry in the level-up menu
#[derive(Debug, Clone)]
pub struct UpgradeChoice {
    pub name: String,
    pub description: String,
    pub kind: UpgradeKind,
    /// Multiplier delta or flat bonus; unused for weapon choices
    pub value: f32,
}

impl UpgradeChoice {
    pub fn stat(name: &str, description: &str, kind: UpgradeKind, value: f32) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            value,
        }
    }
}

/// Texture hint for the render sink. The renderer maps these to whatever
/// sprites it has loaded; the sim only names what a thing is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureHint {
    Ship,
    Enemy(EnemyKind),
    Projectile,
    Orb,
    Particle,
    Satellite,
    ShieldBubble,
}

/// Everything the renderer needs for one draw call
#[derive(Debug, Clone, Copy)]
pub struct SpriteInstance {
    pub pos: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub color: Vec4,
    pub texture: TextureHint,
}
