//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clamped variable timestep (callers cap dt at `consts::MAX_DELTA_TIME`)
//! - Seeded RNG only
//! - No rendering or platform dependencies
//!
//! Per-frame data flow: input -> `EntityManager::update` (player, enemies,
//! projectiles, orbs, particles, collisions, cleanup) -> `WeaponManager::update`
//! (auto-fire, stat sync) -> `Director::update` (spawning, difficulty, level-up
//! orchestration). The render pass consumes entity state read-only afterwards.

pub mod director;
pub mod entities;
pub mod enemy;
pub mod orb;
pub mod particles;
pub mod player;
pub mod projectile;
pub mod state;
pub mod weapons;

pub use director::Director;
pub use entities::EntityManager;
pub use enemy::{Enemy, EnemyKind};
pub use orb::XpOrb;
pub use particles::{Particle, ParticlePool};
pub use player::Player;
pub use projectile::Projectile;
pub use state::{FrameInput, GameEvent, SpriteInstance, TextureHint, UpgradeChoice, UpgradeKind};
pub use weapons::{Weapon, WeaponKind, WeaponManager};
