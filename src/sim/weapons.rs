//! Weapons and the weapon manager
//!
//! A closed tagged-variant design mirroring the enemy module: `WeaponKind`
//! picks base stats, `WeaponSpec` carries per-kind state (pierce flags,
//! satellites, the shield pool). Effective stats are always
//! `base * player multiplier`, re-synced every frame and after upgrades;
//! leveling mutates base stats only.

use glam::{Vec2, Vec4};
use rand::Rng;
use std::f32::consts::TAU;

use crate::{dir_from_angle, palette};

use super::entities::EntityManager;
use super::player::Player;
use super::state::{SpriteInstance, TextureHint, UpgradeChoice, UpgradeKind};

/// Weapons stop appearing in the level-up catalog at this level
pub const WEAPON_LEVEL_CAP: u32 = 8;

/// Per-satellite contact damage cadence (seconds)
const SATELLITE_DAMAGE_COOLDOWN: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    Laser,
    Missile,
    Orbital,
    Shield,
    Plasma,
    Spread,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 6] = [
        WeaponKind::Laser,
        WeaponKind::Missile,
        WeaponKind::Orbital,
        WeaponKind::Shield,
        WeaponKind::Plasma,
        WeaponKind::Spread,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::Laser => "Laser",
            WeaponKind::Missile => "Missile",
            WeaponKind::Orbital => "Orbital",
            WeaponKind::Shield => "Shield",
            WeaponKind::Plasma => "Plasma",
            WeaponKind::Spread => "Spread",
        }
    }
}

/// The stat block that exists twice per weapon: once as leveled base values,
/// once as the effective values after the player's multipliers.
#[derive(Debug, Clone, Copy)]
pub struct WeaponStats {
    pub damage: f32,
    /// Shots per second; 0 means the weapon is not cooldown-fired
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub projectile_count: u32,
    pub projectile_size: f32,
}

/// One orbital satellite. Not part of the main entity collections; it lives
/// and dies with its weapon.
#[derive(Debug, Clone)]
pub struct Satellite {
    pub angle: f32,
    pub orbit_radius: f32,
    /// Per-satellite cooldown so sustained overlap ticks, not streams, damage
    pub damage_timer: f32,
    pub pos: Vec2,
}

impl Satellite {
    fn new(angle: f32, orbit_radius: f32) -> Self {
        Self {
            angle,
            orbit_radius,
            damage_timer: 0.0,
            pos: Vec2::ZERO,
        }
    }
}

/// Per-archetype weapon state
#[derive(Debug, Clone)]
pub enum WeaponSpec {
    Laser {
        piercing: bool,
        pierce_count: u32,
    },
    Missile {
        homing_strength: f32,
    },
    Orbital {
        satellites: Vec<Satellite>,
        orbit_speed: f32,
        orbit_radius: f32,
        satellite_size: f32,
        contact_damage: f32,
    },
    Shield {
        radius: f32,
        /// Base aura damage per tick (player damage multiplier applied at use)
        aura_damage: f32,
        tick_rate: f32,
        tick_timer: f32,
        health: f32,
        max_health: f32,
        regen_rate: f32,
        regen_delay: f32,
        regen_timer: f32,
        active: bool,
    },
    Plasma {
        explosion_radius: f32,
    },
    Spread {
        spread_angle: f32,
        pellet_count: u32,
    },
}

pub struct Weapon {
    pub kind: WeaponKind,
    pub level: u32,
    pub base: WeaponStats,
    /// Effective stats: recomputed from the player's multipliers every frame
    pub stats: WeaponStats,
    pub fire_timer: f32,
    pub fire_cooldown: f32,
    pub color: Vec4,
    pub spec: WeaponSpec,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        let (base, color, spec) = match kind {
            WeaponKind::Laser => (
                WeaponStats {
                    damage: 12.0,
                    fire_rate: 3.0,
                    projectile_speed: 600.0,
                    projectile_count: 1,
                    projectile_size: 10.0,
                },
                Vec4::new(0.3, 0.8, 1.0, 1.0),
                WeaponSpec::Laser {
                    piercing: false,
                    pierce_count: 1,
                },
            ),
            WeaponKind::Missile => (
                WeaponStats {
                    damage: 25.0,
                    fire_rate: 1.0,
                    projectile_speed: 300.0,
                    projectile_count: 1,
                    projectile_size: 14.0,
                },
                Vec4::new(1.0, 0.6, 0.2, 1.0),
                WeaponSpec::Missile {
                    homing_strength: 5.0,
                },
            ),
            WeaponKind::Orbital => (
                WeaponStats {
                    damage: 15.0,
                    fire_rate: 0.0,
                    projectile_speed: 0.0,
                    projectile_count: 0,
                    projectile_size: 0.0,
                },
                Vec4::new(0.5, 0.8, 1.0, 1.0),
                WeaponSpec::Orbital {
                    satellites: vec![Satellite::new(0.0, 80.0)],
                    orbit_speed: 3.0,
                    orbit_radius: 80.0,
                    satellite_size: 20.0,
                    contact_damage: 15.0,
                },
            ),
            WeaponKind::Shield => (
                WeaponStats {
                    damage: 5.0,
                    // Governs the manual pulse cadence (one every 5 seconds)
                    fire_rate: 0.2,
                    projectile_speed: 0.0,
                    projectile_count: 0,
                    projectile_size: 0.0,
                },
                palette::SHIELD_CYAN,
                WeaponSpec::Shield {
                    radius: 60.0,
                    aura_damage: 5.0,
                    tick_rate: 0.2,
                    tick_timer: 0.0,
                    health: 50.0,
                    max_health: 50.0,
                    regen_rate: 10.0,
                    regen_delay: 2.0,
                    regen_timer: 0.0,
                    active: true,
                },
            ),
            WeaponKind::Plasma => (
                WeaponStats {
                    damage: 30.0,
                    fire_rate: 0.8,
                    projectile_speed: 0.0,
                    projectile_count: 0,
                    projectile_size: 8.0,
                },
                Vec4::new(0.8, 0.3, 1.0, 1.0),
                WeaponSpec::Plasma {
                    explosion_radius: 80.0,
                },
            ),
            WeaponKind::Spread => (
                WeaponStats {
                    damage: 8.0,
                    fire_rate: 1.5,
                    projectile_speed: 450.0,
                    projectile_count: 1,
                    projectile_size: 6.0,
                },
                Vec4::new(1.0, 0.9, 0.3, 1.0),
                WeaponSpec::Spread {
                    spread_angle: 60.0f32.to_radians(),
                    pellet_count: 5,
                },
            ),
        };

        let fire_cooldown = if base.fire_rate > 0.0 {
            1.0 / base.fire_rate
        } else {
            f32::INFINITY
        };

        Self {
            kind,
            level: 1,
            base,
            stats: base,
            fire_timer: 0.0,
            fire_cooldown,
            color,
            spec,
        }
    }

    pub fn can_fire(&self) -> bool {
        self.fire_timer <= 0.0
    }

    /// Maximum distance at which this weapon acknowledges a target. Aura
    /// weapons (Orbital, Shield) don't target; they return 0.
    pub fn targeting_radius(&self) -> f32 {
        match self.kind {
            WeaponKind::Laser | WeaponKind::Missile | WeaponKind::Spread => 600.0,
            WeaponKind::Plasma => 400.0,
            WeaponKind::Orbital | WeaponKind::Shield => 0.0,
        }
    }

    pub fn update(&mut self, dt: f32, em: &mut EntityManager) {
        if self.fire_timer > 0.0 {
            self.fire_timer -= dt;
        }

        match self.kind {
            WeaponKind::Orbital => self.update_orbital(dt, em),
            WeaponKind::Shield => self.update_shield(dt, em),
            _ => self.update_auto_fire(em),
        }
    }

    /// Cooldown-gated auto-fire: only fires when a target exists within the
    /// targeting radius. No target leaves the elapsed cooldown armed.
    fn update_auto_fire(&mut self, em: &mut EntityManager) {
        if !self.can_fire() {
            return;
        }
        let Some(player_pos) = em.player.as_ref().map(|p| p.pos) else {
            return;
        };
        if em.nearest_enemy(player_pos, self.targeting_radius()).is_none() {
            return;
        }

        self.fire(em);
        self.fire_timer = self.fire_cooldown;
    }

    /// Discharge once, regardless of the cooldown state. Callers normally go
    /// through the auto-fire path; the manager uses this for the shield pulse.
    pub fn fire(&mut self, em: &mut EntityManager) {
        match self.kind {
            WeaponKind::Laser => self.fire_laser(em),
            WeaponKind::Missile => self.fire_missile(em),
            WeaponKind::Orbital => {}
            WeaponKind::Shield => self.fire_shield_pulse(em),
            WeaponKind::Plasma => self.fire_plasma(em),
            WeaponKind::Spread => self.fire_spread(em),
        }
    }

    fn fire_laser(&mut self, em: &mut EntityManager) {
        let Some((player_pos, player_radius)) =
            em.player.as_ref().map(|p| (p.pos, p.radius))
        else {
            return;
        };
        let Some(target) = em.nearest_enemy(player_pos, self.targeting_radius()) else {
            return;
        };
        let dir = (em.enemies[target].pos - player_pos).normalize_or_zero();

        let (piercing, pierce_count) = match self.spec {
            WeaponSpec::Laser {
                piercing,
                pierce_count,
            } => (piercing, pierce_count),
            _ => (false, 0),
        };

        let count = self.stats.projectile_count;
        for i in 0..count {
            // Even spread around the target direction. The divisor is only
            // reached with count > 1; a single shot fires straight.
            let spread_angle = if count > 1 {
                let total = 0.3;
                -total / 2.0 + (total / (count - 1) as f32) * i as f32
            } else {
                0.0
            };

            let shot_dir = Vec2::from_angle(spread_angle).rotate(dir);
            let vel = shot_dir * self.stats.projectile_speed;
            let size = self.stats.projectile_size;
            let damage = self.stats.damage;
            let color = self.color;

            let proj = em.spawn_projectile(player_pos + shot_dir * player_radius, vel, damage, true);
            proj.color = color;
            proj.size = Vec2::new(size, size * 0.5);
            proj.max_lifetime = 2.0;
            if piercing {
                proj.set_piercing(pierce_count);
            }
        }
    }

    fn fire_missile(&mut self, em: &mut EntityManager) {
        let Some((player_pos, player_radius, facing)) = em
            .player
            .as_ref()
            .map(|p| (p.pos, p.radius, p.rotation))
        else {
            return;
        };

        let homing_strength = match self.spec {
            WeaponSpec::Missile { homing_strength } => homing_strength,
            _ => 0.0,
        };

        let count = self.stats.projectile_count.max(1);
        for i in 0..count {
            // Evenly divided launch directions around the player's facing
            let angle = (TAU / count as f32) * i as f32 + facing;
            let dir = dir_from_angle(angle);
            let size = self.stats.projectile_size;
            let damage = self.stats.damage;
            let color = self.color;

            let proj = em.spawn_projectile(
                player_pos + dir * player_radius,
                dir * self.stats.projectile_speed,
                damage,
                true,
            );
            proj.color = color;
            proj.size = Vec2::splat(size);
            proj.max_lifetime = 4.0;
            proj.set_homing(homing_strength);
        }
    }

    fn fire_plasma(&mut self, em: &mut EntityManager) {
        let Some(player_pos) = em.player.as_ref().map(|p| p.pos) else {
            return;
        };
        let Some(target) = em.nearest_enemy(player_pos, self.targeting_radius()) else {
            return;
        };
        let epicenter = em.enemies[target].pos;

        let explosion_radius = match self.spec {
            WeaponSpec::Plasma { explosion_radius } => explosion_radius,
            _ => return,
        };

        // Linear damage falloff from the epicenter
        let damage = self.stats.damage;
        for ei in em.enemies_in_range(epicenter, explosion_radius) {
            let dist = epicenter.distance(em.enemies[ei].pos);
            let falloff = 1.0 - (dist / explosion_radius) * 0.5;
            em.damage_enemy(ei, damage * falloff);
        }

        let color = self.color;
        em.particles
            .spawn_explosion(epicenter, color, 40, 250.0, &mut em.rng);
        em.add_screen_shake(0.4);
    }

    fn fire_spread(&mut self, em: &mut EntityManager) {
        let Some((player_pos, player_radius, facing)) = em
            .player
            .as_ref()
            .map(|p| (p.pos, p.radius, p.rotation))
        else {
            return;
        };

        // Aim at the nearest enemy, or along the facing when nothing is near
        let base_dir = match em.nearest_enemy(player_pos, 500.0) {
            Some(target) => (em.enemies[target].pos - player_pos).normalize_or_zero(),
            None => dir_from_angle(facing),
        };

        let (spread_angle, pellet_count) = match self.spec {
            WeaponSpec::Spread {
                spread_angle,
                pellet_count,
            } => (spread_angle, pellet_count),
            _ => return,
        };

        // Extra projectiles widen the fan
        let total_pellets = pellet_count + self.stats.projectile_count.saturating_sub(1);
        for i in 0..total_pellets {
            let fan_offset = if total_pellets > 1 {
                -spread_angle / 2.0 + (spread_angle / (total_pellets - 1) as f32) * i as f32
            } else {
                0.0
            };
            let jitter = em.rng.random_range(-0.05..0.05);
            let pellet_dir = Vec2::from_angle(fan_offset + jitter).rotate(base_dir);

            let size = self.stats.projectile_size;
            let damage = self.stats.damage;
            let color = self.color;

            let proj = em.spawn_projectile(
                player_pos + pellet_dir * player_radius,
                pellet_dir * self.stats.projectile_speed,
                damage,
                true,
            );
            proj.color = color;
            proj.size = Vec2::splat(size);
            proj.max_lifetime = 1.0; // shorter range than the laser
        }
    }

    fn update_orbital(&mut self, dt: f32, em: &mut EntityManager) {
        let WeaponSpec::Orbital {
            satellites,
            orbit_speed,
            satellite_size,
            contact_damage,
            ..
        } = &mut self.spec
        else {
            return;
        };
        let Some(player_pos) = em.player.as_ref().map(|p| p.pos) else {
            return;
        };
        let damage_mult = em
            .player
            .as_ref()
            .map(|p| p.damage_multiplier)
            .unwrap_or(1.0);

        for sat in satellites.iter_mut() {
            sat.angle += *orbit_speed * dt;
            if sat.angle > TAU {
                sat.angle -= TAU;
            }
            sat.pos = player_pos + dir_from_angle(sat.angle) * sat.orbit_radius;

            if sat.damage_timer > 0.0 {
                sat.damage_timer -= dt;
                continue;
            }

            // First overlapping enemy takes a contact tick
            for ei in 0..em.enemies.len() {
                let enemy = &em.enemies[ei];
                if enemy.marked_for_deletion {
                    continue;
                }
                if sat.pos.distance(enemy.pos) < *satellite_size * 0.5 + enemy.radius {
                    em.damage_enemy(ei, *contact_damage * damage_mult);
                    sat.damage_timer = SATELLITE_DAMAGE_COOLDOWN;
                    let pos = sat.pos;
                    em.particles
                        .spawn_hit_sparks(pos, Vec2::ZERO, palette::CYAN, 5, &mut em.rng);
                    break;
                }
            }
        }
    }

    fn update_shield(&mut self, dt: f32, em: &mut EntityManager) {
        let WeaponSpec::Shield {
            radius,
            aura_damage,
            tick_rate,
            tick_timer,
            health,
            max_health,
            regen_rate,
            regen_delay,
            regen_timer,
            active,
        } = &mut self.spec
        else {
            return;
        };

        if *health < *max_health {
            *regen_timer += dt;
            if *regen_timer >= *regen_delay {
                *health = (*health + *regen_rate * dt).min(*max_health);
            }
        }
        *active = *health > 0.0;
        if !*active {
            return;
        }

        // Aura damage runs on its own cadence, independent of frame rate
        *tick_timer -= dt;
        if *tick_timer > 0.0 {
            return;
        }
        *tick_timer = *tick_rate;

        let Some(player_pos) = em.player.as_ref().map(|p| p.pos) else {
            return;
        };
        let damage_mult = em
            .player
            .as_ref()
            .map(|p| p.damage_multiplier)
            .unwrap_or(1.0);
        let damage = *aura_damage * damage_mult;
        for ei in em.enemies_in_range(player_pos, *radius) {
            em.damage_enemy(ei, damage);
        }
    }

    /// One-shot knockback + damage pulse against a wider radius
    fn fire_shield_pulse(&mut self, em: &mut EntityManager) {
        let WeaponSpec::Shield {
            radius, aura_damage, ..
        } = self.spec
        else {
            return;
        };
        let Some(player_pos) = em.player.as_ref().map(|p| p.pos) else {
            return;
        };
        let damage_mult = em
            .player
            .as_ref()
            .map(|p| p.damage_multiplier)
            .unwrap_or(1.0);

        for ei in em.enemies_in_range(player_pos, radius * 1.5) {
            let knockback = (em.enemies[ei].pos - player_pos).normalize_or_zero() * 200.0;
            em.enemies[ei].vel += knockback;
            em.damage_enemy(ei, aura_damage * 3.0 * damage_mult);
        }

        em.particles
            .spawn_explosion(player_pos, palette::SHIELD_CYAN, 30, 200.0, &mut em.rng);
    }

    /// Absorb damage into the shield pool (resets the regen delay)
    pub fn take_shield_damage(&mut self, amount: f32) {
        if let WeaponSpec::Shield {
            health,
            regen_timer,
            ..
        } = &mut self.spec
        {
            *health = (*health - amount).max(0.0);
            *regen_timer = 0.0;
        }
    }

    /// Recompute effective stats from the player's multipliers. Called once
    /// per frame and again right after an upgrade is applied.
    pub fn update_stats(&mut self, player: &Player) {
        self.stats.damage = self.base.damage * player.damage_multiplier;
        self.stats.fire_rate = self.base.fire_rate * player.fire_rate_multiplier;
        self.fire_cooldown = if self.stats.fire_rate > 0.0 {
            1.0 / self.stats.fire_rate
        } else {
            f32::INFINITY
        };
        self.stats.projectile_count = self.base.projectile_count + player.projectile_count_bonus;
        self.stats.projectile_size = self.base.projectile_size * player.projectile_size_multiplier;
        self.stats.projectile_speed = self.base.projectile_speed;
    }

    /// Level milestones mutate base stats; effective stats follow at the next
    /// stat sync.
    pub fn level_up(&mut self) {
        self.level += 1;

        match &mut self.spec {
            WeaponSpec::Laser {
                piercing,
                pierce_count,
            } => {
                self.base.damage *= 1.2;
                self.base.fire_rate *= 1.1;
                if self.level % 3 == 0 {
                    if !*piercing {
                        *piercing = true;
                        *pierce_count = 2;
                    } else {
                        *pierce_count += 1;
                    }
                }
                if self.level % 2 == 0 {
                    self.base.projectile_count += 1;
                }
            }
            WeaponSpec::Missile { homing_strength } => {
                self.base.damage *= 1.2;
                self.base.fire_rate *= 1.1;
                *homing_strength += 0.5;
                if self.level % 3 == 0 {
                    self.base.projectile_count += 1;
                }
            }
            WeaponSpec::Orbital {
                satellites,
                orbit_speed,
                orbit_radius,
                contact_damage,
                ..
            } => {
                *contact_damage *= 1.2;
                *orbit_speed += 0.3;
                if self.level % 2 == 0 && satellites.len() < 8 {
                    let angle = satellites
                        .last()
                        .map(|s| s.angle + TAU / (satellites.len() + 1) as f32)
                        .unwrap_or(0.0);
                    satellites.push(Satellite::new(angle, *orbit_radius));
                }
                if self.level % 3 == 0 {
                    *orbit_radius += 15.0;
                    for sat in satellites.iter_mut() {
                        sat.orbit_radius = *orbit_radius;
                    }
                }
            }
            WeaponSpec::Shield {
                radius,
                aura_damage,
                health,
                max_health,
                regen_rate,
                ..
            } => {
                *radius += 10.0;
                *aura_damage *= 1.2;
                *max_health += 20.0;
                *health = *max_health;
                *regen_rate += 2.0;
            }
            WeaponSpec::Plasma { explosion_radius } => {
                self.base.damage *= 1.2;
                self.base.fire_rate *= 1.1;
                *explosion_radius += 15.0;
                if self.level % 2 == 0 {
                    self.base.fire_rate += 0.2;
                }
            }
            WeaponSpec::Spread {
                spread_angle,
                pellet_count,
            } => {
                self.base.damage *= 1.2;
                self.base.fire_rate *= 1.1;
                if self.level % 2 == 0 {
                    *pellet_count += 2;
                }
                if self.level % 3 == 0 {
                    *spread_angle += 10.0f32.to_radians();
                }
            }
        }
    }

    /// HUD line, e.g. "Laser Lv.3 (Pierce x2)"
    pub fn description(&self) -> String {
        let base = format!("{} Lv.{}", self.kind.name(), self.level);
        match &self.spec {
            WeaponSpec::Laser {
                piercing: true,
                pierce_count,
            } => format!("{base} (Pierce x{pierce_count})"),
            WeaponSpec::Missile { .. } => format!("{base} (Homing)"),
            WeaponSpec::Orbital { satellites, .. } => {
                format!("{base} ({} sats)", satellites.len())
            }
            WeaponSpec::Plasma { .. } => format!("{base} (AOE)"),
            WeaponSpec::Spread { pellet_count, .. } => {
                format!("{base} ({pellet_count} pellets)")
            }
            _ => base,
        }
    }
}

/// Owns every weapon the player has acquired
pub struct WeaponManager {
    pub weapons: Vec<Weapon>,
}

impl Default for WeaponManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WeaponManager {
    /// Every run starts with the basic laser
    pub fn new() -> Self {
        Self {
            weapons: vec![Weapon::new(WeaponKind::Laser)],
        }
    }

    /// Sync effective stats from the player, then run every weapon's
    /// auto-fire / aura logic.
    pub fn update(&mut self, dt: f32, em: &mut EntityManager) {
        if let Some(player) = &em.player {
            for weapon in &mut self.weapons {
                weapon.update_stats(player);
            }
        }
        for weapon in &mut self.weapons {
            weapon.update(dt, em);
        }
    }

    /// Acquire a weapon. Picking an already-owned kind levels it instead.
    /// Returns true when a new weapon was added.
    pub fn add_weapon(&mut self, kind: WeaponKind) -> bool {
        if self.has_weapon(kind) {
            self.upgrade_weapon(kind);
            return false;
        }
        self.weapons.push(Weapon::new(kind));
        true
    }

    pub fn has_weapon(&self, kind: WeaponKind) -> bool {
        self.weapons.iter().any(|w| w.kind == kind)
    }

    pub fn get_weapon_mut(&mut self, kind: WeaponKind) -> Option<&mut Weapon> {
        self.weapons.iter_mut().find(|w| w.kind == kind)
    }

    pub fn upgrade_weapon(&mut self, kind: WeaponKind) {
        if let Some(weapon) = self.get_weapon_mut(kind) {
            weapon.level_up();
        }
    }

    pub fn update_all_stats(&mut self, player: &Player) {
        for weapon in &mut self.weapons {
            weapon.update_stats(player);
        }
    }

    /// Manual shield pulse, rate-limited by the shield's own cooldown.
    /// A no-op without an owned shield.
    pub fn trigger_shield_pulse(&mut self, em: &mut EntityManager) {
        let Some(shield) = self.get_weapon_mut(WeaponKind::Shield) else {
            return;
        };
        if !shield.can_fire() {
            return;
        }
        shield.fire(em);
        shield.fire_timer = shield.fire_cooldown;
    }

    pub fn weapon_count(&self) -> usize {
        self.weapons.len()
    }

    /// Build the full level-up catalog: the flat stat upgrades, every unowned
    /// weapon, and a level-up entry for every owned weapon below the cap. The
    /// director shuffles and trims this into the presented menu.
    pub fn available_upgrades(&self) -> Vec<UpgradeChoice> {
        let mut choices = vec![
            UpgradeChoice::stat(
                "+20% Damage",
                "Increase all weapon damage",
                UpgradeKind::Damage,
                0.2,
            ),
            UpgradeChoice::stat("+15% Fire Rate", "Shoot faster", UpgradeKind::FireRate, 0.15),
            UpgradeChoice::stat(
                "+1 Projectile",
                "Fire additional projectiles",
                UpgradeKind::ProjectileCount,
                1.0,
            ),
            UpgradeChoice::stat(
                "+20% Proj Size",
                "Bigger projectiles",
                UpgradeKind::ProjectileSize,
                0.2,
            ),
            UpgradeChoice::stat("+25 Move Speed", "Move faster", UpgradeKind::MoveSpeed, 25.0),
            UpgradeChoice::stat(
                "+25 Max Health",
                "Increase maximum health",
                UpgradeKind::MaxHealth,
                25.0,
            ),
            UpgradeChoice::stat(
                "+30% Pickup Range",
                "Collect XP from further",
                UpgradeKind::PickupRadius,
                24.0,
            ),
        ];

        let new_weapon_flavor = |kind: WeaponKind| -> (&'static str, &'static str) {
            match kind {
                WeaponKind::Laser => ("Laser", "Auto-targeting laser"),
                WeaponKind::Missile => ("Homing Missiles", "Missiles that seek enemies"),
                WeaponKind::Orbital => ("Orbital Drones", "Satellites that orbit you"),
                WeaponKind::Shield => ("Energy Shield", "Protective damage aura"),
                WeaponKind::Plasma => ("Plasma Bombs", "AOE explosions"),
                WeaponKind::Spread => ("Spread Shot", "Shotgun-style spread"),
            }
        };

        for kind in WeaponKind::ALL {
            if !self.has_weapon(kind) {
                let (name, description) = new_weapon_flavor(kind);
                choices.push(UpgradeChoice {
                    name: name.to_string(),
                    description: description.to_string(),
                    kind: UpgradeKind::NewWeapon(kind),
                    value: 0.0,
                });
            }
        }

        for weapon in &self.weapons {
            if weapon.level < WEAPON_LEVEL_CAP {
                choices.push(UpgradeChoice {
                    name: format!("{} Upgrade", weapon.kind.name()),
                    description: format!("Level up to Lv.{}", weapon.level + 1),
                    kind: UpgradeKind::WeaponLevel(weapon.kind),
                    value: 0.0,
                });
            }
        }

        choices
    }

    /// Weapon visuals the entity sprite pass doesn't cover (satellites, the
    /// shield bubble), drawn above the player.
    pub fn for_each_sprite(&self, player_pos: Vec2, mut f: impl FnMut(SpriteInstance)) {
        for weapon in &self.weapons {
            match &weapon.spec {
                WeaponSpec::Orbital {
                    satellites,
                    satellite_size,
                    ..
                } => {
                    for sat in satellites {
                        f(SpriteInstance {
                            pos: sat.pos,
                            size: Vec2::splat(*satellite_size),
                            rotation: sat.angle * 2.0,
                            color: weapon.color,
                            texture: TextureHint::Satellite,
                        });
                    }
                }
                WeaponSpec::Shield {
                    radius,
                    health,
                    max_health,
                    active: true,
                    ..
                } => {
                    let mut color = weapon.color;
                    color.w *= 0.2 + 0.3 * (health / max_health);
                    f(SpriteInstance {
                        pos: player_pos,
                        size: Vec2::splat(radius * 2.0),
                        rotation: 0.0,
                        color,
                        texture: TextureHint::ShieldBubble,
                    });
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::state::FrameInput;

    const DT: f32 = 1.0 / 60.0;

    fn arena() -> EntityManager {
        let mut em = EntityManager::with_particle_capacity(99, 256);
        em.spawn_player();
        em
    }

    #[test]
    fn test_effective_stats_follow_player_multipliers() {
        let mut em = arena();
        if let Some(p) = &mut em.player {
            p.damage_multiplier = 2.0;
            p.fire_rate_multiplier = 1.5;
            p.projectile_count_bonus = 2;
            p.projectile_size_multiplier = 1.1;
        }

        let mut weapon = Weapon::new(WeaponKind::Laser);
        weapon.update_stats(em.player.as_ref().expect("player spawned"));

        assert_eq!(weapon.stats.damage, 24.0);
        assert_eq!(weapon.stats.fire_rate, 4.5);
        assert_eq!(weapon.stats.projectile_count, 3);
        assert!((weapon.fire_cooldown - 1.0 / 4.5).abs() < 1e-6);
        // Base stats untouched
        assert_eq!(weapon.base.damage, 12.0);
    }

    #[test]
    fn test_laser_single_shot_fires_straight() {
        let mut em = arena();
        em.spawn_enemy(EnemyKind::Basic, Vec2::new(200.0, 0.0));

        let mut weapon = Weapon::new(WeaponKind::Laser);
        weapon.fire(&mut em);

        assert_eq!(em.projectiles.len(), 1);
        let vel = em.projectiles[0].vel;
        assert!(vel.x > 0.0);
        assert!(vel.y.abs() < 1e-3, "single shot must not inherit NaN spread");
        assert!(vel.is_finite());
    }

    #[test]
    fn test_laser_spread_fans_around_target() {
        let mut em = arena();
        em.spawn_enemy(EnemyKind::Basic, Vec2::new(200.0, 0.0));

        let mut weapon = Weapon::new(WeaponKind::Laser);
        weapon.stats.projectile_count = 3;
        weapon.fire(&mut em);

        assert_eq!(em.projectiles.len(), 3);
        let angles: Vec<f32> = em
            .projectiles
            .iter()
            .map(|p| p.vel.y.atan2(p.vel.x))
            .collect();
        assert!((angles[0] - (-0.15)).abs() < 1e-3);
        assert!(angles[1].abs() < 1e-3);
        assert!((angles[2] - 0.15).abs() < 1e-3);
    }

    #[test]
    fn test_laser_milestones() {
        let mut weapon = Weapon::new(WeaponKind::Laser);
        weapon.level_up(); // 2: +1 projectile
        weapon.level_up(); // 3: pierce kicks in

        assert_eq!(weapon.base.projectile_count, 2);
        match weapon.spec {
            WeaponSpec::Laser {
                piercing,
                pierce_count,
            } => {
                assert!(piercing);
                assert_eq!(pierce_count, 2);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_no_target_suppresses_fire_without_resetting_cooldown() {
        let mut em = arena();
        let mut weapon = Weapon::new(WeaponKind::Laser);

        weapon.update(DT, &mut em);
        assert_eq!(em.projectiles.len(), 0);
        assert!(weapon.can_fire(), "cooldown stays armed while no target");

        // A target appears: the very next update fires
        em.spawn_enemy(EnemyKind::Basic, Vec2::new(100.0, 0.0));
        weapon.update(DT, &mut em);
        assert_eq!(em.projectiles.len(), 1);
        assert!(!weapon.can_fire());
    }

    #[test]
    fn test_plasma_falloff() {
        let mut em = arena();
        if let Some(p) = &mut em.player {
            p.pos = Vec2::new(-300.0, 0.0);
        }
        // One enemy at the epicenter, one at the rim of the blast
        em.spawn_enemy(EnemyKind::Tank, Vec2::new(50.0, 0.0));
        em.spawn_enemy(EnemyKind::Tank, Vec2::new(120.0, 0.0));

        let mut weapon = Weapon::new(WeaponKind::Plasma);
        weapon.fire(&mut em);

        let center_dmg = em.enemies[0].max_health - em.enemies[0].health;
        let rim_dmg = em.enemies[1].max_health - em.enemies[1].health;
        assert_eq!(center_dmg, 30.0);
        assert!(rim_dmg > 0.0 && rim_dmg < center_dmg);
    }

    #[test]
    fn test_spread_pellet_count_scales() {
        let mut em = arena();
        em.spawn_enemy(EnemyKind::Basic, Vec2::new(200.0, 0.0));

        let mut weapon = Weapon::new(WeaponKind::Spread);
        weapon.fire(&mut em);
        assert_eq!(em.projectiles.len(), 5);

        em.projectiles.clear();
        weapon.level_up(); // level 2: +2 pellets
        weapon.fire(&mut em);
        assert_eq!(em.projectiles.len(), 7);
    }

    #[test]
    fn test_orbital_contact_cooldown_gates_damage() {
        let mut em = arena();
        // Enemy parked right on the satellite ring (angle 0 => +x)
        em.spawn_enemy(EnemyKind::Tank, Vec2::new(80.0, 0.0));

        let mut weapon = Weapon::new(WeaponKind::Orbital);
        weapon.update(DT, &mut em);
        let hp_after_first = em.enemies[0].health;
        assert!(hp_after_first < em.enemies[0].max_health);

        // Next tick is inside the satellite's damage cooldown
        weapon.update(DT, &mut em);
        assert_eq!(em.enemies[0].health, hp_after_first);
    }

    #[test]
    fn test_orbital_levels_add_satellites_up_to_cap() {
        let mut weapon = Weapon::new(WeaponKind::Orbital);
        for _ in 0..20 {
            weapon.level_up();
        }
        match &weapon.spec {
            WeaponSpec::Orbital { satellites, .. } => assert_eq!(satellites.len(), 8),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_shield_aura_ticks_on_cadence() {
        let mut em = arena();
        em.spawn_enemy(EnemyKind::Tank, Vec2::new(30.0, 0.0)); // inside the aura

        let mut weapon = Weapon::new(WeaponKind::Shield);
        weapon.update(DT, &mut em);
        let hp_after_first = em.enemies[0].health;
        assert_eq!(hp_after_first, em.enemies[0].max_health - 5.0);

        // A few frames later the tick timer is still running
        for _ in 0..5 {
            weapon.update(DT, &mut em);
        }
        assert_eq!(em.enemies[0].health, hp_after_first);

        // Past the 0.2s cadence it ticks again
        for _ in 0..10 {
            weapon.update(DT, &mut em);
        }
        assert_eq!(em.enemies[0].health, hp_after_first - 5.0);
    }

    #[test]
    fn test_shield_regenerates_after_delay() {
        let mut em = arena();
        let mut weapon = Weapon::new(WeaponKind::Shield);
        weapon.take_shield_damage(30.0);

        // Inside the regen delay nothing recovers
        for _ in 0..60 {
            weapon.update(DT, &mut em);
        }
        let health_mid = match &weapon.spec {
            WeaponSpec::Shield { health, .. } => *health,
            _ => unreachable!(),
        };
        assert_eq!(health_mid, 20.0);

        // Two more seconds: past the delay, regen is flowing
        for _ in 0..120 {
            weapon.update(DT, &mut em);
        }
        let health_late = match &weapon.spec {
            WeaponSpec::Shield { health, .. } => *health,
            _ => unreachable!(),
        };
        assert!(health_late > health_mid);
    }

    #[test]
    fn test_shield_pulse_knockback_and_rate_limit() {
        let mut em = arena();
        em.spawn_enemy(EnemyKind::Tank, Vec2::new(50.0, 0.0));

        let mut wm = WeaponManager::new();
        wm.add_weapon(WeaponKind::Shield);

        wm.trigger_shield_pulse(&mut em);
        assert!(em.enemies[0].vel.x > 0.0, "pushed away from the player");
        assert!(em.enemies[0].health < em.enemies[0].max_health);

        // Immediately pulsing again is swallowed by the cooldown
        let hp = em.enemies[0].health;
        em.enemies[0].vel = Vec2::ZERO;
        wm.trigger_shield_pulse(&mut em);
        assert_eq!(em.enemies[0].health, hp);
        assert_eq!(em.enemies[0].vel, Vec2::ZERO);
    }

    #[test]
    fn test_missiles_launch_evenly_and_home() {
        let mut em = arena();
        em.spawn_enemy(EnemyKind::Basic, Vec2::new(300.0, 0.0));

        let mut weapon = Weapon::new(WeaponKind::Missile);
        weapon.stats.projectile_count = 4;
        weapon.fire(&mut em);

        assert_eq!(em.projectiles.len(), 4);
        for proj in &em.projectiles {
            assert!(proj.homing);
            assert_eq!(proj.max_lifetime, 4.0);
        }
    }

    #[test]
    fn test_catalog_offers_unowned_weapons_and_levelups() {
        let wm = WeaponManager::new();
        let catalog = wm.available_upgrades();

        // 7 stat upgrades + 5 unowned weapons + 1 laser level-up
        assert_eq!(catalog.len(), 13);
        assert!(catalog
            .iter()
            .any(|c| c.kind == UpgradeKind::NewWeapon(WeaponKind::Plasma)));
        assert!(catalog
            .iter()
            .any(|c| c.kind == UpgradeKind::WeaponLevel(WeaponKind::Laser)));
        // The owned laser is not offered as a new weapon
        assert!(!catalog
            .iter()
            .any(|c| c.kind == UpgradeKind::NewWeapon(WeaponKind::Laser)));
    }

    #[test]
    fn test_catalog_drops_capped_weapons() {
        let mut wm = WeaponManager::new();
        if let Some(w) = wm.get_weapon_mut(WeaponKind::Laser) {
            w.level = WEAPON_LEVEL_CAP;
        }
        let catalog = wm.available_upgrades();
        assert!(!catalog
            .iter()
            .any(|c| c.kind == UpgradeKind::WeaponLevel(WeaponKind::Laser)));
    }

    #[test]
    fn test_add_owned_weapon_levels_instead() {
        let mut wm = WeaponManager::new();
        assert!(!wm.add_weapon(WeaponKind::Laser));
        assert_eq!(
            wm.get_weapon_mut(WeaponKind::Laser).map(|w| w.level),
            Some(2)
        );
        assert!(wm.add_weapon(WeaponKind::Spread));
        assert_eq!(wm.weapon_count(), 2);
    }

    #[test]
    fn test_manager_full_frame_fires_starting_laser() {
        let mut em = arena();
        em.spawn_enemy(EnemyKind::Basic, Vec2::new(150.0, 0.0));

        let mut wm = WeaponManager::new();
        em.update(&FrameInput::default(), DT);
        wm.update(DT, &mut em);

        assert!(em.projectile_count() > 0);
    }
}
