//! Entity manager
//!
//! Sole owner of the player and the enemy/projectile/orb collections plus the
//! particle pool. Drives the fixed per-frame order:
//!
//! player -> enemies -> projectiles -> orbs -> particles -> collision pass ->
//! purge
//!
//! Nothing erases from a collection while it is being iterated; entities set
//! `marked_for_deletion` and the purge sweep removes them at the end of the
//! frame. A marked entity is never collision-checked again.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f32::consts::TAU;

use crate::consts::MAX_PARTICLES;
use crate::{circle_overlap, palette};

use super::enemy::{self, BossShot, Enemy, EnemyKind};
use super::orb::XpOrb;
use super::particles::ParticlePool;
use super::player::Player;
use super::projectile::Projectile;
use super::state::{FrameInput, GameEvent, SpriteInstance, TextureHint};

/// Boss ring-attack projectile tuning
const BOSS_SHOT_DAMAGE: f32 = 15.0;
const BOSS_SHOT_LIFETIME: f32 = 3.0;

pub struct EntityManager {
    pub player: Option<Player>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub orbs: Vec<XpOrb>,
    pub particles: ParticlePool,

    /// Session RNG; a fixed seed replays identically
    pub rng: Pcg32,

    /// Notifications produced this frame, drained by the director
    pub events: Vec<GameEvent>,

    /// Decaying shake magnitude (0..1) the renderer may consume
    pub screen_shake: f32,

    seed: u64,
}

impl EntityManager {
    pub fn new(seed: u64) -> Self {
        Self::with_particle_capacity(seed, MAX_PARTICLES)
    }

    /// Quality presets size the particle pool smaller; capacity is fixed for
    /// the life of the session.
    pub fn with_particle_capacity(seed: u64, particle_capacity: usize) -> Self {
        Self {
            player: None,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            orbs: Vec::new(),
            particles: ParticlePool::new(particle_capacity),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            screen_shake: 0.0,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Advance every entity one frame. `dt` is expected pre-clamped to
    /// `consts::MAX_DELTA_TIME` by the caller.
    pub fn update(&mut self, input: &FrameInput, dt: f32) {
        self.screen_shake *= 0.9f32.powf(dt * 60.0);
        if self.screen_shake < 0.01 {
            self.screen_shake = 0.0;
        }

        // Player
        if let Some(player) = &mut self.player {
            player.move_input = input.move_dir;
            player.update(dt);
        }

        // Enemies. Boss ring shots are queued and spawned after the loop so
        // the projectile list is never mutated mid-iteration.
        let player_pos = self.player.as_ref().map(|p| p.pos);
        let mut boss_shots: Vec<BossShot> = Vec::new();
        for enemy in &mut self.enemies {
            enemy.update(dt, player_pos, &self.projectiles, &mut self.rng, &mut boss_shots);
        }
        for shot in boss_shots {
            let proj = self.spawn_projectile(shot.pos, shot.vel, BOSS_SHOT_DAMAGE, false);
            proj.color = palette::PURPLE;
            proj.max_lifetime = BOSS_SHOT_LIFETIME;
        }

        // Projectiles
        for proj in &mut self.projectiles {
            proj.update(dt, &self.enemies);
        }

        // XP orbs
        let magnet = self.player.as_ref().map(|p| (p.pos, p.pickup_radius));
        for orb in &mut self.orbs {
            orb.update(dt, magnet);
        }

        // Particles
        self.particles.update(dt);

        self.update_collisions();

        self.cleanup();
    }

    fn update_collisions(&mut self) {
        self.projectile_pass();
        self.contact_pass();
        self.pickup_pass();
    }

    /// Projectiles vs the opposing side only: player shots against enemies,
    /// enemy shots against the player. A projectile marked mid-sweep stops
    /// testing further targets this frame.
    fn projectile_pass(&mut self) {
        for pi in 0..self.projectiles.len() {
            if self.projectiles[pi].marked_for_deletion {
                continue;
            }

            if self.projectiles[pi].from_player {
                for ei in 0..self.enemies.len() {
                    let enemy = &self.enemies[ei];
                    if enemy.marked_for_deletion {
                        continue;
                    }
                    let proj = &self.projectiles[pi];
                    if !circle_overlap(proj.pos, proj.radius, enemy.pos, enemy.radius) {
                        continue;
                    }

                    let damage = proj.damage;
                    self.damage_enemy(ei, damage);
                    self.projectiles[pi].register_hit();
                    if self.projectiles[pi].marked_for_deletion {
                        break;
                    }
                }
            } else {
                let hit = match &self.player {
                    Some(player) => {
                        let proj = &self.projectiles[pi];
                        circle_overlap(proj.pos, proj.radius, player.pos, player.radius)
                    }
                    None => false,
                };
                if hit {
                    let damage = self.projectiles[pi].damage;
                    self.hurt_player(damage);
                    self.projectiles[pi].register_hit();
                }
            }
        }
    }

    /// Player/enemy contact damage, gated by each enemy's own attack cooldown
    /// so sustained contact ticks at the enemy's cadence, not every frame.
    fn contact_pass(&mut self) {
        let Some((player_pos, player_radius)) =
            self.player.as_ref().map(|p| (p.pos, p.radius))
        else {
            return;
        };

        for ei in 0..self.enemies.len() {
            let contact = {
                let enemy = &mut self.enemies[ei];
                if enemy.marked_for_deletion
                    || enemy.attack_timer > 0.0
                    || !circle_overlap(enemy.pos, enemy.radius, player_pos, player_radius)
                {
                    None
                } else {
                    enemy.attack_timer = enemy.attack_cooldown;
                    Some(enemy.damage)
                }
            };
            if let Some(damage) = contact {
                self.hurt_player(damage);
            }
        }
    }

    /// Player/orb overlap banks the XP, pops a collection visual and deletes
    /// the orb the same frame.
    fn pickup_pass(&mut self) {
        let Some((player_pos, player_radius)) =
            self.player.as_ref().map(|p| (p.pos, p.radius))
        else {
            return;
        };

        for oi in 0..self.orbs.len() {
            let orb = &self.orbs[oi];
            if orb.marked_for_deletion
                || !circle_overlap(orb.pos, orb.radius, player_pos, player_radius)
            {
                continue;
            }

            let (orb_pos, value) = (orb.pos, orb.value);
            self.orbs[oi].marked_for_deletion = true;

            let before = self.events.len();
            if let Some(player) = &mut self.player {
                player.add_experience(value, &mut self.events);
            }
            let leveled = self.events[before..]
                .iter()
                .any(|e| matches!(e, GameEvent::LevelUp { .. }));
            if leveled {
                self.particles.spawn_level_up(player_pos);
            }

            self.events.push(GameEvent::XpCollected { amount: value });
            self.particles.spawn_xp_collect(orb_pos, &mut self.rng);
        }
    }

    /// Route damage to an enemy through the shared death pipeline: a kill
    /// yields exactly one XP orb, one explosion and one kill event (guarded by
    /// the deletion flag); survivors get a hit spark.
    pub fn damage_enemy(&mut self, index: usize, amount: f32) {
        let Some(enemy) = self.enemies.get_mut(index) else {
            return;
        };

        let (pos, color, kind, xp) = (enemy.pos, enemy.color, enemy.kind, enemy.xp_value);
        if enemy.take_damage(amount) {
            self.events.push(GameEvent::EnemyKilled { kind });
            self.spawn_xp_orb(pos, xp);
            self.particles
                .spawn_explosion(pos, color, 15, 150.0, &mut self.rng);
        } else {
            self.particles
                .spawn_hit_sparks(pos, Vec2::ZERO, palette::ORANGE, 3, &mut self.rng);
        }
    }

    /// Route damage to the player (invincibility handled inside), with the
    /// hit feedback effects on an applied hit.
    pub fn hurt_player(&mut self, damage: f32) {
        let Some(player) = &mut self.player else {
            return;
        };

        let was_invincible = player.is_invincible();
        let pos = player.pos;
        player.take_damage(damage, &mut self.events);

        if !was_invincible {
            self.particles
                .spawn_hit_sparks(pos, Vec2::ZERO, palette::RED, 10, &mut self.rng);
            self.add_screen_shake(0.6);
        }
    }

    pub fn add_screen_shake(&mut self, amount: f32) {
        self.screen_shake = self.screen_shake.max(amount).min(1.0);
    }

    // --- Spawning ---

    /// Fresh player at the world center (resets all progression)
    pub fn spawn_player(&mut self) {
        self.player = Some(Player::new());
    }

    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> &mut Enemy {
        let i = self.enemies.len();
        self.enemies.push(Enemy::new(kind, pos));
        &mut self.enemies[i]
    }

    /// Returns a live handle so callers can customize color/size/homing/
    /// piercing after construction. The handle must not outlive the frame.
    pub fn spawn_projectile(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        damage: f32,
        from_player: bool,
    ) -> &mut Projectile {
        let i = self.projectiles.len();
        self.projectiles
            .push(Projectile::new(pos, vel, damage, from_player));
        &mut self.projectiles[i]
    }

    pub fn spawn_xp_orb(&mut self, pos: Vec2, value: u32) {
        let mut orb = XpOrb::new(pos, value);
        let angle = self.rng.random_range(0.0..TAU);
        orb.vel = Vec2::new(angle.cos(), angle.sin()) * self.rng.random_range(30.0..80.0);
        self.orbs.push(orb);
    }

    // --- Queries (index handles, never references) ---

    /// Nearest live enemy to `pos`; `max_range <= 0` means unbounded
    pub fn nearest_enemy(&self, pos: Vec2, max_range: f32) -> Option<usize> {
        enemy::nearest_enemy(&self.enemies, pos, max_range)
    }

    pub fn enemies_in_range(&self, pos: Vec2, range: f32) -> Vec<usize> {
        enemy::enemies_in_range(&self.enemies, pos, range)
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.marked_for_deletion).count()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles
            .iter()
            .filter(|p| !p.marked_for_deletion)
            .count()
    }

    // --- Cleanup ---

    /// Purge everything marked this frame (O(n) retain sweep)
    fn cleanup(&mut self) {
        self.enemies.retain(|e| !e.marked_for_deletion);
        self.projectiles.retain(|p| !p.marked_for_deletion);
        self.orbs.retain(|o| !o.marked_for_deletion);
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
        self.projectiles.clear();
        self.orbs.clear();
        self.particles.clear();
        self.events.clear();
    }

    // --- Render sink ---

    /// Visit every visible entity back-to-front: orbs, enemies, player,
    /// projectiles, particles on top. The sim never draws; the renderer maps
    /// each instance to a draw call.
    pub fn for_each_sprite(&self, mut f: impl FnMut(SpriteInstance)) {
        for orb in &self.orbs {
            f(SpriteInstance {
                pos: orb.pos,
                size: orb.size,
                rotation: orb.rotation,
                color: orb.color,
                texture: TextureHint::Orb,
            });
        }
        for enemy in &self.enemies {
            f(SpriteInstance {
                pos: enemy.pos,
                size: enemy.size,
                rotation: enemy.rotation,
                color: enemy.color,
                texture: TextureHint::Enemy(enemy.kind),
            });
        }
        if let Some(player) = &self.player {
            f(SpriteInstance {
                pos: player.pos,
                size: player.size,
                rotation: player.rotation,
                color: player.color,
                texture: TextureHint::Ship,
            });
        }
        for proj in &self.projectiles {
            f(SpriteInstance {
                pos: proj.pos,
                size: proj.size,
                rotation: proj.rotation,
                color: proj.color,
                texture: TextureHint::Projectile,
            });
        }
        self.particles.for_each_active(|p| {
            f(SpriteInstance {
                pos: p.pos,
                size: Vec2::splat(p.size),
                rotation: 0.0,
                color: p.color,
                texture: TextureHint::Particle,
            });
        });
    }
}
