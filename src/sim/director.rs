//! Game director
//!
//! Everything that drives entity/weapon state from outside the entities
//! themselves: the difficulty ramp, enemy/boss spawn scheduling, and level-up
//! orchestration. Menus, pause and game-over screens stay in the shell; the
//! director only consumes the sim's notifications and exposes the resulting
//! state (pending upgrade menu, game over, HUD tallies).

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use std::f32::consts::TAU;

use crate::consts::*;
use crate::dir_from_angle;

use super::enemy::EnemyKind;
use super::entities::EntityManager;
use super::state::{GameEvent, UpgradeChoice, UpgradeKind};
use super::weapons::WeaponManager;

/// Difficulty steps up on this period (seconds)
const DIFFICULTY_INTERVAL: f32 = 30.0;
/// Spawn interval multiplier applied at each difficulty step
const SPAWN_RATE_DECAY: f32 = 0.9;
/// Seconds between boss spawns
const BOSS_INTERVAL: f32 = 60.0;
/// Squad scatter radius around the rolled spawn point
const SQUAD_SCATTER: f32 = 50.0;
/// Entries presented per level-up menu
const CHOICES_PER_MENU: usize = 4;

pub struct Director {
    /// Total time survived (seconds)
    pub survival_time: f32,
    /// Monotonically increasing; unlocks enemy archetypes and squad size
    pub difficulty_level: u32,
    pub spawn_rate: f32,
    pub bosses_defeated: u32,
    pub kills: u32,
    pub total_xp: u32,
    pub game_over: bool,

    /// The currently presented level-up menu (empty when none pending)
    pub choices: Vec<UpgradeChoice>,

    difficulty_timer: f32,
    spawn_timer: f32,
    boss_timer: f32,
    /// Level-ups waiting on a menu; multi-level jumps queue several
    pending_menus: u32,
}

impl Default for Director {
    fn default() -> Self {
        Self::new()
    }
}

impl Director {
    pub fn new() -> Self {
        Self {
            survival_time: 0.0,
            difficulty_level: 1,
            spawn_rate: BASE_SPAWN_RATE,
            bosses_defeated: 0,
            kills: 0,
            total_xp: 0,
            game_over: false,
            choices: Vec::new(),
            difficulty_timer: 0.0,
            spawn_timer: 0.0,
            boss_timer: 0.0,
            pending_menus: 0,
        }
    }

    /// Advance scheduling and consume the frame's notifications. Returns the
    /// drained events so the shell can react (score recording, sounds).
    pub fn update(
        &mut self,
        dt: f32,
        em: &mut EntityManager,
        weapons: &mut WeaponManager,
    ) -> Vec<GameEvent> {
        if self.game_over {
            return std::mem::take(&mut em.events);
        }

        self.survival_time += dt;
        self.update_difficulty(dt);
        self.spawn_enemies(dt, em);

        let events = std::mem::take(&mut em.events);
        for event in &events {
            match event {
                GameEvent::EnemyKilled { kind } => {
                    self.kills += 1;
                    if *kind == EnemyKind::Boss {
                        self.bosses_defeated += 1;
                        log::info!("Boss down ({} total)", self.bosses_defeated);
                    }
                }
                GameEvent::XpCollected { amount } => self.total_xp += amount,
                GameEvent::LevelUp { level } => {
                    self.pending_menus += 1;
                    log::info!("Level up! Now level {level}");
                }
                GameEvent::PlayerDied => {
                    self.game_over = true;
                    log::info!(
                        "Run over: {:.1}s survived, {} kills",
                        self.survival_time,
                        self.kills
                    );
                }
            }
        }

        if self.pending_menus > 0 && self.choices.is_empty() {
            self.generate_choices(em, weapons);
        }

        events
    }

    /// True while a level-up menu is waiting on the player
    pub fn awaiting_choice(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Apply the selected menu entry. Out-of-range indices and calls with no
    /// menu pending are silently ignored.
    pub fn choose_upgrade(
        &mut self,
        index: usize,
        em: &mut EntityManager,
        weapons: &mut WeaponManager,
    ) {
        if index >= self.choices.len() {
            return;
        }
        let choice = self.choices[index].clone();

        match choice.kind {
            UpgradeKind::NewWeapon(kind) => {
                weapons.add_weapon(kind);
            }
            UpgradeKind::WeaponLevel(kind) => weapons.upgrade_weapon(kind),
            _ => {
                if let Some(player) = &mut em.player {
                    player.apply_upgrade(&choice);
                }
            }
        }

        // Multiplier changes take effect immediately, not next frame
        if let Some(player) = &em.player {
            weapons.update_all_stats(player);
        }

        self.choices.clear();
        self.pending_menus = self.pending_menus.saturating_sub(1);
        if self.pending_menus > 0 {
            self.generate_choices(em, weapons);
        }
    }

    fn generate_choices(&mut self, em: &mut EntityManager, weapons: &WeaponManager) {
        let mut all = weapons.available_upgrades();
        all.shuffle(&mut em.rng);
        all.truncate(CHOICES_PER_MENU);
        self.choices = all;
    }

    fn update_difficulty(&mut self, dt: f32) {
        self.difficulty_timer += dt;
        if self.difficulty_timer >= DIFFICULTY_INTERVAL {
            self.difficulty_timer = 0.0;
            self.difficulty_level += 1;
            self.spawn_rate = (self.spawn_rate * SPAWN_RATE_DECAY).max(MIN_SPAWN_RATE);
            log::info!(
                "Difficulty level {} (spawn every {:.2}s)",
                self.difficulty_level,
                self.spawn_rate
            );
        }
    }

    fn spawn_enemies(&mut self, dt: f32, em: &mut EntityManager) {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn_timer = self.spawn_rate;

            // Archetype unlocks ride the difficulty level
            let roll: f32 = em.rng.random_range(0.0..1.0);
            let kind = if self.difficulty_level >= 3 && roll < 0.15 {
                EnemyKind::Fast
            } else if self.difficulty_level >= 2 && roll < 0.25 {
                EnemyKind::Tank
            } else {
                EnemyKind::Basic
            };

            let spawn_pos = self.random_spawn_position(em);
            let count = (1 + self.difficulty_level / 3).min(5);
            for _ in 0..count {
                let r = SQUAD_SCATTER * em.rng.random_range(0.0f32..1.0).sqrt();
                let theta = em.rng.random_range(0.0..TAU);
                let offset = Vec2::new(r * theta.cos(), r * theta.sin());
                em.spawn_enemy(kind, spawn_pos + offset);
            }
        }

        self.boss_timer += dt;
        if self.boss_timer >= BOSS_INTERVAL {
            self.boss_timer = 0.0;

            let pos = self.random_spawn_position(em);
            let defeated = self.bosses_defeated as f32;
            let boss = em.spawn_enemy(EnemyKind::Boss, pos);
            // Each defeated boss makes the next one meaner
            boss.max_health *= 1.0 + defeated * 0.5;
            boss.health = boss.max_health;
            boss.damage *= 1.0 + defeated * 0.2;

            em.add_screen_shake(1.0);
            log::info!("Boss spawned ({:.0} HP)", em.enemies.last().map(|b| b.health).unwrap_or(0.0));
        }
    }

    /// A point on a ring around the player, clamped into the world with a
    /// margin. World center when no player exists.
    fn random_spawn_position(&self, em: &mut EntityManager) -> Vec2 {
        let Some(player_pos) = em.player.as_ref().map(|p| p.pos) else {
            return Vec2::ZERO;
        };

        let angle = em.rng.random_range(0.0..TAU);
        let distance = em
            .rng
            .random_range(SPAWN_DISTANCE_MIN..SPAWN_DISTANCE_MAX);
        let pos = player_pos + dir_from_angle(angle) * distance;

        let half_w = WORLD_WIDTH * 0.5;
        let half_h = WORLD_HEIGHT * 0.5;
        Vec2::new(
            pos.x.clamp(-half_w + 50.0, half_w - 50.0),
            pos.y.clamp(-half_h + 50.0, half_h - 50.0),
        )
    }
}
