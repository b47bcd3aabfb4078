//! Enemy archetypes and their behavior state machines
//!
//! A closed tagged-variant design: `EnemyKind` picks the base stats at spawn,
//! `Brain` carries the per-archetype state (dodge windows, boss phase). No
//! archetype is open for extension at runtime; adding one means adding a
//! variant here and a stat block in `Enemy::new`.

use glam::{Vec2, Vec4};
use rand::Rng;
use rand_pcg::Pcg32;
use std::f32::consts::TAU;

use super::projectile::Projectile;

/// Player projectiles closer than this may trigger a dodge
const DODGE_TRIGGER_RANGE: f32 = 100.0;
/// Chance per eligible check that a nearby projectile triggers a dodge
const DODGE_CHANCE: f32 = 0.3;
/// How long a dodge burst lasts (seconds)
const DODGE_DURATION: f32 = 0.3;

/// Boss ring-attack cooldown at phase 1 (divided by the current phase)
const BOSS_SPECIAL_COOLDOWN: f32 = 5.0;
const BOSS_RING_SHOT_SPEED: f32 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Basic,
    Tank,
    Fast,
    Boss,
}

/// Per-archetype behavior state
#[derive(Debug, Clone)]
pub enum Brain {
    /// Straight chase (Basic and Tank differ only in stats)
    Chaser,
    /// Chase, with a chance to burst perpendicular to incoming fire
    Dodger {
        /// Counts down the active dodge, then the re-arm cooldown
        dodge_timer: f32,
        /// Cooldown to apply after the current dodge (re-randomized per trigger)
        dodge_cooldown: f32,
        dodge_dir: Vec2,
        dodging: bool,
    },
    /// Chase plus a periodic ring attack, escalating with lost health
    Boss { special_timer: f32, phase: u32 },
}

/// A ring-attack shot requested by a boss this frame. The entity manager
/// turns these into live projectiles after the enemy pass (no mid-iteration
/// spawning).
#[derive(Debug, Clone, Copy)]
pub struct BossShot {
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub radius: f32,
    pub color: Vec4,

    pub kind: EnemyKind,
    pub brain: Brain,

    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub move_speed: f32,
    pub xp_value: u32,

    /// Contact damage cadence: the enemy hits the player at most once per
    /// cooldown, however long the overlap lasts
    pub attack_cooldown: f32,
    pub attack_timer: f32,

    pub marked_for_deletion: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2) -> Self {
        let (health, damage, move_speed, xp_value, size, color) = match kind {
            EnemyKind::Basic => (15.0, 10.0, 100.0, 1, 24.0, Vec4::new(0.9, 0.3, 0.3, 1.0)),
            EnemyKind::Tank => (60.0, 20.0, 50.0, 5, 48.0, Vec4::new(0.6, 0.2, 0.2, 1.0)),
            EnemyKind::Fast => (8.0, 8.0, 200.0, 2, 20.0, Vec4::new(1.0, 0.5, 0.8, 1.0)),
            EnemyKind::Boss => (500.0, 30.0, 60.0, 50, 80.0, Vec4::new(0.5, 0.1, 0.5, 1.0)),
        };

        let brain = match kind {
            EnemyKind::Basic | EnemyKind::Tank => Brain::Chaser,
            EnemyKind::Fast => Brain::Dodger {
                dodge_timer: 0.0,
                dodge_cooldown: 2.0,
                dodge_dir: Vec2::ZERO,
                dodging: false,
            },
            EnemyKind::Boss => Brain::Boss {
                special_timer: 0.0,
                phase: 1,
            },
        };

        Self {
            pos,
            vel: Vec2::ZERO,
            size: Vec2::splat(size),
            rotation: 0.0,
            radius: size * 0.5,
            color,
            kind,
            brain,
            health,
            max_health: health,
            damage,
            move_speed,
            xp_value,
            attack_cooldown: 1.0,
            attack_timer: 0.0,
            marked_for_deletion: false,
        }
    }

    /// Advance one frame. `projectiles` is read-only (dodge checks);
    /// boss ring shots are queued into `boss_shots` for deferred spawning.
    pub fn update(
        &mut self,
        dt: f32,
        player_pos: Option<Vec2>,
        projectiles: &[Projectile],
        rng: &mut Pcg32,
        boss_shots: &mut Vec<BossShot>,
    ) {
        if self.attack_timer > 0.0 {
            self.attack_timer -= dt;
        }

        self.update_behavior(dt, player_pos, projectiles, rng, boss_shots);

        self.pos += self.vel * dt;
    }

    fn update_behavior(
        &mut self,
        dt: f32,
        player_pos: Option<Vec2>,
        projectiles: &[Projectile],
        rng: &mut Pcg32,
        boss_shots: &mut Vec<BossShot>,
    ) {
        // No player: hold course. Never a fault.
        let Some(target) = player_pos else { return };

        match &mut self.brain {
            Brain::Chaser => {
                chase(
                    &mut self.vel,
                    &mut self.rotation,
                    self.pos,
                    target,
                    self.move_speed,
                );
            }

            Brain::Dodger {
                dodge_timer,
                dodge_cooldown,
                dodge_dir,
                dodging,
            } => {
                if *dodge_timer > 0.0 {
                    *dodge_timer -= dt;

                    if *dodging {
                        self.vel = *dodge_dir * self.move_speed * 2.0;
                        if *dodge_timer <= 0.0 {
                            *dodging = false;
                            *dodge_timer = *dodge_cooldown;
                        }
                        return;
                    }
                }

                if *dodge_timer <= 0.0 {
                    for proj in projectiles {
                        if !proj.from_player || proj.marked_for_deletion {
                            continue;
                        }
                        if self.pos.distance(proj.pos) < DODGE_TRIGGER_RANGE
                            && rng.random_range(0.0..1.0) < DODGE_CHANCE
                        {
                            // Perpendicular to the projectile's travel; side is
                            // a coin flip, with no check that it clears the
                            // projectile's path
                            let proj_dir = proj.vel.normalize_or_zero();
                            let mut perp = Vec2::new(-proj_dir.y, proj_dir.x);
                            if rng.random_bool(0.5) {
                                perp = -perp;
                            }
                            *dodge_dir = perp;
                            *dodging = true;
                            *dodge_timer = DODGE_DURATION;
                            *dodge_cooldown = rng.random_range(1.5..3.0);

                            self.vel = perp * self.move_speed * 2.0;
                            return;
                        }
                    }
                    *dodge_timer = *dodge_cooldown;
                }

                chase(
                    &mut self.vel,
                    &mut self.rotation,
                    self.pos,
                    target,
                    self.move_speed,
                );
            }

            Brain::Boss {
                special_timer,
                phase,
            } => {
                // Phase is recomputed from scratch every tick; the check makes
                // no monotonicity assumption about health
                let fraction = self.health / self.max_health;
                (*phase, self.move_speed) = if fraction < 0.3 {
                    (3, 100.0)
                } else if fraction < 0.6 {
                    (2, 80.0)
                } else {
                    (1, 60.0)
                };

                *special_timer -= dt;
                if *special_timer <= 0.0 {
                    *special_timer = BOSS_SPECIAL_COOLDOWN / *phase as f32;

                    let count = 8 * *phase;
                    for i in 0..count {
                        let angle = (TAU / count as f32) * i as f32;
                        let dir = Vec2::new(angle.cos(), angle.sin());
                        boss_shots.push(BossShot {
                            pos: self.pos + dir * self.radius,
                            vel: dir * BOSS_RING_SHOT_SPEED,
                        });
                    }
                }

                chase(
                    &mut self.vel,
                    &mut self.rotation,
                    self.pos,
                    target,
                    self.move_speed,
                );
            }
        }
    }

    /// Subtract health. Returns true when this call destroyed the enemy; the
    /// deletion flag guarantees death is reported at most once.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.marked_for_deletion {
            return false;
        }

        self.health -= amount;
        if self.health <= 0.0 {
            self.marked_for_deletion = true;
            return true;
        }
        false
    }

    /// Current boss phase (1 for non-bosses)
    pub fn phase(&self) -> u32 {
        match self.brain {
            Brain::Boss { phase, .. } => phase,
            _ => 1,
        }
    }
}

/// Index of the nearest live enemy within `max_range` of `pos`.
///
/// `max_range <= 0` means unbounded. Linear scan with a running minimum; ties
/// keep the first encountered. Marked enemies never match.
pub fn nearest_enemy(enemies: &[Enemy], pos: Vec2, max_range: f32) -> Option<usize> {
    let mut nearest = None;
    let mut nearest_dist = if max_range > 0.0 { max_range } else { f32::MAX };

    for (i, enemy) in enemies.iter().enumerate() {
        if enemy.marked_for_deletion {
            continue;
        }
        let dist = pos.distance(enemy.pos);
        if dist < nearest_dist {
            nearest_dist = dist;
            nearest = Some(i);
        }
    }
    nearest
}

/// Indices of all live enemies within `range` of `pos`, in no particular order
pub fn enemies_in_range(enemies: &[Enemy], pos: Vec2, range: f32) -> Vec<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.marked_for_deletion && pos.distance(e.pos) <= range)
        .map(|(i, _)| i)
        .collect()
}

fn chase(vel: &mut Vec2, rotation: &mut f32, pos: Vec2, target: Vec2, speed: f32) {
    let dir = (target - pos).normalize_or_zero();
    *vel = dir * speed;
    if dir != Vec2::ZERO {
        *rotation = dir.y.atan2(dir.x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_chaser_heads_toward_player() {
        let mut enemy = Enemy::new(EnemyKind::Basic, Vec2::new(100.0, 0.0));
        let mut shots = Vec::new();
        enemy.update(1.0 / 60.0, Some(Vec2::ZERO), &[], &mut rng(), &mut shots);

        assert!(enemy.vel.x < 0.0);
        assert!((enemy.vel.length() - enemy.move_speed).abs() < 0.001);
    }

    #[test]
    fn test_no_player_is_a_noop() {
        let mut enemy = Enemy::new(EnemyKind::Basic, Vec2::new(100.0, 0.0));
        let mut shots = Vec::new();
        enemy.update(1.0 / 60.0, None, &[], &mut rng(), &mut shots);
        assert_eq!(enemy.vel, Vec2::ZERO);
        assert_eq!(enemy.pos, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_take_damage_kills_exactly_once() {
        let mut enemy = Enemy::new(EnemyKind::Basic, Vec2::ZERO);
        assert!(!enemy.take_damage(10.0));
        assert!(enemy.take_damage(10.0));
        assert!(enemy.marked_for_deletion);
        // Further hits against the corpse report nothing
        assert!(!enemy.take_damage(10.0));
    }

    #[test]
    fn test_boss_phase_thresholds() {
        let mut boss = Enemy::new(EnemyKind::Boss, Vec2::new(200.0, 0.0));
        let mut shots = Vec::new();
        let tick = |b: &mut Enemy, shots: &mut Vec<BossShot>| {
            b.update(1.0 / 60.0, Some(Vec2::ZERO), &[], &mut rng(), shots);
        };

        tick(&mut boss, &mut shots);
        assert_eq!(boss.phase(), 1);
        assert_eq!(boss.move_speed, 60.0);

        // Exactly 60% of max is still phase 1; just below is phase 2
        boss.health = boss.max_health * 0.6;
        tick(&mut boss, &mut shots);
        assert_eq!(boss.phase(), 1);
        boss.health = boss.max_health * 0.6 - 0.01;
        tick(&mut boss, &mut shots);
        assert_eq!(boss.phase(), 2);
        assert_eq!(boss.move_speed, 80.0);

        boss.health = boss.max_health * 0.3 - 0.01;
        tick(&mut boss, &mut shots);
        assert_eq!(boss.phase(), 3);
        assert_eq!(boss.move_speed, 100.0);
    }

    #[test]
    fn test_boss_phase_never_decreases_under_monotonic_damage() {
        let mut boss = Enemy::new(EnemyKind::Boss, Vec2::new(200.0, 0.0));
        let mut shots = Vec::new();
        let mut last_phase = 1;

        while boss.health > 1.0 {
            boss.health -= 7.0;
            boss.update(1.0 / 60.0, Some(Vec2::ZERO), &[], &mut rng(), &mut shots);
            assert!(boss.phase() >= last_phase);
            last_phase = boss.phase();
        }
        assert_eq!(last_phase, 3);
    }

    #[test]
    fn test_boss_ring_scales_with_phase() {
        let mut boss = Enemy::new(EnemyKind::Boss, Vec2::new(200.0, 0.0));
        let mut shots = Vec::new();

        // First tick fires immediately (timer starts at zero) at phase 1
        boss.update(1.0 / 60.0, Some(Vec2::ZERO), &[], &mut rng(), &mut shots);
        assert_eq!(shots.len(), 8);

        shots.clear();
        boss.health = boss.max_health * 0.1;
        if let Brain::Boss { special_timer, .. } = &mut boss.brain {
            *special_timer = 0.0;
        }
        boss.update(1.0 / 60.0, Some(Vec2::ZERO), &[], &mut rng(), &mut shots);
        assert_eq!(shots.len(), 24);
    }

    #[test]
    fn test_dodger_bursts_perpendicular_at_double_speed() {
        let mut enemy = Enemy::new(EnemyKind::Fast, Vec2::new(50.0, 0.0));
        let mut shots = Vec::new();
        let mut rng = rng();

        // A player projectile parked within trigger range
        let mut proj = Projectile::new(Vec2::new(60.0, 0.0), Vec2::new(300.0, 0.0), 10.0, true);
        proj.max_lifetime = f32::MAX;
        let projectiles = vec![proj];

        let mut dodged = false;
        for _ in 0..6000 {
            enemy.update(
                1.0 / 60.0,
                Some(Vec2::ZERO),
                &projectiles,
                &mut rng,
                &mut shots,
            );
            if let Brain::Dodger { dodging: true, .. } = enemy.brain {
                dodged = true;
                // Perpendicular to a +x projectile is ±y, at double speed
                assert!(enemy.vel.x.abs() < 0.001);
                assert!((enemy.vel.y.abs() - enemy.move_speed * 2.0).abs() < 0.001);
                break;
            }
        }
        assert!(dodged, "dodge never triggered over 100 simulated seconds");
    }
}
