//! Fixed-capacity particle pool
//!
//! Purely cosmetic: particles never touch gameplay state. The pool is sized
//! once and slots are reclaimed in place; spawning past capacity silently
//! drops the excess. No allocation happens after construction.

use glam::{Vec2, Vec4};
use rand::Rng;
use rand_pcg::Pcg32;
use std::f32::consts::TAU;

use crate::palette;

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub start_color: Vec4,
    pub end_color: Vec4,
    pub color: Vec4,
    pub start_size: f32,
    pub end_size: f32,
    pub size: f32,
    /// Velocity retained per tick at 60 Hz (applied as drag^(dt*60))
    pub drag: f32,
    pub active: bool,
}

impl Particle {
    fn idle() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            lifetime: 0.0,
            max_lifetime: 1.0,
            start_color: palette::WHITE,
            end_color: Vec4::new(1.0, 1.0, 1.0, 0.0),
            color: palette::WHITE,
            start_size: 8.0,
            end_size: 0.0,
            size: 8.0,
            drag: 0.98,
            active: false,
        }
    }

    fn update(&mut self, dt: f32) {
        self.lifetime += dt;
        if self.lifetime >= self.max_lifetime {
            self.active = false;
            return;
        }

        self.vel *= self.drag.powf(dt * 60.0);

        let t = self.lifetime / self.max_lifetime;
        self.color = self.start_color.lerp(self.end_color, t);
        self.size = crate::lerp(self.start_size, self.end_size, t);

        self.pos += self.vel * dt;
    }
}

pub struct ParticlePool {
    slots: Vec<Particle>,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Particle::idle(); capacity],
        }
    }

    pub fn update(&mut self, dt: f32) {
        for particle in &mut self.slots {
            if particle.active {
                particle.update(dt);
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.active).count()
    }

    pub fn clear(&mut self) {
        for particle in &mut self.slots {
            particle.active = false;
        }
    }

    /// Visit every live particle (render order is irrelevant within the pool)
    pub fn for_each_active(&self, mut f: impl FnMut(&Particle)) {
        for particle in &self.slots {
            if particle.active {
                f(particle);
            }
        }
    }

    /// First free slot, reset to defaults. None when the pool is saturated.
    fn alloc(&mut self) -> Option<&mut Particle> {
        let slot = self.slots.iter_mut().find(|p| !p.active)?;
        *slot = Particle::idle();
        slot.active = true;
        Some(slot)
    }

    /// Radial burst (enemy deaths, plasma blasts)
    pub fn spawn_explosion(
        &mut self,
        pos: Vec2,
        color: Vec4,
        count: usize,
        speed: f32,
        rng: &mut Pcg32,
    ) {
        for _ in 0..count {
            let dir = random_dir(rng);
            let vel = dir * rng.random_range(speed * 0.3..speed);
            let max_lifetime = rng.random_range(0.3..0.8);
            let start_size = rng.random_range(4.0..12.0);

            let Some(p) = self.alloc() else { break };
            p.pos = pos;
            p.vel = vel;
            p.max_lifetime = max_lifetime;
            p.start_color = color;
            p.end_color = Vec4::new(color.x, color.y, color.z, 0.0);
            p.start_size = start_size;
            p.drag = 0.95;
        }
    }

    /// Small directional sparks (non-lethal hits)
    pub fn spawn_hit_sparks(
        &mut self,
        pos: Vec2,
        direction: Vec2,
        color: Vec4,
        count: usize,
        rng: &mut Pcg32,
    ) {
        for _ in 0..count {
            let base = if direction.length() < 0.1 {
                random_dir(rng)
            } else {
                direction
            };
            let dir = (base + random_dir(rng) * 0.5).normalize_or_zero();
            let vel = dir * rng.random_range(100.0..250.0);
            let max_lifetime = rng.random_range(0.1..0.3);
            let start_size = rng.random_range(2.0..6.0);

            let Some(p) = self.alloc() else { break };
            p.pos = pos;
            p.vel = vel;
            p.max_lifetime = max_lifetime;
            p.start_color = color;
            p.end_color = Vec4::new(color.x, color.y, color.z, 0.0);
            p.start_size = start_size;
            p.drag = 0.9;
        }
    }

    /// Single lingering puff (engine/projectile trails)
    pub fn spawn_trail(&mut self, pos: Vec2, color: Vec4, size: f32, rng: &mut Pcg32) {
        let offset = random_point_in_circle(rng, 3.0);
        let vel = random_dir(rng) * rng.random_range(10.0..30.0);
        let max_lifetime = rng.random_range(0.2..0.4);

        let Some(p) = self.alloc() else { return };
        p.pos = pos + offset;
        p.vel = vel;
        p.max_lifetime = max_lifetime;
        p.start_color = color;
        p.end_color = Vec4::new(color.x, color.y, color.z, 0.0);
        p.start_size = size;
        p.drag = 0.98;
    }

    /// Expanding golden ring on level up
    pub fn spawn_level_up(&mut self, pos: Vec2) {
        let count = 30;
        for i in 0..count {
            let angle = (TAU / count as f32) * i as f32;
            let dir = Vec2::new(angle.cos(), angle.sin());

            let Some(p) = self.alloc() else { break };
            p.pos = pos;
            p.vel = dir * 300.0;
            p.max_lifetime = 0.5;
            p.start_color = palette::YELLOW;
            p.end_color = Vec4::new(1.0, 1.0, 0.2, 0.0);
            p.start_size = 8.0;
            p.end_size = 2.0;
            p.drag = 0.92;
        }
    }

    /// Little green pop when an orb is banked
    pub fn spawn_xp_collect(&mut self, pos: Vec2, rng: &mut Pcg32) {
        for _ in 0..5 {
            let vel = random_dir(rng) * rng.random_range(50.0..100.0);

            let Some(p) = self.alloc() else { break };
            p.pos = pos;
            p.vel = vel;
            p.max_lifetime = 0.3;
            p.start_color = palette::XP_GREEN;
            p.end_color = Vec4::new(0.4, 1.0, 0.4, 0.0);
            p.start_size = 4.0;
            p.drag = 0.95;
        }
    }
}

fn random_dir(rng: &mut Pcg32) -> Vec2 {
    let angle = rng.random_range(0.0..TAU);
    Vec2::new(angle.cos(), angle.sin())
}

fn random_point_in_circle(rng: &mut Pcg32, radius: f32) -> Vec2 {
    let r = radius * rng.random_range(0.0f32..1.0).sqrt();
    let theta = rng.random_range(0.0..TAU);
    Vec2::new(r * theta.cos(), r * theta.sin())
}
