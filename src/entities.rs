use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::constants::*;
use crate::types::{GameObject, Vector2D};

// --- Rocket: the single player-controlled entity ---
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rocket {
    pub position: Vector2D,
    pub radius: f64,
    pub angle: f64, // Degrees, 0 = facing up
}

impl Rocket {
    pub fn new(x: f64, y: f64) -> Self {
        Rocket {
            position: Vector2D::new(x, y),
            radius: ROCKET_RADIUS,
            angle: 0.0,
        }
    }
}

impl GameObject for Rocket {
    fn position(&self) -> Vector2D {
        self.position
    }
    fn radius(&self) -> f64 {
        self.radius
    }
}

// --- Asteroid: homes in on the rocket at a fixed per-instance speed ---
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Asteroid {
    pub position: Vector2D,
    pub radius: f64,
    pub speed: f64,
}

impl Asteroid {
    pub fn new(x: f64, y: f64, speed: f64) -> Self {
        Asteroid {
            position: Vector2D::new(x, y),
            radius: ASTEROID_RADIUS,
            speed,
        }
    }

    /// Step toward `target` by `speed`. Never overshoots, and stays put when
    /// already on the target.
    pub fn step_toward(&mut self, target: Vector2D) {
        let offset = target.sub(self.position);
        let distance = offset.length();
        let step = self.speed.max(0.0).min(distance);
        self.position = self.position.add(offset.normalize_or_zero().scale(step));
    }
}

impl GameObject for Asteroid {
    fn position(&self) -> Vector2D {
        self.position
    }
    fn radius(&self) -> f64 {
        self.radius
    }
}

// --- Projectile: straight line, velocity fixed at spawn ---
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Projectile {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub radius: f64,
}

impl Projectile {
    pub fn new(position: Vector2D, velocity: Vector2D) -> Self {
        Projectile {
            position,
            velocity,
            radius: PROJECTILE_RADIUS,
        }
    }

    pub fn update(&mut self) {
        self.position = self.position.add(self.velocity);
    }
}

impl GameObject for Projectile {
    fn position(&self) -> Vector2D {
        self.position
    }
    fn radius(&self) -> f64 {
        self.radius
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParticleKind {
    Explosion,
    ShieldPickup,
    MultiShotPickup,
}

// --- Particle: purely visual, expires on the wall clock ---
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Particle {
    pub position: Vector2D,
    pub radius: f64,
    pub kind: ParticleKind,
    pub expires_at: Duration,
}

impl Particle {
    pub fn burst(
        center: Vector2D,
        count: usize,
        kind: ParticleKind,
        now: Duration,
        rng: &mut impl Rng,
    ) -> Vec<Particle> {
        let half_spread = PARTICLE_SPREAD / 2.0;
        (0..count)
            .map(|_| Particle {
                position: Vector2D::new(
                    center.x + rng.gen_range(-half_spread..half_spread),
                    center.y + rng.gen_range(-half_spread..half_spread),
                ),
                radius: rng.gen_range(1.0..3.0),
                kind,
                expires_at: now + PARTICLE_LIFETIME,
            })
            .collect()
    }

    pub fn is_alive(&self, now: Duration) -> bool {
        now < self.expires_at
    }
}

impl GameObject for Particle {
    fn position(&self) -> Vector2D {
        self.position
    }
    fn radius(&self) -> f64 {
        self.radius
    }
}
