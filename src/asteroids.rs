use std::f64::consts::TAU;
use std::time::Duration;

use log::info;
use rand::Rng;

use crate::constants::*;
use crate::entities::Asteroid;
use crate::types::{Vector2D, Viewport};

pub struct AsteroidManager {
    initial_speed: f64,
    ramp_per_minute: f64,
    speed_cap: f64,
    jitter: f64,
}

impl Default for AsteroidManager {
    fn default() -> Self {
        AsteroidManager {
            initial_speed: INITIAL_ASTEROID_SPEED,
            ramp_per_minute: ASTEROID_SPEED_RAMP_PER_MINUTE,
            speed_cap: ASTEROID_SPEED_CAP_MULTIPLIER,
            jitter: ASTEROID_SPEED_JITTER,
        }
    }
}

impl AsteroidManager {
    pub fn new(initial_speed: f64) -> Self {
        AsteroidManager {
            initial_speed,
            ..Default::default()
        }
    }

    pub fn base_speed(&self, elapsed: Duration) -> f64 {
        let minutes = elapsed.as_secs_f64() / 60.0;
        let multiplier = (1.0 + minutes * self.ramp_per_minute).min(self.speed_cap);
        self.initial_speed * multiplier
    }

    pub fn spawn_asteroid(&self, elapsed: Duration, viewport: Viewport, rng: &mut impl Rng) -> Asteroid {
        // The ring radius exceeds the half-diagonal for any aspect ratio.
        let angle = rng.gen_range(0.0..TAU);
        let ring = viewport.width.max(viewport.height);
        let center = viewport.center();
        let position = center.add(Vector2D::from_angle(angle).scale(ring));

        let base = self.base_speed(elapsed);
        let speed = if self.jitter > 0.0 {
            base * rng.gen_range(1.0 - self.jitter..1.0 + self.jitter)
        } else {
            base
        };

        info!(
            "New asteroid spawned at x: {:.1}, y: {:.1} with speed {:.2}",
            position.x, position.y, speed
        );
        Asteroid::new(position.x, position.y, speed)
    }

    pub fn advance(&self, asteroids: &[Asteroid], target: Vector2D) -> Vec<Asteroid> {
        asteroids
            .iter()
            .map(|asteroid| {
                let mut next = *asteroid;
                next.step_toward(target);
                next
            })
            .collect()
    }
}
