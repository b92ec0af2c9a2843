use std::collections::HashMap;
use std::time::Duration;

use log::info;
use rand::Rng;
use serde::Serialize;

use crate::constants::*;
use crate::types::{GameObject, Vector2D};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PowerUpKind {
    Shield,
    MultiShot,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::Shield, PowerUpKind::MultiShot];

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "Shield",
            PowerUpKind::MultiShot => "Multi-Shot",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PowerUp {
    pub position: Vector2D,
    pub radius: f64,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn new(position: Vector2D, kind: PowerUpKind) -> Self {
        PowerUp {
            position,
            radius: POWERUP_RADIUS,
            kind,
        }
    }
}

impl GameObject for PowerUp {
    fn position(&self) -> Vector2D {
        self.position
    }
    fn radius(&self) -> f64 {
        self.radius
    }
}

pub struct PowerUpManager {
    active: HashMap<PowerUpKind, Duration>,
    spawn_chance: f64,
    duration: Duration,
}

impl PowerUpManager {
    pub fn new(spawn_chance: f64, duration: Duration) -> Self {
        PowerUpManager {
            active: HashMap::new(),
            spawn_chance,
            duration,
        }
    }

    pub fn spawn_power_up(&self, x: f64, y: f64, rng: &mut impl Rng) -> Option<PowerUp> {
        let roll: f64 = rng.gen_range(0.0..1.0);
        if roll >= self.spawn_chance {
            return None;
        }
        let kind = match rng.gen_range(0..2) {
            0 => PowerUpKind::Shield,
            _ => PowerUpKind::MultiShot,
        };
        info!("Power-up {:?} dropped at x: {:.1}, y: {:.1}", kind, x, y);
        Some(PowerUp::new(Vector2D::new(x, y), kind))
    }

    /// Re-arms rather than stacks: any remaining time is overwritten.
    pub fn activate(&mut self, kind: PowerUpKind, now: Duration) {
        self.active.insert(kind, now + self.duration);
    }

    pub fn is_active(&mut self, kind: PowerUpKind, now: Duration) -> bool {
        match self.active.get(&kind) {
            Some(&expiry) if now <= expiry => true,
            Some(_) => {
                self.active.remove(&kind);
                false
            }
            None => false,
        }
    }

    pub fn remaining_time(&self, kind: PowerUpKind, now: Duration) -> Duration {
        self.active
            .get(&kind)
            .map(|expiry| expiry.saturating_sub(now))
            .unwrap_or(Duration::ZERO)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
