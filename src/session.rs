use std::time::Duration;

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::asteroids::AsteroidManager;
use crate::audio::{self, AudioSink, Cue};
use crate::clock::Clock;
use crate::collision::collides;
use crate::config::GameConfig;
use crate::constants::{EXPLOSION_PARTICLES, PICKUP_PARTICLES};
use crate::entities::{Asteroid, Particle, ParticleKind, Projectile, Rocket};
use crate::input::InputEvent;
use crate::persistence::ScoreReporter;
use crate::powerups::{PowerUp, PowerUpKind, PowerUpManager};
use crate::projectiles;
use crate::rocket::RocketController;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::types::{Vector2D, Viewport};

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Running,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GameOverSummary {
    pub score: u32,
    pub elapsed_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum GameEvent {
    Fired { shots: usize },
    AsteroidSpawned,
    AsteroidDestroyed { at: Vector2D },
    PowerUpDropped(PowerUpKind),
    PowerUpCollected(PowerUpKind),
    GameOver(GameOverSummary),
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub rocket: Rocket,
    pub projectiles: Vec<Projectile>,
    pub asteroids: Vec<Asteroid>,
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    pub score: u32,
    pub elapsed_ms: u64,
    pub state: SessionState,
    pub shield_remaining_ms: Option<u64>,
    pub multi_shot_remaining_ms: Option<u64>,
    pub events: Vec<GameEvent>,
}

pub struct Session {
    config: GameConfig,
    clock: Box<dyn Clock>,
    rng: StdRng,
    audio: Box<dyn AudioSink>,
    reporter: Box<dyn ScoreReporter>,
    viewport: Viewport,

    scheduler: Scheduler,
    spawn_timer: TimerHandle,
    elapsed_timer: TimerHandle,

    asteroid_manager: AsteroidManager,
    power_ups: PowerUpManager,
    controller: RocketController,

    rocket: Rocket,
    projectiles: Vec<Projectile>,
    asteroids: Vec<Asteroid>,
    pickups: Vec<PowerUp>,
    particles: Vec<Particle>,

    score: u32,
    elapsed: Duration,
    state: SessionState,
    summary: Option<GameOverSummary>,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(
        config: GameConfig,
        viewport: Viewport,
        clock: Box<dyn Clock>,
        audio: Box<dyn AudioSink>,
        reporter: Box<dyn ScoreReporter>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut scheduler = Scheduler::new();
        let (spawn_timer, elapsed_timer) = arm_timers(&mut scheduler, &config, clock.now());
        let center = viewport.center();

        let mut session = Session {
            asteroid_manager: AsteroidManager::new(config.initial_asteroid_speed),
            power_ups: PowerUpManager::new(config.power_up_spawn_chance, config.power_up_duration),
            controller: RocketController::new(),
            rocket: Rocket::new(center.x, center.y),
            projectiles: Vec::new(),
            asteroids: Vec::new(),
            pickups: Vec::new(),
            particles: Vec::new(),
            score: 0,
            elapsed: Duration::ZERO,
            state: SessionState::Running,
            summary: None,
            events: Vec::new(),
            config,
            clock,
            rng,
            audio,
            reporter,
            viewport,
            scheduler,
            spawn_timer,
            elapsed_timer,
        };
        session.audio.start_background();
        info!("Session started in a {:.0}x{:.0} viewport.", viewport.width, viewport.height);
        session
    }

    pub fn reset(&mut self) {
        self.scheduler.cancel_all();
        self.scheduler.clear();
        let (spawn_timer, elapsed_timer) = arm_timers(&mut self.scheduler, &self.config, self.clock.now());
        self.spawn_timer = spawn_timer;
        self.elapsed_timer = elapsed_timer;

        let center = self.viewport.center();
        self.rocket = Rocket::new(center.x, center.y);
        self.controller = RocketController::new();
        self.power_ups.clear();
        self.projectiles.clear();
        self.asteroids.clear();
        self.pickups.clear();
        self.particles.clear();
        self.score = 0;
        self.elapsed = Duration::ZERO;
        self.state = SessionState::Running;
        self.summary = None;
        self.events.clear();

        self.audio.start_background();
        info!("Session reset.");
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn summary(&self) -> Option<GameOverSummary> {
        self.summary
    }

    fn elapsed_minutes(&self) -> f64 {
        self.elapsed.as_secs_f64() / 60.0
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        if self.state != SessionState::Running {
            return;
        }
        match event {
            InputEvent::PointerMove(_) => {
                self.rocket = self.controller.update_position(event, &self.rocket);
            }
            InputEvent::Fire(target) => {
                // Drag and fire are mutually exclusive gestures.
                if !self.controller.is_dragging_active() {
                    self.fire(*target);
                }
            }
            InputEvent::TouchStart(_) => {
                self.controller.start_dragging();
                self.rocket = self.controller.update_position(event, &self.rocket);
            }
            InputEvent::TouchMove(_) => {
                if self.controller.is_dragging_active() {
                    self.rocket = self.controller.update_position(event, &self.rocket);
                }
            }
            InputEvent::TouchEnd => self.controller.stop_dragging(),
        }
    }

    fn fire(&mut self, target: Vector2D) {
        let now = self.clock.now();
        let multi_shot = self.power_ups.is_active(PowerUpKind::MultiShot, now);
        let shots = projectiles::fire(
            self.rocket.position,
            target,
            multi_shot,
            self.config.projectile_speed,
            self.config.multi_shot_spread,
        );
        self.events.push(GameEvent::Fired { shots: shots.len() });
        self.projectiles.extend(shots);
        self.audio.play(Cue::Shoot {
            volume: audio::shoot_volume(self.elapsed_minutes()),
        });
    }

    pub fn run_timers(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        let now = self.clock.now();

        for _ in 0..self.scheduler.fires(self.elapsed_timer, now) {
            self.elapsed += self.config.elapsed_time_interval;
            self.audio.set_background_intensity(self.elapsed_minutes());
        }

        for _ in 0..self.scheduler.fires(self.spawn_timer, now) {
            let asteroid = self.asteroid_manager.spawn_asteroid(self.elapsed, self.viewport, &mut self.rng);
            self.asteroids.push(asteroid);
            self.events.push(GameEvent::AsteroidSpawned);
        }
    }

    pub fn frame(&mut self) -> Snapshot {
        self.run_timers();
        self.tick()
    }

    /// One simulation step. Next-state collections are built from the
    /// current ones and swapped in at the end.
    pub fn tick(&mut self) -> Snapshot {
        let now = self.clock.now();
        if self.state != SessionState::Running {
            // Entities stay frozen, but particles still burn out.
            self.particles.retain(|p| p.is_alive(now));
            return self.snapshot();
        }
        let viewport = self.viewport;
        let rocket = self.rocket;

        let moved_projectiles = projectiles::advance_and_cull(&self.projectiles, viewport);
        let moved_asteroids = self.asteroid_manager.advance(&self.asteroids, rocket.position);
        let shielded = self.power_ups.is_active(PowerUpKind::Shield, now);

        let mut spent = vec![false; moved_projectiles.len()];
        let mut next_asteroids = Vec::with_capacity(moved_asteroids.len());
        let mut new_particles = Vec::new();
        let mut dropped = Vec::new();
        let mut rocket_hit = false;

        for (i, asteroid) in moved_asteroids.iter().enumerate() {
            if collides(asteroid, &rocket) && !shielded {
                // The colliding asteroid goes with the rocket; the rest freeze where they are.
                rocket_hit = true;
                next_asteroids.extend_from_slice(&moved_asteroids[i + 1..]);
                break;
            }

            let hit = (0..moved_projectiles.len()).find(|&j| !spent[j] && collides(asteroid, &moved_projectiles[j]));
            let Some(j) = hit else {
                next_asteroids.push(*asteroid);
                continue;
            };

            spent[j] = true;
            self.score += self.config.score_per_asteroid;
            new_particles.extend(Particle::burst(
                asteroid.position,
                EXPLOSION_PARTICLES,
                ParticleKind::Explosion,
                now,
                &mut self.rng,
            ));
            self.audio.play(Cue::Explosion {
                volume: audio::KILL_EXPLOSION_VOLUME,
            });
            self.events.push(GameEvent::AsteroidDestroyed { at: asteroid.position });
            info!(
                "Asteroid destroyed at x: {:.1}, y: {:.1}. Score: {}",
                asteroid.position.x, asteroid.position.y, self.score
            );

            if let Some(power_up) = self
                .power_ups
                .spawn_power_up(asteroid.position.x, asteroid.position.y, &mut self.rng)
            {
                self.events.push(GameEvent::PowerUpDropped(power_up.kind));
                dropped.push(power_up);
            }
        }

        let mut next_pickups = Vec::with_capacity(self.pickups.len() + dropped.len());
        if !rocket_hit {
            for pickup in &self.pickups {
                if !collides(pickup, &rocket) {
                    next_pickups.push(*pickup);
                    continue;
                }
                self.power_ups.activate(pickup.kind, now);
                let kind = match pickup.kind {
                    PowerUpKind::Shield => ParticleKind::ShieldPickup,
                    PowerUpKind::MultiShot => ParticleKind::MultiShotPickup,
                };
                new_particles.extend(Particle::burst(pickup.position, PICKUP_PARTICLES, kind, now, &mut self.rng));
                self.audio.play(Cue::PowerUp);
                self.events.push(GameEvent::PowerUpCollected(pickup.kind));
                info!("{} collected.", pickup.kind.label());
            }
        } else {
            next_pickups.extend_from_slice(&self.pickups);
        }
        next_pickups.extend(dropped);

        let mut next_particles: Vec<Particle> = self.particles.iter().filter(|p| p.is_alive(now)).copied().collect();
        next_particles.extend(new_particles);

        self.projectiles = moved_projectiles
            .into_iter()
            .zip(spent)
            .filter_map(|(projectile, spent)| (!spent).then_some(projectile))
            .collect();
        self.asteroids = next_asteroids;
        self.pickups = next_pickups;
        self.particles = next_particles;

        if rocket_hit {
            self.enter_game_over();
        }
        self.snapshot()
    }

    fn enter_game_over(&mut self) {
        self.state = SessionState::GameOver;
        self.scheduler.cancel_all();
        self.audio.stop_background();
        self.audio.play(Cue::Explosion {
            volume: audio::GAME_OVER_EXPLOSION_VOLUME,
        });

        let summary = GameOverSummary {
            score: self.score,
            elapsed_ms: self.elapsed.as_millis() as u64,
        };
        self.summary = Some(summary);
        self.events.push(GameEvent::GameOver(summary));
        info!(
            "Game over. Final score: {}, time: {:.1}s",
            self.score,
            self.elapsed.as_secs_f64()
        );
        self.reporter.report(self.score, self.elapsed);
    }

    fn remaining_ms(&mut self, kind: PowerUpKind, now: Duration) -> Option<u64> {
        self.power_ups
            .is_active(kind, now)
            .then(|| self.power_ups.remaining_time(kind, now).as_millis() as u64)
    }

    pub fn snapshot(&mut self) -> Snapshot {
        let now = self.clock.now();
        Snapshot {
            rocket: self.rocket,
            projectiles: self.projectiles.clone(),
            asteroids: self.asteroids.clone(),
            power_ups: self.pickups.clone(),
            particles: self.particles.clone(),
            score: self.score,
            elapsed_ms: self.elapsed.as_millis() as u64,
            state: self.state,
            shield_remaining_ms: self.remaining_ms(PowerUpKind::Shield, now),
            multi_shot_remaining_ms: self.remaining_ms(PowerUpKind::MultiShot, now),
            events: std::mem::take(&mut self.events),
        }
    }
}

fn arm_timers(scheduler: &mut Scheduler, config: &GameConfig, now: Duration) -> (TimerHandle, TimerHandle) {
    let spawn = scheduler.every(config.asteroid_spawn_interval, now);
    let elapsed = scheduler.every(config.elapsed_time_interval, now);
    (spawn, elapsed)
}
