use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use approx::assert_relative_eq;

use super::*;
use crate::clock::ManualClock;
use crate::constants::{PARTICLE_LIFETIME, POWERUP_DURATION, ROCKET_RADIUS};

// ---- Collaborator stubs ----

#[derive(Clone, Default)]
struct RecordingAudio {
    cues: Rc<RefCell<Vec<Cue>>>,
    background: Rc<RefCell<Vec<&'static str>>>,
    intensity: Rc<RefCell<Vec<f64>>>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: Cue) {
        self.cues.borrow_mut().push(cue);
    }
    fn start_background(&mut self) {
        self.background.borrow_mut().push("start");
    }
    fn stop_background(&mut self) {
        self.background.borrow_mut().push("stop");
    }
    fn set_background_intensity(&mut self, difficulty: f64) {
        self.intensity.borrow_mut().push(difficulty);
    }
}

#[derive(Clone, Default)]
struct RecordingReporter {
    reports: Rc<RefCell<Vec<(u32, Duration)>>>,
}

impl ScoreReporter for RecordingReporter {
    fn report(&mut self, score: u32, elapsed: Duration) {
        self.reports.borrow_mut().push((score, elapsed));
    }
}

struct Harness {
    session: Session,
    clock: ManualClock,
    audio: RecordingAudio,
    reports: Rc<RefCell<Vec<(u32, Duration)>>>,
}

fn harness_with(config: GameConfig) -> Harness {
    let clock = ManualClock::new();
    let audio = RecordingAudio::default();
    let reporter = RecordingReporter::default();
    let reports = Rc::clone(&reporter.reports);
    let session = Session::new(
        config,
        Viewport::new(1000.0, 1000.0),
        Box::new(clock.clone()),
        Box::new(audio.clone()),
        Box::new(reporter),
    );
    Harness {
        session,
        clock,
        audio,
        reports,
    }
}

fn harness() -> Harness {
    harness_with(GameConfig {
        seed: Some(1234),
        ..Default::default()
    })
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

// ---- Rocket collisions ----

#[test]
fn test_rocket_starts_at_viewport_center() {
    let h = harness();
    assert_eq!(h.session.rocket.position, Vector2D::new(500.0, 500.0));
    assert_relative_eq!(h.session.rocket.radius, ROCKET_RADIUS);
    assert_eq!(h.session.state(), SessionState::Running);
}

#[test]
fn test_shielded_collision_keeps_playing() {
    let mut h = harness();
    h.session.power_ups.activate(PowerUpKind::Shield, h.clock.now());
    h.session.asteroids.push(Asteroid::new(500.0, 500.0, 2.0));

    let snap = h.session.tick();

    assert_eq!(snap.state, SessionState::Running);
    assert_eq!(snap.asteroids.len(), 1);
    // Sitting exactly on the rocket: zero direction, no movement, no NaN.
    assert_eq!(snap.asteroids[0].position, Vector2D::new(500.0, 500.0));
    assert!(snap.shield_remaining_ms.is_some());
    assert!(h.reports.borrow().is_empty());
}

#[test]
fn test_unshielded_collision_ends_game_once() {
    let mut h = harness();
    h.session.score = 700;
    h.session.elapsed = ms(12_300);
    h.session.asteroids.push(Asteroid::new(510.0, 500.0, 2.0));
    h.session.asteroids.push(Asteroid::new(490.0, 500.0, 2.0));
    h.session.asteroids.push(Asteroid::new(100.0, 100.0, 2.0));

    let snap = h.session.tick();

    assert_eq!(snap.state, SessionState::GameOver);
    assert_eq!(snap.score, 700);
    assert_eq!(snap.elapsed_ms, 12_300);
    assert!(snap.events.contains(&GameEvent::GameOver(GameOverSummary {
        score: 700,
        elapsed_ms: 12_300
    })));
    // Only the first colliding asteroid is consumed; the scan stops there.
    assert_eq!(snap.asteroids.len(), 2);
    assert_eq!(*h.reports.borrow(), vec![(700, ms(12_300))]);
    assert_eq!(
        h.session.summary(),
        Some(GameOverSummary {
            score: 700,
            elapsed_ms: 12_300
        })
    );
    assert_eq!(h.audio.background.borrow().last(), Some(&"stop"));
    assert!(h.audio.cues.borrow().contains(&Cue::Explosion {
        volume: audio::GAME_OVER_EXPLOSION_VOLUME
    }));

    // Frozen from here on: no motion, no timers, no second report.
    let frozen = snap.asteroids.clone();
    h.clock.advance(ms(5_000));
    for _ in 0..10 {
        let snap = h.session.frame();
        assert_eq!(snap.asteroids, frozen);
        assert_eq!(snap.elapsed_ms, 12_300);
        assert!(snap.events.is_empty());
    }
    assert_eq!(h.reports.borrow().len(), 1);
    let later = ms(60_000);
    assert_eq!(h.session.scheduler.fires(h.session.spawn_timer, later), 0);
    assert_eq!(h.session.scheduler.fires(h.session.elapsed_timer, later), 0);
}

#[test]
fn test_input_ignored_after_game_over() {
    let mut h = harness();
    h.session.asteroids.push(Asteroid::new(500.0, 500.0, 2.0));
    h.session.tick();
    assert_eq!(h.session.state(), SessionState::GameOver);

    h.session.handle_input(&InputEvent::PointerMove(Vector2D::new(10.0, 10.0)));
    h.session.handle_input(&InputEvent::Fire(Vector2D::new(900.0, 900.0)));
    assert_eq!(h.session.rocket.position, Vector2D::new(500.0, 500.0));
    assert!(h.session.projectiles.is_empty());
}

// ---- Projectile hits ----

#[test]
fn test_projectile_destroys_asteroid_and_scores() {
    let mut h = harness();
    h.session.power_ups = PowerUpManager::new(0.0, POWERUP_DURATION);
    h.session.asteroids.push(Asteroid::new(300.0, 500.0, 0.0));
    h.session
        .projectiles
        .push(Projectile::new(Vector2D::new(295.0, 500.0), Vector2D::new(1.0, 0.0)));

    let snap = h.session.tick();

    assert_eq!(snap.score, 100);
    assert!(snap.asteroids.is_empty());
    assert!(snap.projectiles.is_empty());
    assert!(snap.power_ups.is_empty());
    assert_eq!(snap.particles.len(), EXPLOSION_PARTICLES);
    assert!(snap.events.contains(&GameEvent::AsteroidDestroyed {
        at: Vector2D::new(300.0, 500.0)
    }));
    assert!(h.audio.cues.borrow().contains(&Cue::Explosion {
        volume: audio::KILL_EXPLOSION_VOLUME
    }));
}

#[test]
fn test_forced_power_up_drop_at_destruction_point() {
    let mut h = harness();
    h.session.power_ups = PowerUpManager::new(1.0, POWERUP_DURATION);
    h.session.asteroids.push(Asteroid::new(200.0, 200.0, 0.0));
    h.session
        .projectiles
        .push(Projectile::new(Vector2D::new(199.0, 200.0), Vector2D::new(1.0, 0.0)));

    let snap = h.session.tick();

    assert_eq!(snap.power_ups.len(), 1);
    assert_eq!(snap.power_ups[0].position, Vector2D::new(200.0, 200.0));
    assert!(PowerUpKind::ALL.contains(&snap.power_ups[0].kind));
    assert!(snap.events.iter().any(|e| matches!(e, GameEvent::PowerUpDropped(_))));
}

#[test]
fn test_one_projectile_per_asteroid() {
    let mut h = harness();
    h.session.power_ups = PowerUpManager::new(0.0, POWERUP_DURATION);
    h.session.asteroids.push(Asteroid::new(300.0, 300.0, 0.0));
    for _ in 0..2 {
        h.session
            .projectiles
            .push(Projectile::new(Vector2D::new(299.0, 300.0), Vector2D::new(1.0, 0.0)));
    }

    let snap = h.session.tick();

    assert_eq!(snap.score, 100);
    assert!(snap.asteroids.is_empty());
    assert_eq!(snap.projectiles.len(), 1);
}

#[test]
fn test_projectile_hits_only_one_asteroid() {
    let mut h = harness();
    h.session.power_ups = PowerUpManager::new(0.0, POWERUP_DURATION);
    h.session.asteroids.push(Asteroid::new(300.0, 300.0, 0.0));
    h.session.asteroids.push(Asteroid::new(302.0, 300.0, 0.0));
    h.session
        .projectiles
        .push(Projectile::new(Vector2D::new(300.0, 300.0), Vector2D::new(1.0, 0.0)));

    let snap = h.session.tick();

    assert_eq!(snap.score, 100);
    assert_eq!(snap.asteroids.len(), 1);
}

// ---- Power-up pickups ----

#[test]
fn test_pickup_activates_and_is_consumed() {
    let mut h = harness();
    h.session
        .pickups
        .push(PowerUp::new(Vector2D::new(505.0, 500.0), PowerUpKind::MultiShot));

    let snap = h.session.tick();

    assert!(snap.power_ups.is_empty());
    assert_eq!(snap.particles.len(), PICKUP_PARTICLES);
    assert!(snap.particles.iter().all(|p| p.kind == ParticleKind::MultiShotPickup));
    assert_eq!(snap.multi_shot_remaining_ms, Some(5_000));
    assert_eq!(snap.shield_remaining_ms, None);
    assert!(snap.events.contains(&GameEvent::PowerUpCollected(PowerUpKind::MultiShot)));
    assert!(h.audio.cues.borrow().contains(&Cue::PowerUp));
}

#[test]
fn test_power_up_window_expires() {
    let mut h = harness();
    h.session
        .pickups
        .push(PowerUp::new(Vector2D::new(500.0, 500.0), PowerUpKind::Shield));
    h.session.tick();

    h.clock.advance(ms(5_000));
    assert_eq!(h.session.tick().shield_remaining_ms, Some(0));
    h.clock.advance(ms(1));
    assert_eq!(h.session.tick().shield_remaining_ms, None);
}

// ---- Firing ----

#[test]
fn test_fire_single_and_multi_shot() {
    let mut h = harness();
    h.session.handle_input(&InputEvent::Fire(Vector2D::new(900.0, 500.0)));
    assert_eq!(h.session.projectiles.len(), 1);
    assert_relative_eq!(h.session.projectiles[0].velocity.x, 8.0);

    h.session.power_ups.activate(PowerUpKind::MultiShot, h.clock.now());
    h.session.handle_input(&InputEvent::Fire(Vector2D::new(900.0, 500.0)));
    assert_eq!(h.session.projectiles.len(), 4);

    let snap = h.session.snapshot();
    assert!(snap.events.contains(&GameEvent::Fired { shots: 3 }));
    let shoot_cues = h
        .audio
        .cues
        .borrow()
        .iter()
        .filter(|c| matches!(c, Cue::Shoot { .. }))
        .count();
    assert_eq!(shoot_cues, 2);
}

#[test]
fn test_drag_suppresses_fire() {
    let mut h = harness();
    h.session
        .handle_input(&InputEvent::TouchStart(vec![Vector2D::new(400.0, 400.0)]));
    assert_eq!(h.session.rocket.position, Vector2D::new(400.0, 400.0));

    h.session.handle_input(&InputEvent::Fire(Vector2D::new(900.0, 900.0)));
    assert!(h.session.projectiles.is_empty());

    h.session
        .handle_input(&InputEvent::TouchMove(vec![Vector2D::new(410.0, 400.0)]));
    assert_relative_eq!(h.session.rocket.angle, 90.0);

    h.session.handle_input(&InputEvent::TouchEnd);
    h.session.handle_input(&InputEvent::Fire(Vector2D::new(900.0, 900.0)));
    assert_eq!(h.session.projectiles.len(), 1);
}

#[test]
fn test_touch_move_without_drag_is_ignored() {
    let mut h = harness();
    h.session
        .handle_input(&InputEvent::TouchMove(vec![Vector2D::new(10.0, 10.0)]));
    assert_eq!(h.session.rocket.position, Vector2D::new(500.0, 500.0));
}

#[test]
fn test_projectiles_culled_by_live_viewport() {
    let mut h = harness();
    h.session
        .projectiles
        .push(Projectile::new(Vector2D::new(600.0, 100.0), Vector2D::new(8.0, 0.0)));
    assert_eq!(h.session.tick().projectiles.len(), 1);

    h.session.set_viewport(Viewport::new(500.0, 500.0));
    assert!(h.session.tick().projectiles.is_empty());
    assert!(h.session.tick().projectiles.is_empty());
}

// ---- Particles and timers ----

#[test]
fn test_particles_burn_out_after_game_over() {
    let mut h = harness();
    h.session.power_ups = PowerUpManager::new(0.0, POWERUP_DURATION);
    // The kill comes first in the scan, the crash ends the game in the same tick.
    h.session.asteroids.push(Asteroid::new(300.0, 300.0, 0.0));
    h.session
        .projectiles
        .push(Projectile::new(Vector2D::new(299.0, 300.0), Vector2D::new(1.0, 0.0)));
    h.session.asteroids.push(Asteroid::new(500.0, 500.0, 2.0));

    let snap = h.session.tick();
    assert_eq!(snap.state, SessionState::GameOver);
    assert_eq!(snap.score, 100);
    assert_eq!(snap.particles.len(), EXPLOSION_PARTICLES);
    let frozen = snap.asteroids.clone();

    h.clock.advance(PARTICLE_LIFETIME - ms(1));
    assert_eq!(h.session.frame().particles.len(), EXPLOSION_PARTICLES);
    h.clock.advance(ms(10_000));
    let snap = h.session.frame();
    assert!(snap.particles.is_empty());
    assert_eq!(snap.asteroids, frozen);
    assert_eq!(snap.score, 100);
}

#[test]
fn test_particles_expire_on_wall_clock() {
    let mut h = harness();
    h.session.power_ups = PowerUpManager::new(0.0, POWERUP_DURATION);
    h.session.asteroids.push(Asteroid::new(300.0, 300.0, 0.0));
    h.session
        .projectiles
        .push(Projectile::new(Vector2D::new(299.0, 300.0), Vector2D::new(1.0, 0.0)));
    assert_eq!(h.session.tick().particles.len(), EXPLOSION_PARTICLES);

    h.clock.advance(PARTICLE_LIFETIME - ms(1));
    assert_eq!(h.session.tick().particles.len(), EXPLOSION_PARTICLES);
    h.clock.advance(ms(1));
    assert!(h.session.tick().particles.is_empty());
}

#[test]
fn test_timers_spawn_and_count_time() {
    let mut h = harness();
    h.clock.advance(ms(999));
    let snap = h.session.frame();
    assert!(snap.asteroids.is_empty());
    assert_eq!(snap.elapsed_ms, 900);

    h.clock.advance(ms(1));
    let snap = h.session.frame();
    assert_eq!(snap.asteroids.len(), 1);
    assert_eq!(snap.elapsed_ms, 1_000);
    assert!(snap.events.contains(&GameEvent::AsteroidSpawned));

    let viewport = h.session.viewport;
    h.clock.advance(ms(2_050));
    let snap = h.session.frame();
    assert_eq!(snap.asteroids.len(), 3);
    assert_eq!(snap.elapsed_ms, 3_000);
    // Spawned outside, then one tick of motion at most a few pixels inward.
    for asteroid in &snap.asteroids {
        let p = asteroid.position;
        let margin = 20.0;
        let inside = p.x > margin && p.x < viewport.width - margin && p.y > margin && p.y < viewport.height - margin;
        assert!(!inside);
    }
}

#[test]
fn test_background_intensity_follows_elapsed_minutes() {
    let mut h = harness();
    h.clock.advance(ms(60_000));
    h.session.frame();
    {
        let intensity = h.audio.intensity.borrow();
        assert_eq!(intensity.len(), 600);
        assert_relative_eq!(intensity[0], 0.1 / 60.0);
        assert_relative_eq!(*intensity.last().unwrap(), 1.0);
    }

    h.session.asteroids.push(Asteroid::new(500.0, 500.0, 2.0));
    assert_eq!(h.session.tick().state, SessionState::GameOver);
    let reported = h.audio.intensity.borrow().len();
    h.clock.advance(ms(5_000));
    h.session.frame();
    h.session.frame();
    assert_eq!(h.audio.intensity.borrow().len(), reported);
}

// ---- Lifecycle ----

#[test]
fn test_reset_starts_fresh_session() {
    let mut h = harness();
    h.session.score = 400;
    h.session.asteroids.push(Asteroid::new(500.0, 500.0, 2.0));
    h.session.tick();
    assert_eq!(h.session.state(), SessionState::GameOver);

    h.session.reset();
    assert_eq!(h.session.state(), SessionState::Running);
    assert_eq!(h.session.score, 0);
    assert_eq!(h.session.elapsed, Duration::ZERO);
    assert_eq!(h.session.summary(), None);
    assert!(h.session.asteroids.is_empty());
    assert_eq!(h.audio.background.borrow().last(), Some(&"start"));

    h.clock.advance(ms(1_000));
    assert_eq!(h.session.frame().asteroids.len(), 1);

    h.session.asteroids.push(Asteroid::new(500.0, 500.0, 2.0));
    h.session.tick();
    assert_eq!(h.reports.borrow().len(), 2);
}

#[test]
fn test_determinism_same_seed() {
    let run = || {
        let mut h = harness();
        let mut frames = Vec::new();
        for step in 0..600u64 {
            h.clock.advance(ms(16));
            if step % 30 == 0 {
                h.session
                    .handle_input(&InputEvent::PointerMove(Vector2D::new(400.0 + step as f64 % 200.0, 500.0)));
                h.session.handle_input(&InputEvent::Fire(Vector2D::new(0.0, 0.0)));
            }
            let snap = h.session.frame();
            frames.push(serde_json::to_string(&snap).unwrap());
        }
        frames
    };
    assert_eq!(run(), run());
}
