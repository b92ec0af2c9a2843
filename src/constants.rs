use std::time::Duration;

// --- Game Constants ---
pub const ROCKET_RADIUS: f64 = 16.0;
pub const PROJECTILE_SPEED: f64 = 8.0; // Pixels per tick
pub const PROJECTILE_RADIUS: f64 = 3.0;
pub const MULTI_SHOT_SPREAD: f64 = 0.2; // Radians either side of the main shot

pub const ASTEROID_RADIUS: f64 = 15.0;
pub const INITIAL_ASTEROID_SPEED: f64 = 2.0; // Pixels per tick
pub const ASTEROID_SPEED_RAMP_PER_MINUTE: f64 = 0.3;
pub const ASTEROID_SPEED_CAP_MULTIPLIER: f64 = 4.0;
pub const ASTEROID_SPEED_JITTER: f64 = 0.3; // +/- 30% around the base speed

pub const POWERUP_RADIUS: f64 = 15.0;
pub const POWERUP_SPAWN_CHANCE: f64 = 0.1;
pub const POWERUP_DURATION: Duration = Duration::from_millis(5000);

pub const SCORE_PER_ASTEROID: u32 = 100;

pub const ASTEROID_SPAWN_INTERVAL: Duration = Duration::from_millis(1000);
pub const ELAPSED_TIME_INTERVAL: Duration = Duration::from_millis(100);

pub const PARTICLE_LIFETIME: Duration = Duration::from_millis(500);
pub const EXPLOSION_PARTICLES: usize = 8;
pub const PICKUP_PARTICLES: usize = 12;
pub const PARTICLE_SPREAD: f64 = 20.0; // Particles scatter within a 20px square

pub const HEADING_OFFSET_DEGREES: f64 = 90.0; // Sprite faces up at angle 0

// --- Terminal front end ---
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;
pub const FRAME_DURATION: Duration = Duration::from_millis(16); // ~60 FPS
pub const BANNER_FRAMES: u64 = 120;
pub const SAVE_WAIT_ON_EXIT: Duration = Duration::from_secs(2);
pub const LOG_FILE: &str = "rocket-asteroids.log";
pub const DEFAULT_SCORES_FILE: &str = "scores.jsonl";
