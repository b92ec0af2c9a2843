use std::path::PathBuf;
use std::time::Duration;

use log::warn;

use crate::constants::*;

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub seed: Option<u64>,
    pub projectile_speed: f64,
    pub multi_shot_spread: f64,
    pub initial_asteroid_speed: f64,
    pub power_up_spawn_chance: f64,
    pub power_up_duration: Duration,
    pub score_per_asteroid: u32,
    pub asteroid_spawn_interval: Duration,
    pub elapsed_time_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            seed: None,
            projectile_speed: PROJECTILE_SPEED,
            multi_shot_spread: MULTI_SHOT_SPREAD,
            initial_asteroid_speed: INITIAL_ASTEROID_SPEED,
            power_up_spawn_chance: POWERUP_SPAWN_CHANCE,
            power_up_duration: POWERUP_DURATION,
            score_per_asteroid: SCORE_PER_ASTEROID,
            asteroid_spawn_interval: ASTEROID_SPAWN_INTERVAL,
            elapsed_time_interval: ELAPSED_TIME_INTERVAL,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DebugOptions {
    pub width: u16,
    pub height: u16,
    pub max_frames: Option<u64>,
}

impl Default for DebugOptions {
    fn default() -> Self {
        DebugOptions {
            width: 80,
            height: 24,
            max_frames: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LaunchOptions {
    pub debug: Option<DebugOptions>,
    pub player: Option<String>,
    pub scores_path: PathBuf,
    pub game: GameConfig,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        LaunchOptions {
            debug: None,
            player: None,
            scores_path: PathBuf::from(DEFAULT_SCORES_FILE),
            game: GameConfig::default(),
        }
    }
}

/// `--debug [width height [frames]] --player NAME --seed N --scores PATH`.
/// `args` excludes the program name.
pub fn parse_args(args: &[String]) -> LaunchOptions {
    let mut options = LaunchOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--debug" => {
                let mut debug = DebugOptions::default();
                let numbers: Vec<u64> = args[i + 1..]
                    .iter()
                    .take(3)
                    .map_while(|a| a.parse::<u64>().ok())
                    .collect();
                if numbers.len() >= 2 {
                    debug.width = u16::try_from(numbers[0]).unwrap_or(debug.width);
                    debug.height = u16::try_from(numbers[1]).unwrap_or(debug.height);
                    i += 2;
                }
                if numbers.len() == 3 {
                    debug.max_frames = Some(numbers[2]);
                    i += 1;
                }
                options.debug = Some(debug);
            }
            "--player" => match args.get(i + 1) {
                Some(name) => {
                    options.player = Some(name.clone());
                    i += 1;
                }
                None => warn!("--player needs a name"),
            },
            "--seed" => match args.get(i + 1).and_then(|s| s.parse::<u64>().ok()) {
                Some(seed) => {
                    options.game.seed = Some(seed);
                    i += 1;
                }
                None => warn!("--seed needs a number"),
            },
            "--scores" => match args.get(i + 1) {
                Some(path) => {
                    options.scores_path = PathBuf::from(path);
                    i += 1;
                }
                None => warn!("--scores needs a path"),
            },
            other => warn!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }
    options
}
