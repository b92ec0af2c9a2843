use std::io::{self, Write};

use log::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cue {
    Shoot { volume: f64 },
    Explosion { volume: f64 },
    PowerUp,
}

pub const KILL_EXPLOSION_VOLUME: f64 = 0.4;
pub const GAME_OVER_EXPLOSION_VOLUME: f64 = 0.6;
pub const POWERUP_VOLUME: f64 = 0.5;

pub fn shoot_volume(elapsed_minutes: f64) -> f64 {
    0.3 + elapsed_minutes * 0.3
}

pub fn background_volume(difficulty: f64) -> f64 {
    (0.2 + difficulty * 0.1).min(0.8)
}

pub trait AudioSink {
    fn play(&mut self, cue: Cue);
    fn start_background(&mut self);
    fn stop_background(&mut self);
    fn set_background_intensity(&mut self, difficulty: f64);
}

pub struct LogAudio {
    bell: bool,
    background_playing: bool,
    background_volume: f64,
}

impl LogAudio {
    pub fn new(bell: bool) -> Self {
        LogAudio {
            bell,
            background_playing: false,
            background_volume: background_volume(0.0),
        }
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: Cue) {
        match cue {
            Cue::PowerUp => debug!("Audio cue: PowerUp at volume {:.2}", POWERUP_VOLUME),
            other => debug!("Audio cue: {:?}", other),
        }
        if self.bell && matches!(cue, Cue::Explosion { .. }) {
            // The bell is best effort; a failed write only loses the beep.
            let mut stdout = io::stdout();
            let _ = stdout.write_all(b"\x07").and_then(|_| stdout.flush());
        }
    }

    fn start_background(&mut self) {
        self.background_playing = true;
        info!("Background music started at volume {:.2}", self.background_volume);
    }

    fn stop_background(&mut self) {
        if self.background_playing {
            self.background_playing = false;
            info!("Background music stopped.");
        }
    }

    fn set_background_intensity(&mut self, difficulty: f64) {
        let volume = background_volume(difficulty);
        if (volume - self.background_volume).abs() >= 0.05 {
            debug!("Background volume {:.2} -> {:.2}", self.background_volume, volume);
        }
        self.background_volume = volume;
    }
}
