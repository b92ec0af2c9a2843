use std::io::{self, Write};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind},
};
use log::{error, info, warn};

use crate::audio::LogAudio;
use crate::clock::{Clock, ManualClock, SystemClock};
use crate::config::{GameConfig, LaunchOptions};
use crate::constants::*;
use crate::persistence::{DetachedReporter, JsonLinesStore, PlayerIdentity, SaveOutcome};
use crate::powerups::PowerUpKind;
use crate::rendering::{GameGrid, OutputTarget, draw_snapshot};
use crate::session::{GameEvent, Session, SessionState, Snapshot};
use crate::terminal_io::{SimulatedInput, translate_mouse, viewport_for};

const TOP_SCORES_SHOWN: usize = 5;

pub struct Game {
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub stdout_target: OutputTarget,
    simulated_input: Option<SimulatedInput>,
    debug_mode_active: bool,
    max_frames: Option<u64>,
    config: GameConfig,
    identity: Option<PlayerIdentity>,
    store: Arc<JsonLinesStore>,
    outcomes_tx: Sender<SaveOutcome>,
    outcomes_rx: Receiver<SaveOutcome>,
    manual_clock: Option<ManualClock>,
    current_banner: Option<(String, u64)>,
    pending_saves: usize,
}

impl Game {
    pub fn new(
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        simulated_input: Option<SimulatedInput>,
        options: LaunchOptions,
    ) -> Self {
        let debug_mode_active = options.debug.is_some();
        let identity = options.player.as_deref().and_then(|name| match PlayerIdentity::new(name) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!("Ignoring player name: {}", e);
                None
            }
        });
        let (outcomes_tx, outcomes_rx) = mpsc::channel();

        Game {
            terminal_width,
            terminal_height,
            stdout_target,
            simulated_input,
            debug_mode_active,
            max_frames: options.debug.and_then(|d| d.max_frames),
            config: options.game,
            identity,
            store: Arc::new(JsonLinesStore::new(options.scores_path)),
            outcomes_tx,
            outcomes_rx,
            // Debug runs advance time by exactly one frame per tick.
            manual_clock: debug_mode_active.then(ManualClock::new),
            current_banner: None,
            pending_saves: 0,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        if !self.debug_mode_active {
            self.show_title_screen()?;
        }

        // The session clock starts here, so time spent on the title screen does not count.
        let clock: Box<dyn Clock> = match &self.manual_clock {
            Some(clock) => Box::new(clock.clone()),
            None => Box::new(SystemClock::new()),
        };
        let reporter = DetachedReporter::new(self.identity.clone(), Arc::clone(&self.store), self.outcomes_tx.clone());
        let mut session = Session::new(
            self.config.clone(),
            viewport_for(self.terminal_width, self.terminal_height),
            clock,
            Box::new(LogAudio::new(!self.debug_mode_active)),
            Box::new(reporter),
        );

        let mut game_grid = GameGrid::new(self.terminal_width, self.terminal_height);
        let mut running = true;
        let mut frame_count = 0;

        while running && self.max_frames.is_none_or(|max| frame_count < max) {
            self.handle_input(&mut session, &mut game_grid, &mut running, frame_count)?;
            if !running {
                break;
            }
            if let Some(clock) = &self.manual_clock {
                clock.advance(FRAME_DURATION);
            }

            let snapshot = session.frame();
            self.process_events(&snapshot.events, frame_count);
            self.drain_save_outcomes(frame_count);

            game_grid.clear();
            draw_snapshot(&mut game_grid, &snapshot);
            self.render(&game_grid, &snapshot, frame_count)?;

            frame_count += 1;
        }

        info!("Game loop ended after {} frames.", frame_count);
        self.wait_for_pending_saves();
        Ok(())
    }

    fn handle_input(
        &mut self,
        session: &mut Session,
        game_grid: &mut GameGrid,
        running: &mut bool,
        frame_count: u64,
    ) -> io::Result<()> {
        if self.debug_mode_active {
            let events = match &mut self.simulated_input {
                Some(sim_input) => sim_input.take(frame_count),
                None => Vec::new(),
            };
            for event in events {
                self.apply_event(event, session, game_grid, running)?;
            }
            return Ok(());
        }

        // Drain everything that arrives before the next frame is due.
        let deadline = Instant::now() + FRAME_DURATION;
        while *running {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            if !event::poll(remaining).map_err(|e| {
                error!("Failed to poll event: {}", e);
                e
            })? {
                break;
            }
            let event = event::read().map_err(|e| {
                error!("Failed to read event: {}", e);
                e
            })?;
            self.apply_event(event, session, game_grid, running)?;
        }
        Ok(())
    }

    fn apply_event(
        &mut self,
        event: Event,
        session: &mut Session,
        game_grid: &mut GameGrid,
        running: &mut bool,
    ) -> io::Result<()> {
        match event {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    info!("Quit key pressed. Exiting game loop.");
                    *running = false;
                }
                KeyCode::Char('r') if session.state() == SessionState::GameOver => {
                    session.reset();
                    self.current_banner = None;
                }
                _ => {}
            },
            Event::Mouse(mouse_event) => {
                if let Some(input) = translate_mouse(&mouse_event) {
                    session.handle_input(&input);
                }
            }
            Event::Resize(new_width, new_height) => {
                self.terminal_width = new_width;
                self.terminal_height = new_height;
                session.set_viewport(viewport_for(new_width, new_height));
                *game_grid = GameGrid::new(new_width, new_height);
                game_grid.clear_screen_manual(&mut self.stdout_target, new_width, new_height)?;
                info!("Terminal resized to {}x{}", new_width, new_height);
            }
            _ => {}
        }
        Ok(())
    }

    fn process_events(&mut self, events: &[GameEvent], frame_count: u64) {
        for event in events {
            match event {
                GameEvent::PowerUpCollected(kind) => {
                    let message = format!(
                        "{} active for {}s",
                        kind.label(),
                        self.config.power_up_duration.as_secs()
                    );
                    self.current_banner = Some((message, frame_count + BANNER_FRAMES));
                }
                GameEvent::GameOver(summary) => {
                    if self.identity.is_some() {
                        self.pending_saves += 1;
                    } else {
                        self.current_banner = Some((
                            format!("Score {} not saved: no player name", summary.score),
                            frame_count + BANNER_FRAMES,
                        ));
                    }
                }
                _ => {}
            }
        }
    }

    fn drain_save_outcomes(&mut self, frame_count: u64) {
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.pending_saves = self.pending_saves.saturating_sub(1);
            self.current_banner = Some((save_message(outcome), frame_count + BANNER_FRAMES));
        }
    }

    // Quitting right after game over must not drop the save on the floor.
    fn wait_for_pending_saves(&mut self) {
        let deadline = Instant::now() + SAVE_WAIT_ON_EXIT;
        while self.pending_saves > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.outcomes_rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    self.pending_saves -= 1;
                    info!("{}", save_message(outcome));
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    warn!("Exiting with {} score save(s) still pending.", self.pending_saves);
                    break;
                }
            }
        }
    }

    fn write_at(&mut self, x: u16, y: u16, text: &str) -> io::Result<()> {
        self.stdout_target.execute_move_to(MoveTo(x, y))?;
        write!(self.stdout_target, "{}", text)
    }

    fn write_centered(&mut self, y: u16, text: &str) -> io::Result<()> {
        let x = centered(self.terminal_width, text);
        self.write_at(x, y, text)
    }

    fn render(&mut self, game_grid: &GameGrid, snapshot: &Snapshot, frame_count: u64) -> io::Result<()> {
        game_grid.render(&mut self.stdout_target)?;

        let hud = format!(
            "Score: {}  Time: {:.1}s",
            snapshot.score,
            snapshot.elapsed_ms as f64 / 1000.0
        );
        self.write_at(0, 0, &hud)?;

        let timers: Vec<String> = PowerUpKind::ALL
            .iter()
            .filter_map(|kind| {
                remaining_ms(snapshot, *kind).map(|ms| format!("{} {:.1}s", kind.label(), ms as f64 / 1000.0))
            })
            .collect();
        if !timers.is_empty() {
            let text = timers.join("  ");
            let x = self.terminal_width.saturating_sub(text.chars().count() as u16);
            self.write_at(x, 0, &text)?;
        }

        let controls_text = [
            "Mouse      : Steer",
            "Left click : Fire",
            "Right drag : Drag rocket",
            "q          : Quit",
        ];
        let controls_start_y = self.terminal_height.saturating_sub(controls_text.len() as u16);
        for (i, line) in controls_text.iter().enumerate() {
            self.write_at(0, controls_start_y.saturating_add(i as u16), line)?;
        }

        if let Some((message, display_until_frame)) = self.current_banner.clone() {
            if frame_count < display_until_frame {
                self.write_centered((self.terminal_height / 2).saturating_sub(5), &message)?;
            } else {
                self.current_banner = None;
            }
        }

        if snapshot.state == SessionState::GameOver {
            self.show_game_over_overlay(snapshot)?;
        }

        self.stdout_target.flush()?;
        if self.debug_mode_active {
            self.stdout_target.dump_to_log();
        }
        Ok(())
    }

    fn show_game_over_overlay(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let lines = [
            "GAME OVER!".to_string(),
            format!("Final Score: {}", snapshot.score),
            format!("Time: {:.1}s", snapshot.elapsed_ms as f64 / 1000.0),
            "r : Restart    q : Quit".to_string(),
        ];
        let start_y = (self.terminal_height / 2).saturating_sub(2);
        for (i, line) in lines.iter().enumerate() {
            self.write_centered(start_y.saturating_add(i as u16 * 2), line)?;
        }
        Ok(())
    }

    fn show_title_screen(&mut self) -> io::Result<()> {
        let title_art = [
            r"ROCKET ASTEROIDS",
            r"        ^        ",
            r"       / \    @  ",
            r"      |   |      ",
            r"      |   |  @   ",
            r"     /_____\     ",
            r"       ***       ",
        ];

        let title_start_y = (self.terminal_height / 2).saturating_sub(title_art.len() as u16);
        for (i, line) in title_art.iter().enumerate() {
            self.write_centered(title_start_y + i as u16, line)?;
        }

        let top_scores = match self.store.top_scores(TOP_SCORES_SHOWN) {
            Ok(records) => records,
            Err(e) => {
                warn!("Could not load high scores: {}", e);
                Vec::new()
            }
        };
        let mut y = title_start_y + title_art.len() as u16 + 1;
        if !top_scores.is_empty() {
            self.write_centered(y, "High Scores")?;
            for record in &top_scores {
                y += 1;
                let line = format!(
                    "{:<12} {:>7}  {:>6.1}s",
                    record.player,
                    record.score,
                    record.elapsed_ms as f64 / 1000.0
                );
                self.write_centered(y, &line)?;
            }
        }

        let press_any_key_msg = "Press any key to start...";
        self.write_centered(self.terminal_height.saturating_sub(5), press_any_key_msg)?;
        self.stdout_target.flush()?;
        info!("Title screen displayed. Waiting for key press.");

        loop {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    break;
                }
            }
        }

        let game_grid_dummy = GameGrid::new(self.terminal_width, self.terminal_height);
        game_grid_dummy.clear_screen_manual(&mut self.stdout_target, self.terminal_width, self.terminal_height)?;
        self.stdout_target.flush()?;
        std::thread::sleep(Duration::from_millis(100));
        Ok(())
    }
}

fn save_message(outcome: SaveOutcome) -> String {
    match outcome {
        SaveOutcome::Saved(record) => format!("Score {} saved for {}", record.score, record.player),
        SaveOutcome::Failed(reason) => format!("Score not saved: {}", reason),
    }
}

fn centered(width: u16, text: &str) -> u16 {
    (width / 2).saturating_sub(text.chars().count() as u16 / 2)
}

fn remaining_ms(snapshot: &Snapshot, kind: PowerUpKind) -> Option<u64> {
    match kind {
        PowerUpKind::Shield => snapshot.shield_remaining_ms,
        PowerUpKind::MultiShot => snapshot.multi_shot_remaining_ms,
    }
}
