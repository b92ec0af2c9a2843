use std::env;
use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, Show},
    event::{DisableMouseCapture, EnableMouseCapture},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use log::{error, info};

mod asteroids;
mod audio;
mod clock;
mod collision;
mod config;
mod constants;
mod entities;
mod game;
mod input;
mod persistence;
mod powerups;
mod projectiles;
mod rendering;
mod rocket;
mod scheduler;
mod session;
mod terminal_io;
mod types;

use crate::config::parse_args;
use crate::constants::LOG_FILE;
use crate::game::Game;
use crate::rendering::{GameGrid, OutputTarget, ScreenBuffer};
use crate::terminal_io::SimulatedInput;

fn main() -> io::Result<()> {
    simple_logging::log_to_file(LOG_FILE, log::LevelFilter::Info)?;
    info!("Starting Rocket Asteroids.");

    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args);

    if let Some(debug) = &options.debug {
        info!("Debug mode enabled at {}x{}.", debug.width, debug.height);
        let stdout_target = OutputTarget::ScreenBuffer(ScreenBuffer::new(debug.width, debug.height));
        let quit_at = debug.max_frames.unwrap_or(600);
        let simulated_input = SimulatedInput::demo(debug.width, debug.height, quit_at);
        let (width, height) = (debug.width, debug.height);
        let mut game = Game::new(width, height, stdout_target, Some(simulated_input), options);
        return game.run();
    }

    enable_raw_mode().map_err(|e| {
        error!("Failed to enable raw mode: {}", e);
        e
    })?;
    let mut stdout_target = OutputTarget::Stdout(io::stdout());
    let (width, height) = match setup_terminal(&mut stdout_target) {
        Ok(dimensions) => dimensions,
        Err(e) => {
            error!("Failed to set up the terminal: {}", e);
            restore_terminal(&mut stdout_target);
            return Err(e);
        }
    };
    info!("Terminal size: {}x{}", width, height);

    let mut game = Game::new(width, height, stdout_target, None, options);
    let result = game.run();
    restore_terminal(&mut game.stdout_target);
    if let Err(e) = &result {
        error!("Game ended with an error: {}", e);
    }
    info!("Exiting Rocket Asteroids.");
    result
}

fn setup_terminal(stdout_target: &mut OutputTarget) -> io::Result<(u16, u16)> {
    let (width, height) = size()?;
    stdout_target.execute_other_command(EnableMouseCapture)?;
    stdout_target.execute_other_command(Hide)?;
    let game_grid_dummy = GameGrid::new(width, height);
    game_grid_dummy.clear_screen_manual(stdout_target, width, height)?;
    stdout_target.flush()?;
    Ok((width, height))
}

fn restore_terminal(stdout_target: &mut OutputTarget) {
    if let Err(e) = stdout_target.execute_other_command(DisableMouseCapture) {
        error!("Failed to disable mouse capture: {}", e);
    }
    if let Err(e) = stdout_target.execute_other_command(Show) {
        error!("Failed to show cursor on exit: {}", e);
    }
    if let Err(e) = disable_raw_mode() {
        error!("Failed to disable raw mode on exit: {}", e);
    }
}
