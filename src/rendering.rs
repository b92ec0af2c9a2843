use std::io::{self, Write};

use crossterm::{cursor::MoveTo, execute};
use log::info;

use crate::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX, ROCKET_RADIUS};
use crate::entities::ParticleKind;
use crate::powerups::PowerUpKind;
use crate::session::Snapshot;
use crate::types::Vector2D;

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for y in 0..self.height {
            info!("{}", self.row(y));
        }
        info!("---------------------");
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Ignore in debug mode
        }
    }

    pub fn dump_to_log(&self) {
        if let OutputTarget::ScreenBuffer(sb) = self {
            sb.print_to_log();
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => sb.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}

pub fn pixel_to_cell(point: Vector2D) -> (i64, i64) {
    (
        (point.x / CELL_WIDTH_PX).floor() as i64,
        (point.y / CELL_HEIGHT_PX).floor() as i64,
    )
}

pub fn rocket_char(angle_degrees: f64) -> char {
    let normalized = angle_degrees.rem_euclid(360.0);
    if !(45.0..315.0).contains(&normalized) {
        '^'
    } else if normalized < 135.0 {
        '>'
    } else if normalized < 225.0 {
        'v'
    } else {
        '<'
    }
}

// --- GameGrid for geometric rendering ---
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn set_cell(&mut self, x: i64, y: i64, c: char) {
        if x >= 0 && y >= 0 && y < self.height as i64 && x < self.width as i64 {
            self.grid[y as usize][x as usize] = c;
        }
    }

    pub fn plot_disc(&mut self, center: Vector2D, radius: f64, c: char) {
        let (cx, cy) = pixel_to_cell(center);
        self.set_cell(cx, cy, c);

        let (min_x, min_y) = pixel_to_cell(Vector2D::new(center.x - radius, center.y - radius));
        let (max_x, max_y) = pixel_to_cell(Vector2D::new(center.x + radius, center.y + radius));
        for y in min_y.max(0)..=max_y.min(self.height as i64 - 1) {
            for x in min_x.max(0)..=max_x.min(self.width as i64 - 1) {
                let cell_center = Vector2D::new(
                    (x as f64 + 0.5) * CELL_WIDTH_PX,
                    (y as f64 + 0.5) * CELL_HEIGHT_PX,
                );
                if cell_center.distance_to(center) <= radius {
                    self.set_cell(x, y, c);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.grid = vec![vec![' '; self.width as usize]; self.height as usize];
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", self.grid[y as usize].iter().collect::<String>())?;
        }
        Ok(())
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget, terminal_width: u16, terminal_height: u16) -> io::Result<()> {
        for y in 0..terminal_height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(terminal_width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

pub fn draw_snapshot(grid: &mut GameGrid, snapshot: &Snapshot) {
    let rocket = &snapshot.rocket;
    if snapshot.shield_remaining_ms.is_some() {
        grid.plot_disc(rocket.position, ROCKET_RADIUS + CELL_WIDTH_PX, '.');
    }
    for particle in &snapshot.particles {
        let c = match particle.kind {
            ParticleKind::Explosion => '+',
            ParticleKind::ShieldPickup => '#',
            ParticleKind::MultiShotPickup => '~',
        };
        grid.plot_disc(particle.position, 0.0, c);
    }
    for power_up in &snapshot.power_ups {
        let c = match power_up.kind {
            PowerUpKind::Shield => 'S',
            PowerUpKind::MultiShot => 'M',
        };
        grid.plot_disc(power_up.position, 0.0, c);
    }
    for asteroid in &snapshot.asteroids {
        grid.plot_disc(asteroid.position, asteroid.radius, '@');
    }
    for projectile in &snapshot.projectiles {
        grid.plot_disc(projectile.position, 0.0, '*');
    }
    grid.plot_disc(rocket.position, 0.0, rocket_char(rocket.angle));
}
