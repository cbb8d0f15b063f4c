use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use crossterm::style::Color;
use log::{debug, error, info, warn};

use crate::config::Config;
use crate::constants::{CELL_HEIGHT, CELL_WIDTH, REFERENCE_FRAME_MS};
use crate::input::{self, InputController, InputOutcome};
use crate::rendering::{GameGrid, OutputTarget, Renderer};
use crate::simulation::{FrameReport, GamePhase, Simulation};
use crate::terminal_io::SimulatedInput;
use crate::types::Vector2D;

const FRAME_DURATION: Duration = Duration::from_micros(16_670);

/// The host side of the game: owns the simulation, feeds it time and input,
/// and paints the result onto the terminal (or a screen buffer in debug mode).
pub struct Game {
    pub sim: Simulation,
    input: InputController,
    game_grid: GameGrid,
    stdout_target: OutputTarget,
    simulated_input: Option<SimulatedInput>,
    max_frames: Option<u64>,
}

impl Game {
    pub fn new(
        sim: Simulation,
        columns: u16,
        rows: u16,
        stdout_target: OutputTarget,
        simulated_input: Option<SimulatedInput>,
        release_timeout: Option<f64>,
        max_frames: Option<u64>,
    ) -> Self {
        Game {
            sim,
            input: InputController::new(release_timeout),
            game_grid: GameGrid::new(columns, rows),
            stdout_target,
            simulated_input,
            max_frames,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        let started = Instant::now();
        let scripted = self.simulated_input.is_some();
        let mut frame_count: u64 = 0;

        while self.max_frames.is_none_or(|max| frame_count < max) {
            let frame_started = Instant::now();
            // Scripted runs get a perfectly steady clock so they replay identically
            let now = if scripted {
                frame_count as f64 * REFERENCE_FRAME_MS
            } else {
                started.elapsed().as_secs_f64() * 1000.0
            };

            if self.handle_input(frame_count, now)? == InputOutcome::Quit {
                info!("Quit requested on frame {}", frame_count);
                break;
            }
            self.input.expire_held_keys(&mut self.sim, now);

            let report = self.sim.advance(now);
            Self::log_report(&report, frame_count);

            self.draw(now);
            self.present(frame_count)?;

            frame_count += 1;
            if !scripted {
                // Wake early if input arrives; the next frame will pick it up
                let remaining = FRAME_DURATION.saturating_sub(frame_started.elapsed());
                event::poll(remaining).map_err(|e| { error!("Failed to poll event: {}", e); e })?;
            }
        }

        info!("Game loop finished after {} frames", frame_count);
        Ok(())
    }

    fn handle_input(&mut self, frame_count: u64, now: f64) -> io::Result<InputOutcome> {
        let events = match &mut self.simulated_input {
            Some(sim_input) => sim_input.take(frame_count),
            None => {
                let mut events = Vec::new();
                while event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
                    events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
                }
                events
            }
        };

        for event in events {
            match event {
                Event::Key(key_event) => {
                    if let Some((key, action)) = input::translate(&key_event) {
                        if self.input.handle(key, action, &mut self.sim, now) == InputOutcome::Quit {
                            return Ok(InputOutcome::Quit);
                        }
                    }
                }
                Event::Resize(columns, rows) => self.resize(columns, rows),
                _ => {}
            }
        }
        Ok(InputOutcome::Continue)
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        if columns == 0 || rows == 0 {
            warn!("Ignoring resize to {}x{}", columns, rows);
            return;
        }
        info!("Terminal resized to {}x{}", columns, rows);
        self.sim.world.bounds = Config::board_size(columns, rows);
        self.game_grid = GameGrid::new(columns, rows);
    }

    fn log_report(report: &FrameReport, frame_count: u64) {
        if !report.asteroids_destroyed.is_empty() || report.bullets_expired > 0 {
            debug!(
                "Frame {} ({:.1}ms): {} asteroids destroyed, {} bullets expired",
                frame_count,
                report.delta_ms,
                report.asteroids_destroyed.len(),
                report.bullets_expired
            );
        }
        if report.ship_hit && !report.game_over {
            debug!("Frame {}: ship respawned", frame_count);
        }
        if report.game_over {
            info!("Frame {}: game over, waiting for acknowledgement", frame_count);
        }
        if let Some(level) = report.level_up {
            info!("Frame {}: board cleared, now on level {}", frame_count, level);
        }
    }

    /// Paints the current world state; the grid is wiped first.
    pub fn draw(&mut self, now: f64) {
        let grid = &mut self.game_grid;
        let world = &self.sim.world;

        grid.clear_frame();
        for asteroid in &world.asteroids {
            asteroid.draw(grid);
        }
        for bullet in world.bullets.iter().filter(|bullet| !bullet.remove) {
            bullet.draw(grid);
        }
        world.ship.draw(grid, now);

        grid.draw_text(&format!("Health: {}", world.ship.health), Vector2D::new(CELL_WIDTH, 0.0), Color::White);
        grid.draw_text(&format!("Level: {}", world.level), Vector2D::new(CELL_WIDTH, CELL_HEIGHT), Color::White);

        let center = world.bounds.center();
        match self.sim.phase() {
            GamePhase::Playing => {}
            GamePhase::Paused => {
                draw_banner(grid, "PAUSED", center, Color::Yellow);
                draw_banner(grid, "press p to resume", center.add(Vector2D::new(0.0, CELL_HEIGHT)), Color::Grey);
            }
            GamePhase::GameOver => {
                draw_banner(grid, "Game Over! Restarting...", center, Color::Red);
                draw_banner(
                    grid,
                    "press space or enter to continue",
                    center.add(Vector2D::new(0.0, CELL_HEIGHT)),
                    Color::Grey,
                );
            }
        }
    }

    fn present(&mut self, frame_count: u64) -> io::Result<()> {
        if let OutputTarget::ScreenBuffer(sb) = &mut self.stdout_target {
            sb.blit(&self.game_grid);
            sb.print_to_log(frame_count);
            return Ok(());
        }
        self.game_grid.render(&mut self.stdout_target)?;
        self.stdout_target.flush()
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        let (columns, rows) = (self.game_grid.width, self.game_grid.height);
        GameGrid::clear_screen_manual(&mut self.stdout_target, columns, rows)?;
        self.stdout_target.flush()
    }
}

/// Text centred horizontally on `center`.
fn draw_banner(renderer: &mut impl Renderer, text: &str, center: Vector2D, color: Color) {
    let half_width = text.chars().count() as f64 * CELL_WIDTH / 2.0;
    renderer.draw_text(text, Vector2D::new(center.x - half_width, center.y), color);
}
