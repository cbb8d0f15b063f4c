use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

mod config;
mod constants;
mod entities;
mod game;
mod input;
mod rendering;
mod simulation;
mod terminal_io;
mod types;
mod world;

use config::Config;
use constants::KEY_RELEASE_TIMEOUT_MS;
use game::Game;
use rendering::{GameGrid, OutputTarget, ScreenBuffer};
use simulation::Simulation;
use terminal_io::{SimulatedInput, TerminalSession};
use world::World;

fn main() -> Result<()> {
    let config = Config::parse();
    simple_logging::log_to_file(&config.log_file, config.log_level)
        .with_context(|| format!("failed to open log file {}", config.log_file))?;
    info!("Starting vibe-asteroids application.");

    let seed = config.seed.unwrap_or_else(rand::random);
    info!("Using seed {}", seed);

    if config.debug {
        run_debug(&config, seed)
    } else {
        run_terminal(&config, seed)
    }
}

/// Headless run: scripted input, frames dumped to the log.
fn run_debug(config: &Config, seed: u64) -> Result<()> {
    let (columns, rows) = (config.width, config.height);
    info!("Debug mode enabled, board {}x{}", columns, rows);

    let frames = config.debug_frames();
    let world = World::new(Config::board_size(columns, rows), seed);
    let mut game = Game::new(
        Simulation::new(world),
        columns,
        rows,
        OutputTarget::ScreenBuffer(ScreenBuffer::new(columns, rows)),
        Some(SimulatedInput::demo_script(frames)),
        None,
        Some(frames + 1),
    );
    game.run().context("debug session failed")
}

fn run_terminal(config: &Config, seed: u64) -> Result<()> {
    let session = TerminalSession::enter().context("failed to prepare the terminal")?;
    let (columns, rows) = TerminalSession::size().context("failed to read the terminal size")?;
    let (columns, rows) = config.board_cells(columns, rows);
    info!("Terminal size: {}x{}", columns, rows);

    let mut stdout_target = OutputTarget::Stdout(io::stdout());
    GameGrid::clear_screen_manual(&mut stdout_target, columns, rows).context("failed to clear the screen")?;

    let release_timeout = (!session.reports_releases()).then_some(KEY_RELEASE_TIMEOUT_MS);
    let world = World::new(Config::board_size(columns, rows), seed);
    let mut game = Game::new(
        Simulation::new(world),
        columns,
        rows,
        stdout_target,
        None,
        release_timeout,
        config.frames,
    );

    let result = game.run();
    let cleared = game.clear_screen();
    drop(session);
    info!("Session over at level {}", game.sim.world.level);

    result.context("game loop failed")?;
    cleared.context("failed to clear the screen")
}
