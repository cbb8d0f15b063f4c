use clap::Parser;
use log::{LevelFilter, warn};

use crate::constants::{CELL_HEIGHT, CELL_WIDTH};
use crate::types::Bounds;

#[derive(Parser, Debug, Clone)]
#[command(name = "vibe-asteroids")]
#[command(about = "Asteroids in the terminal: arrows to fly, space to shoot, p to pause, q to quit")]
pub struct Config {
    /// Run headless into an in-memory screen with scripted input, dumping
    /// every frame to the log
    #[arg(long)]
    pub debug: bool,

    /// Board width in terminal columns (debug mode)
    #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u16).range(1..))]
    pub width: u16,

    /// Board height in terminal rows (debug mode)
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u16).range(1..))]
    pub height: u16,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// RNG seed; a random one is picked when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log file (the terminal itself is the game screen)
    #[arg(long, default_value = "vibe-asteroids.log")]
    pub log_file: String,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

impl Config {
    /// World-space size of a board that is `columns` x `rows` cells.
    pub fn board_size(columns: u16, rows: u16) -> Bounds {
        Bounds::new(columns as f64 * CELL_WIDTH, rows as f64 * CELL_HEIGHT)
    }

    /// Board size for a terminal reporting `columns` x `rows`. A zero
    /// dimension leaves nothing to play on, so the configured size is used.
    pub fn board_cells(&self, columns: u16, rows: u16) -> (u16, u16) {
        if columns == 0 || rows == 0 {
            warn!("Terminal reported {}x{}, using {}x{}", columns, rows, self.width, self.height);
            (self.width, self.height)
        } else {
            (columns, rows)
        }
    }

    /// Frames played before the scripted quit in debug mode.
    pub fn debug_frames(&self) -> u64 {
        self.frames.unwrap_or(120)
    }
}
