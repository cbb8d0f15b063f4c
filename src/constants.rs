// --- Timing ---
pub const REFERENCE_FRAME_MS: f64 = 16.67; // All per-step rates are tuned for this frame length
pub const MAX_FRAME_DELTA_MS: f64 = 250.0; // Longer stalls are integrated as this much time
pub const KEY_RELEASE_TIMEOUT_MS: f64 = 200.0; // Synthetic key-up when the terminal can't report releases

// --- Terminal canvas ---
pub const CELL_WIDTH: f64 = 10.0; // World units per terminal column
pub const CELL_HEIGHT: f64 = 20.0; // World units per terminal row (cells are roughly twice as tall as wide)

// --- Ship ---
pub const SHIP_RADIUS: f64 = 20.0;
pub const SHIP_ROTATION_SPEED: f64 = 0.1; // Radians per reference frame
pub const SHIP_THRUST_POWER: f64 = 0.1;
pub const SHIP_FRICTION: f64 = 0.98; // Fraction of thrust retained per reference frame when coasting
pub const SHIP_MAX_HEALTH: u32 = 3;
pub const SHIP_SAFE_DISTANCE: f64 = 300.0; // Max respawn scatter from the board centre
pub const SHIP_COLLISION_COOLDOWN_MS: f64 = 1000.0;

// --- Bullets ---
pub const BULLET_SPEED: f64 = 5.0;
pub const BULLET_RADIUS: f64 = 5.0;
pub const BULLET_DURATION_MS: f64 = 1000.0;

// --- Asteroids ---
pub const ASTEROID_RADIUS: f64 = 30.0;
pub const ASTEROID_MIN_SPEED: f64 = 1.0;
pub const ASTEROID_MAX_SPEED: f64 = 3.0;
pub const ASTEROID_MIN_VERTICES: usize = 6;
pub const ASTEROID_MAX_VERTICES: usize = 9;

// --- Levels ---
pub const ASTEROIDS_PER_LEVEL: usize = 2;
pub const BASE_ASTEROID_COUNT: usize = 8;
