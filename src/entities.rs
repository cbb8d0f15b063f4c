use std::f64::consts::TAU;

use crossterm::style::Color;
use rand::Rng;

use crate::constants::*;
use crate::rendering::{Brush, Renderer};
use crate::types::{Bounds, Vector2D};

pub type EntityId = u32;

/// Converts elapsed milliseconds into reference frames.
pub fn frame_scale(delta_ms: f64) -> f64 {
    delta_ms / REFERENCE_FRAME_MS
}

// --- Bullet ---
#[derive(Clone, Debug)]
pub struct Bullet {
    pub id: EntityId,
    pub position: Vector2D,
    pub angle: f64,
    pub velocity: Vector2D,
    pub radius: f64,
    pub created_at: f64,
    pub duration: f64,
    pub remove: bool,
}

impl Bullet {
    pub fn new(id: EntityId, position: Vector2D, angle: f64, now: f64) -> Self {
        Bullet::with_duration(id, position, angle, now, BULLET_DURATION_MS)
    }

    pub fn with_duration(id: EntityId, position: Vector2D, angle: f64, now: f64, duration: f64) -> Self {
        Bullet {
            id,
            position,
            angle,
            velocity: Vector2D::from_heading(angle).scale(BULLET_SPEED),
            radius: BULLET_RADIUS,
            created_at: now,
            duration,
            remove: false,
        }
    }

    pub fn update(&mut self, delta_ms: f64, now: f64, bounds: Bounds) {
        self.position = self.position.add(self.velocity.scale(frame_scale(delta_ms)));
        self.position = bounds.wrap(self.position, 0.0);

        if now - self.created_at >= self.duration {
            self.remove = true;
        }
    }

    pub fn draw(&self, renderer: &mut impl Renderer) {
        renderer.draw_circle(self.position, self.radius, Brush::Fill, Color::White);
    }
}

// --- Ship ---
#[derive(Clone, Debug)]
pub struct Ship {
    pub position: Vector2D,
    pub radius: f64,
    pub angle: f64, // Radians, 0 faces right
    pub rotation: f64,
    pub thrust: Vector2D,
    pub thrusting: bool,
    pub health: u32,
    pub last_collision_time: Option<f64>,
}

impl Ship {
    pub fn new(position: Vector2D) -> Self {
        Ship {
            position,
            radius: SHIP_RADIUS,
            angle: 0.0,
            rotation: 0.0,
            thrust: Vector2D::ZERO,
            thrusting: false,
            health: SHIP_MAX_HEALTH,
            last_collision_time: None,
        }
    }

    pub fn update(&mut self, delta_ms: f64, bounds: Bounds) {
        let scale = frame_scale(delta_ms);
        if self.thrusting {
            let push = Vector2D::from_heading(self.angle).scale(SHIP_THRUST_POWER * scale);
            self.thrust = self.thrust.add(push);
        } else {
            self.thrust = self.thrust.scale(SHIP_FRICTION.powf(scale));
        }

        self.position = self.position.add(self.thrust.scale(scale));
        self.angle += self.rotation * scale;

        self.position = bounds.wrap(self.position, self.radius);
    }

    pub fn fire(&self, id: EntityId, now: f64) -> Bullet {
        Bullet::new(id, self.position, self.angle, now)
    }

    /// True once the invulnerability window from the last hit has passed.
    pub fn can_take_hit(&self, now: f64) -> bool {
        self.last_collision_time
            .is_none_or(|last| now - last > SHIP_COLLISION_COOLDOWN_MS)
    }

    /// Respawn after a non-fatal hit: somewhere near the centre, motionless,
    /// with a fresh invulnerability window.
    pub fn reset(&mut self, now: f64, bounds: Bounds, rng: &mut impl Rng) {
        let spread_x = SHIP_SAFE_DISTANCE.min(bounds.width / 2.0 - self.radius).max(0.0);
        let spread_y = SHIP_SAFE_DISTANCE.min(bounds.height / 2.0 - self.radius).max(0.0);
        let center = bounds.center();
        self.position = Vector2D::new(
            center.x + rng.gen_range(-spread_x..=spread_x),
            center.y + rng.gen_range(-spread_y..=spread_y),
        );
        self.thrust = Vector2D::ZERO;
        self.angle = 0.0;
        self.rotation = 0.0;
        self.thrusting = false;
        self.last_collision_time = Some(now);
    }

    pub fn hull(&self) -> [Vector2D; 3] {
        let (sin, cos) = self.angle.sin_cos();
        let (x, y, r) = (self.position.x, self.position.y, self.radius);
        [
            Vector2D::new(x + r * cos, y - r * sin),
            Vector2D::new(x - r * (cos + sin), y + r * (sin - cos)),
            Vector2D::new(x - r * (cos - sin), y + r * (sin + cos)),
        ]
    }

    pub fn draw(&self, renderer: &mut impl Renderer, now: f64) {
        renderer.draw_polygon(&self.hull(), Color::White);
        if !self.can_take_hit(now) {
            renderer.draw_circle(self.position, self.radius * 1.5, Brush::Stroke, Color::DarkCyan);
        }
        if self.thrusting {
            let exhaust = self.position.add(Vector2D::from_heading(self.angle).scale(-self.radius * 1.5));
            renderer.draw_circle(exhaust, 1.0, Brush::Fill, Color::Yellow);
        }
    }
}

// --- Asteroid ---
#[derive(Clone, Debug)]
pub struct Asteroid {
    pub id: EntityId,
    pub position: Vector2D,
    pub radius: f64,
    pub velocity: Vector2D,
    pub vertices: usize,
    pub angle_offsets: Vec<f64>, // Fixed at spawn so the outline doesn't shimmer
    pub destroyed: bool,
}

impl Asteroid {
    pub fn new(id: EntityId, position: Vector2D, radius: f64, rng: &mut impl Rng) -> Self {
        let heading = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(ASTEROID_MIN_SPEED..ASTEROID_MAX_SPEED);
        let vertices = rng.gen_range(ASTEROID_MIN_VERTICES..=ASTEROID_MAX_VERTICES);
        let angle_offsets = (0..vertices).map(|_| rng.gen_range(0.0..TAU)).collect();

        Asteroid {
            id,
            position,
            radius,
            velocity: Vector2D::new(heading.cos() * speed, heading.sin() * speed),
            vertices,
            angle_offsets,
            destroyed: false,
        }
    }

    pub fn update(&mut self, delta_ms: f64, bounds: Bounds) {
        self.position = self.position.add(self.velocity.scale(frame_scale(delta_ms)));
        self.position = bounds.wrap(self.position, self.radius);
    }

    pub fn outline(&self) -> Vec<Vector2D> {
        let step = TAU / self.vertices as f64;
        self.angle_offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| {
                let angle = step * i as f64 + offset;
                Vector2D::new(
                    self.position.x + angle.cos() * self.radius,
                    self.position.y + angle.sin() * self.radius,
                )
            })
            .collect()
    }

    pub fn draw(&self, renderer: &mut impl Renderer) {
        renderer.draw_polygon(&self.outline(), Color::Grey);
    }
}
