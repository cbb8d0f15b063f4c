#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    /// Unit vector for a screen-space heading. Screen y grows downwards, so a
    /// positive angle turns counter-clockwise as seen by the player.
    pub fn from_heading(angle: f64) -> Self {
        Vector2D::new(angle.cos(), -angle.sin())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn distance_to(&self, other: Vector2D) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Size of the playfield in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Bounds { width, height }
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.width / 2.0, self.height / 2.0)
    }

    /// Toroidal wrap of a point. An entity only re-enters once it is fully off
    /// screen (`margin` past the edge), and it re-enters fully hidden on the
    /// opposite side.
    pub fn wrap(&self, position: Vector2D, margin: f64) -> Vector2D {
        Vector2D::new(
            wrap_coordinate(position.x, self.width, margin),
            wrap_coordinate(position.y, self.height, margin),
        )
    }
}

pub fn wrap_coordinate(value: f64, max: f64, margin: f64) -> f64 {
    if value < -margin {
        max + margin
    } else if value > max + margin {
        -margin
    } else {
        value
    }
}

/// Circle overlap test used for every collision in the game.
pub fn circles_overlap(a: Vector2D, radius_a: f64, b: Vector2D, radius_b: f64) -> bool {
    a.distance_to(b) < radius_a + radius_b
}
