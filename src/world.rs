use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::constants::*;
use crate::entities::{Asteroid, Bullet, EntityId, Ship};
use crate::types::{Bounds, Vector2D};

/// Everything that lives on the board: the ship, the live asteroid and bullet
/// collections, and the level they belong to.
pub struct World {
    pub bounds: Bounds,
    pub level: u32,
    pub ship: Ship,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub(crate) rng: Pcg32,
    next_id: EntityId,
}

impl World {
    pub fn new(bounds: Bounds, seed: u64) -> Self {
        let mut world = World {
            bounds,
            level: 1,
            ship: Ship::new(bounds.center()),
            asteroids: Vec::new(),
            bullets: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 0,
        };
        world.asteroids = world.create_asteroids(Self::asteroid_count_for_level(world.level));
        world
    }

    pub fn asteroid_count_for_level(level: u32) -> usize {
        ASTEROIDS_PER_LEVEL * level as usize + BASE_ASTEROID_COUNT
    }

    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// `n` fresh asteroids scattered uniformly over the board.
    pub fn create_asteroids(&mut self, n: usize) -> Vec<Asteroid> {
        (0..n)
            .map(|_| {
                let id = self.next_entity_id();
                let position = Vector2D::new(
                    self.rng.gen_range(0.0..self.bounds.width),
                    self.rng.gen_range(0.0..self.bounds.height),
                );
                Asteroid::new(id, position, ASTEROID_RADIUS, &mut self.rng)
            })
            .collect()
    }

    pub fn next_level(&mut self) {
        self.level += 1;
        let count = Self::asteroid_count_for_level(self.level);
        self.asteroids = self.create_asteroids(count);
        info!("Level {} started with {} asteroids", self.level, count);
    }

    /// Back to the state of a fresh session: full health, level 1, nothing
    /// left over from the previous run. The ship gets a fresh invulnerability
    /// window starting at `now`.
    pub fn reset_game(&mut self, now: f64) {
        self.ship = Ship::new(self.bounds.center());
        self.ship.last_collision_time = Some(now);
        self.level = 1;
        self.bullets.clear();
        self.asteroids = self.create_asteroids(Self::asteroid_count_for_level(self.level));
        info!("World reset: level {}, {} asteroids", self.level, self.asteroids.len());
    }

    pub fn fire(&mut self, now: f64) -> EntityId {
        let id = self.next_entity_id();
        let bullet = self.ship.fire(id, now);
        debug!("Bullet {} fired at angle {:.2}", id, bullet.angle);
        self.bullets.push(bullet);
        id
    }
}
