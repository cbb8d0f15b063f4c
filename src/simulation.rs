//! Per-frame simulation step and the session phase machine.

use log::{debug, info};

use crate::constants::MAX_FRAME_DELTA_MS;
use crate::entities::EntityId;
use crate::types::circles_overlap;
use crate::world::World;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen by the player
    Paused,
    /// The ship was destroyed. The world has already been reset and waits for
    /// the player to acknowledge before play resumes.
    GameOver,
}

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Milliseconds integrated this frame; 0 when the frame was skipped
    pub delta_ms: f64,
    pub bullets_expired: usize,
    pub asteroids_destroyed: Vec<EntityId>,
    pub ship_hit: bool,
    pub game_over: bool,
    /// New level number when the board was cleared this frame
    pub level_up: Option<u32>,
}

pub struct Simulation {
    pub world: World,
    phase: GamePhase,
    last_timestamp: Option<f64>,
}

impl Simulation {
    pub fn new(world: World) -> Self {
        Simulation {
            world,
            phase: GamePhase::Playing,
            last_timestamp: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            GamePhase::GameOver => GamePhase::GameOver,
        };
        self.last_timestamp = None;
        info!("Phase is now {:?}", self.phase);
    }

    /// Leaves the game-over screen. Returns false if there was nothing to
    /// acknowledge.
    pub fn acknowledge(&mut self, now: f64) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::Playing;
        self.last_timestamp = None;
        // The player may have stared at the banner for a while
        self.world.ship.last_collision_time = Some(now);
        info!("Game over acknowledged, resuming play");
        true
    }

    pub fn fire(&mut self, now: f64) -> Option<EntityId> {
        (self.phase == GamePhase::Playing).then(|| self.world.fire(now))
    }

    /// Host entry point, called once per frame with a monotonic timestamp.
    /// The first frame after construction, pause or game over only records
    /// the timestamp.
    pub fn advance(&mut self, now: f64) -> FrameReport {
        if self.phase != GamePhase::Playing {
            return FrameReport::default();
        }
        let Some(previous) = self.last_timestamp.replace(now) else {
            return FrameReport::default();
        };
        let delta_ms = now - previous;
        if delta_ms <= 0.0 {
            return FrameReport::default();
        }
        self.step(delta_ms.min(MAX_FRAME_DELTA_MS), now)
    }

    /// One simulation step of `delta_ms` ending at `now`.
    ///
    /// Bullets move once per frame before any collision check. Hits only mark
    /// entities; destroyed asteroids and spent bullets leave the live
    /// collections in a single compaction pass at the end of the frame, so
    /// nothing is skipped or visited twice while iterating.
    pub fn step(&mut self, delta_ms: f64, now: f64) -> FrameReport {
        let mut report = FrameReport {
            delta_ms,
            ..Default::default()
        };

        let World {
            bounds,
            ship,
            asteroids,
            bullets,
            rng,
            ..
        } = &mut self.world;
        let bounds = *bounds;

        ship.update(delta_ms, bounds);

        for bullet in bullets.iter_mut() {
            bullet.update(delta_ms, now, bounds);
            if bullet.remove {
                report.bullets_expired += 1;
            }
        }

        let mut ship_destroyed = false;
        for asteroid in asteroids.iter_mut() {
            asteroid.update(delta_ms, bounds);

            let hit = bullets.iter_mut().find(|bullet| {
                !bullet.remove
                    && circles_overlap(bullet.position, bullet.radius, asteroid.position, asteroid.radius)
            });
            if let Some(bullet) = hit {
                bullet.remove = true;
                asteroid.destroyed = true;
                report.asteroids_destroyed.push(asteroid.id);
                debug!("Bullet {} destroyed asteroid {}", bullet.id, asteroid.id);
                continue;
            }

            if circles_overlap(ship.position, ship.radius, asteroid.position, asteroid.radius)
                && ship.can_take_hit(now)
            {
                ship.health = ship.health.saturating_sub(1);
                ship.last_collision_time = Some(now);
                report.ship_hit = true;
                info!("Ship hit by asteroid {}, health {}", asteroid.id, ship.health);

                if ship.health > 0 {
                    ship.reset(now, bounds, rng);
                } else {
                    ship_destroyed = true;
                    break;
                }
            }
        }

        if ship_destroyed {
            info!("Game over on level {}", self.world.level);
            self.world.reset_game(now);
            self.phase = GamePhase::GameOver;
            self.last_timestamp = None;
            report.game_over = true;
            return report;
        }

        self.world.asteroids.retain(|asteroid| !asteroid.destroyed);
        self.world.bullets.retain(|bullet| !bullet.remove);

        if self.world.asteroids.is_empty() {
            self.world.next_level();
            report.level_up = Some(self.world.level);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::entities::{Asteroid, Bullet};
    use crate::types::{Bounds, Vector2D};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME: f64 = REFERENCE_FRAME_MS;

    /// A simulation with the generated asteroids swapped for hand-placed ones.
    fn sim_with(positions: &[(f64, f64)]) -> Simulation {
        let mut world = World::new(Bounds::new(800.0, 480.0), 42);
        let mut rng = Pcg32::seed_from_u64(0);
        world.asteroids = positions
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let mut asteroid = Asteroid::new(1000 + i as EntityId, Vector2D::new(x, y), ASTEROID_RADIUS, &mut rng);
                asteroid.velocity = Vector2D::ZERO;
                asteroid
            })
            .collect();
        Simulation::new(world)
    }

    fn add_bullet(sim: &mut Simulation, id: EntityId, x: f64, y: f64, now: f64) {
        // Fired straight up so the first frame moves it 5 units
        let bullet = Bullet::new(id, Vector2D::new(x, y + BULLET_SPEED), std::f64::consts::FRAC_PI_2, now);
        sim.world.bullets.push(bullet);
    }

    #[test]
    fn test_bullet_destroys_asteroid_and_is_consumed() {
        let mut sim = sim_with(&[(100.0, 100.0), (700.0, 400.0)]);
        add_bullet(&mut sim, 1, 100.0, 100.0, 0.0);

        let report = sim.step(FRAME, FRAME);

        assert_eq!(report.asteroids_destroyed, vec![1000]);
        assert_eq!(sim.world.asteroids.len(), 1);
        assert_eq!(sim.world.asteroids[0].id, 1001);
        assert!(sim.world.bullets.is_empty());
        assert_eq!(report.level_up, None);
    }

    #[test]
    fn test_one_bullet_destroys_at_most_one_asteroid() {
        let mut sim = sim_with(&[(100.0, 100.0), (110.0, 100.0), (700.0, 400.0)]);
        add_bullet(&mut sim, 1, 105.0, 100.0, 0.0);

        let report = sim.step(FRAME, FRAME);

        assert_eq!(report.asteroids_destroyed.len(), 1);
        assert_eq!(sim.world.asteroids.len(), 2);
    }

    #[test]
    fn test_asteroid_consumes_only_one_bullet() {
        let mut sim = sim_with(&[(100.0, 100.0), (700.0, 400.0)]);
        add_bullet(&mut sim, 1, 100.0, 100.0, 0.0);
        add_bullet(&mut sim, 2, 102.0, 100.0, 0.0);

        let report = sim.step(FRAME, FRAME);

        assert_eq!(report.asteroids_destroyed, vec![1000]);
        assert_eq!(sim.world.bullets.len(), 1);
        assert_eq!(sim.world.bullets[0].id, 2);
    }

    #[test]
    fn test_expired_bullet_never_hits() {
        let mut sim = sim_with(&[(100.0, 100.0), (700.0, 400.0)]);
        add_bullet(&mut sim, 1, 100.0, 100.0, 0.0);

        let report = sim.step(FRAME, BULLET_DURATION_MS);

        assert_eq!(report.bullets_expired, 1);
        assert!(report.asteroids_destroyed.is_empty());
        assert_eq!(sim.world.asteroids.len(), 2);
        assert!(sim.world.bullets.is_empty());
    }

    #[test]
    fn test_bullets_move_once_per_frame() {
        let mut sim = sim_with(&[(50.0, 50.0), (700.0, 50.0), (50.0, 400.0), (700.0, 400.0)]);
        add_bullet(&mut sim, 1, 300.0, 300.0, 0.0);

        sim.step(FRAME, FRAME);

        let bullet = &sim.world.bullets[0];
        assert!(bullet.position.distance_to(Vector2D::new(300.0, 300.0)) < 1e-9);
    }

    #[test]
    fn test_bullet_removed_after_its_lifetime() {
        let mut sim = sim_with(&[(50.0, 50.0)]);
        sim.world.fire(0.0);
        let mut now = 0.0;
        let mut expired = 0;
        for _ in 0..60 {
            now += FRAME;
            expired += sim.step(FRAME, now).bullets_expired;
        }
        assert_eq!(expired, 1);
        assert!(sim.world.bullets.is_empty());
        now += FRAME;
        assert_eq!(sim.step(FRAME, now).bullets_expired, 0);
    }

    #[test]
    fn test_ship_damage_is_rate_limited() {
        let mut sim = sim_with(&[(400.0, 240.0), (50.0, 50.0)]);

        let report = sim.step(FRAME, 2000.0);
        assert!(report.ship_hit);
        assert_eq!(sim.world.ship.health, 2);
        assert_eq!(sim.world.ship.last_collision_time, Some(2000.0));

        // Park the asteroid on the respawned ship, still inside the window
        let ship_position = sim.world.ship.position;
        sim.world.asteroids[0].position = ship_position;
        let report = sim.step(FRAME, 2500.0);
        assert!(!report.ship_hit);
        assert_eq!(sim.world.ship.health, 2);

        let ship_position = sim.world.ship.position;
        sim.world.asteroids[0].position = ship_position;
        let report = sim.step(FRAME, 3000.0);
        assert!(!report.ship_hit, "exactly 1000ms is still protected");

        let ship_position = sim.world.ship.position;
        sim.world.asteroids[0].position = ship_position;
        let report = sim.step(FRAME, 3001.0);
        assert!(report.ship_hit);
        assert_eq!(sim.world.ship.health, 1);
    }

    #[test]
    fn test_non_fatal_hit_respawns_ship() {
        let mut sim = sim_with(&[(400.0, 240.0), (50.0, 50.0)]);
        sim.world.ship.thrust = Vector2D::new(0.0, 0.0);
        sim.world.ship.rotation = SHIP_ROTATION_SPEED;
        sim.world.ship.thrusting = true;

        sim.step(FRAME, 5000.0);

        let ship = &sim.world.ship;
        assert_eq!(ship.health, 2);
        assert!(!ship.thrusting);
        assert_eq!(ship.rotation, 0.0);
        assert_eq!(ship.thrust, Vector2D::ZERO);
        assert_eq!(sim.phase(), GamePhase::Playing);
        // The asteroid is not destroyed by ramming it
        assert_eq!(sim.world.asteroids.len(), 2);
    }

    #[test]
    fn test_clearing_board_advances_level() {
        let mut sim = sim_with(&[(100.0, 100.0)]);
        add_bullet(&mut sim, 1, 100.0, 100.0, 0.0);

        let report = sim.step(FRAME, FRAME);

        assert_eq!(report.level_up, Some(2));
        assert_eq!(sim.world.level, 2);
        assert_eq!(sim.world.asteroids.len(), World::asteroid_count_for_level(2));
        assert!(sim.world.asteroids.iter().all(|a| !a.destroyed));
    }

    #[test]
    fn test_level_advances_once_per_frame() {
        let mut sim = sim_with(&[(100.0, 100.0), (300.0, 100.0)]);
        add_bullet(&mut sim, 1, 100.0, 100.0, 0.0);
        add_bullet(&mut sim, 2, 300.0, 100.0, 0.0);

        let report = sim.step(FRAME, FRAME);

        assert_eq!(report.asteroids_destroyed.len(), 2);
        assert_eq!(report.level_up, Some(2));
        assert_eq!(sim.world.level, 2);
    }

    #[test]
    fn test_fatal_hit_resets_game() {
        let mut sim = sim_with(&[(400.0, 240.0), (50.0, 50.0)]);
        sim.world.next_level();
        sim.world.asteroids[0].position = Vector2D::new(400.0, 240.0);
        sim.world.asteroids[0].velocity = Vector2D::ZERO;
        sim.world.ship.health = 1;
        sim.world.ship.last_collision_time = Some(3500.0);
        sim.world.fire(4900.0);
        // Keep the bullet clear of the asteroid that rams the ship
        sim.world.bullets[0].position = Vector2D::new(700.0, 40.0);

        let report = sim.step(FRAME, 5000.0);

        assert!(report.ship_hit);
        assert!(report.game_over);
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert_eq!(sim.world.ship.health, 3);
        assert_eq!(sim.world.level, 1);
        assert_eq!(sim.world.asteroids.len(), 10);
        assert!(sim.world.bullets.is_empty());
        assert_eq!(sim.world.ship.position, sim.world.bounds.center());
    }

    #[test]
    fn test_game_over_waits_for_acknowledgement() {
        let mut sim = sim_with(&[(400.0, 240.0)]);
        sim.world.ship.health = 1;
        sim.step(FRAME, 5000.0);
        assert_eq!(sim.phase(), GamePhase::GameOver);

        let snapshot: Vec<Vector2D> = sim.world.asteroids.iter().map(|a| a.position).collect();
        for i in 1..10 {
            let report = sim.advance(5000.0 + i as f64 * FRAME);
            assert_eq!(report, FrameReport::default());
        }
        let after: Vec<Vector2D> = sim.world.asteroids.iter().map(|a| a.position).collect();
        assert_eq!(snapshot, after);
        assert_eq!(sim.fire(5200.0), None);

        assert!(sim.acknowledge(9000.0));
        assert_eq!(sim.phase(), GamePhase::Playing);
        assert_eq!(sim.world.ship.last_collision_time, Some(9000.0));
        assert!(!sim.acknowledge(9001.0));
    }

    #[test]
    fn test_first_frame_only_records_time() {
        let mut sim = sim_with(&[(50.0, 50.0)]);
        sim.world.ship.thrust = Vector2D::new(2.0, 0.0);
        let start = sim.world.ship.position;

        let report = sim.advance(1000.0);
        assert_eq!(report.delta_ms, 0.0);
        assert_eq!(sim.world.ship.position, start);

        let report = sim.advance(1000.0 + FRAME);
        assert!((report.delta_ms - FRAME).abs() < 1e-9);
        assert!(sim.world.ship.position.x > start.x);
    }

    #[test]
    fn test_non_positive_delta_is_skipped() {
        let mut sim = sim_with(&[(50.0, 50.0)]);
        sim.advance(1000.0);
        assert_eq!(sim.advance(1000.0).delta_ms, 0.0);
        assert_eq!(sim.advance(990.0).delta_ms, 0.0);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let mut sim = sim_with(&[(50.0, 50.0)]);
        sim.advance(0.0);
        let report = sim.advance(10_000.0);
        assert_eq!(report.delta_ms, MAX_FRAME_DELTA_MS);
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut sim = sim_with(&[(50.0, 50.0)]);
        sim.world.asteroids[0].velocity = Vector2D::new(1.0, 1.0);
        sim.advance(0.0);
        sim.toggle_pause();
        assert_eq!(sim.phase(), GamePhase::Paused);
        let frozen = sim.world.asteroids[0].position;
        sim.advance(100.0);
        sim.advance(200.0);
        assert_eq!(sim.world.asteroids[0].position, frozen);
        assert_eq!(sim.fire(200.0), None);

        sim.toggle_pause();
        assert_eq!(sim.phase(), GamePhase::Playing);
        // Resuming starts a fresh frame clock
        assert_eq!(sim.advance(5000.0).delta_ms, 0.0);
        assert!(sim.advance(5000.0 + FRAME).delta_ms > 0.0);
    }
}
