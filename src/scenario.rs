use serde::Serialize;

use crate::rng::SeededRng;
use crate::torus::{Plane, Position, Vec2};
use crate::world::{Body, BodyId, Target, WorldSnapshot};

pub const MOVER_ID: BodyId = BodyId(0);
pub const TARGET_ID: BodyId = BodyId(1);

const MOVER_RADIUS: f64 = 12.0;
const TARGET_RADIUS: f64 = 20.0;
const OBSTACLE_RADIUS_MIN: f64 = 12.0;
const OBSTACLE_RADIUS_MAX: f64 = 48.0;
const MAX_DRIFT_SPEED: f64 = 30.0;
const MOVING_OBSTACLE_CHANCE: f64 = 0.3;
const MOVING_TARGET_CHANCE: f64 = 0.5;
const SPAWN_GAP: f64 = 10.0;
const PLACEMENT_ATTEMPTS: usize = 64;
/// Mover and target start at least this fraction of the plane diagonal apart.
const MIN_SEPARATION_FRACTION: f64 = 0.25;

/// A seeded arena: one mover chasing one target through scattered rocks.
#[derive(Clone, Debug, Serialize)]
pub struct Scenario {
    pub seed: u32,
    pub world: WorldSnapshot,
    pub mover: BodyId,
    pub target: Target,
}

impl Scenario {
    pub fn generate(seed: u32, plane: Plane, obstacle_count: usize) -> Self {
        let mut rng = SeededRng::new(seed);
        let mut bodies: Vec<Body> = Vec::with_capacity(obstacle_count + 2);

        let mover_position = random_point(&mut rng, &plane);
        bodies.push(Body::ship(MOVER_ID, mover_position, MOVER_RADIUS));

        let min_separation = plane.max_distance() * MIN_SEPARATION_FRACTION;
        let mut target_position = random_point(&mut rng, &plane);
        for _ in 0..PLACEMENT_ATTEMPTS {
            if plane.distance(&mover_position, &target_position) >= min_separation {
                break;
            }
            target_position = random_point(&mut rng, &plane);
        }
        if rng.chance(MOVING_TARGET_CHANCE) {
            target_position = with_drift(&mut rng, target_position);
        }
        bodies.push(Body::ship(TARGET_ID, target_position, TARGET_RADIUS));

        let mut next_id = TARGET_ID.0 + 1;
        for _ in 0..obstacle_count {
            let radius = rng.range_f64(OBSTACLE_RADIUS_MIN, OBSTACLE_RADIUS_MAX);
            let Some(position) = place_clear(&mut rng, &plane, &bodies, radius) else {
                continue;
            };
            let body = if rng.chance(MOVING_OBSTACLE_CHANCE) {
                Body::ship(BodyId(next_id), with_drift(&mut rng, position), radius)
            } else {
                Body::obstacle(BodyId(next_id), position, radius)
            };
            bodies.push(body);
            next_id += 1;
        }

        Self {
            seed,
            world: WorldSnapshot::new(plane, 0, bodies),
            mover: MOVER_ID,
            target: Target::Body(TARGET_ID),
        }
    }

    pub fn obstacle_count(&self) -> usize {
        self.world.bodies.len().saturating_sub(2)
    }

    /// Straight wraparound distance from mover to target.
    pub fn direct_distance(&self) -> f64 {
        let plane = &self.world.plane;
        match (self.world.body(self.mover), self.target.resolve(&self.world)) {
            (Ok(mover), Ok(target)) => plane.distance(&mover.position, &target.position),
            _ => 0.0,
        }
    }
}

fn random_point(rng: &mut SeededRng, plane: &Plane) -> Position {
    Position::new(
        rng.range_f64(0.0, plane.width()),
        rng.range_f64(0.0, plane.height()),
    )
}

fn with_drift(rng: &mut SeededRng, position: Position) -> Position {
    let heading = rng.range_f64(0.0, core::f64::consts::TAU);
    let speed = rng.range_f64(0.0, MAX_DRIFT_SPEED);
    let velocity = Vec2::from_angle(heading, speed);
    Position::with_velocity(position.x, position.y, velocity.x, velocity.y)
}

fn place_clear(
    rng: &mut SeededRng,
    plane: &Plane,
    bodies: &[Body],
    radius: f64,
) -> Option<Position> {
    (0..PLACEMENT_ATTEMPTS)
        .map(|_| random_point(rng, plane))
        .find(|candidate| {
            bodies.iter().all(|body| {
                plane.distance(candidate, &body.position) >= body.radius + radius + SPAWN_GAP
            })
        })
}
