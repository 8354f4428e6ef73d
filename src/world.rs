use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::torus::{Plane, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything with a footprint in the arena: ships, asteroids, bases.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub position: Position,
    pub radius: f64,
    pub movable: bool,
}

impl Body {
    pub fn ship(id: BodyId, position: Position, radius: f64) -> Self {
        Self {
            id,
            position,
            radius,
            movable: true,
        }
    }

    pub fn obstacle(id: BodyId, position: Position, radius: f64) -> Self {
        Self {
            id,
            position,
            radius,
            movable: false,
        }
    }
}

/// What a route is built toward.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Target {
    /// A body tracked across ticks; its position is re-read every time.
    Body(BodyId),
    /// A fixed spot with no footprint.
    Point(Position),
}

/// A target looked up against one snapshot.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedTarget {
    pub position: Position,
    pub radius: f64,
    pub body: Option<BodyId>,
}

impl Target {
    pub fn resolve(&self, world: &WorldSnapshot) -> Result<ResolvedTarget, PlanError> {
        match *self {
            Target::Body(id) => {
                let body = world.body(id)?;
                Ok(ResolvedTarget {
                    position: body.position,
                    radius: body.radius,
                    body: Some(id),
                })
            }
            Target::Point(position) => Ok(ResolvedTarget {
                position: world.plane.wrap(position),
                radius: 0.0,
                body: None,
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub plane: Plane,
    pub tick: u64,
    pub bodies: Vec<Body>,
}

impl WorldSnapshot {
    pub fn new(plane: Plane, tick: u64, bodies: Vec<Body>) -> Self {
        Self {
            plane,
            tick,
            bodies,
        }
    }

    pub fn body(&self, id: BodyId) -> Result<&Body, PlanError> {
        self.bodies
            .iter()
            .find(|body| body.id == id)
            .ok_or(PlanError::UnknownBody { id })
    }

    /// Every body that can block `mover` on its way to `goal`. The mover,
    /// the goal body and anything parked on the goal location are left out.
    pub fn obstructions(&self, mover: BodyId, goal: &ResolvedTarget) -> Vec<Body> {
        self.bodies
            .iter()
            .filter(|body| body.id != mover)
            .filter(|body| Some(body.id) != goal.body)
            .filter(|body| !body.position.same_location(&goal.position))
            .copied()
            .collect()
    }
}
