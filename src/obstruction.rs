use crate::intercept::intercept_position;
use crate::torus::{Plane, Position, Vec2};
use crate::world::Body;

/// Blockers farther than this from the start are ignored by default.
pub const DEFAULT_DETECTION_HORIZON: f64 = 150.0;

/// Scale applied to the clearance radius in the perpendicular-distance test.
const CLEARANCE_SCALE: f64 = 1.5;

/// Straight-line blocker checks for one mover.
///
/// Moving obstacles are judged at their predicted intercept point, so a rock
/// drifting into the lane counts even if it is not there yet.
#[derive(Clone, Copy, Debug)]
pub struct ObstructionField {
    pub plane: Plane,
    pub mover_speed: f64,
    pub detection_horizon: f64,
}

impl ObstructionField {
    pub fn new(plane: Plane, mover_speed: f64) -> Self {
        Self {
            plane,
            mover_speed,
            detection_horizon: DEFAULT_DETECTION_HORIZON,
        }
    }

    pub fn with_horizon(mut self, detection_horizon: f64) -> Self {
        self.detection_horizon = detection_horizon;
        self
    }

    pub fn is_blocking(
        &self,
        start: &Position,
        goal: &Position,
        obstacle: &Body,
        clearance: f64,
    ) -> bool {
        if obstacle.position.same_location(goal) {
            return false;
        }

        let to_goal = self.plane.shortest_vector(start, goal);
        let predicted = intercept_position(&self.plane, &obstacle.position, start, self.mover_speed);
        let to_obstacle = self.plane.shortest_vector(start, &predicted);

        let reach = to_obstacle.length();
        if reach > to_goal.length() {
            return false;
        }

        let angle = to_obstacle.angle_between(to_goal);
        if angle > core::f64::consts::FRAC_PI_2 {
            return false;
        }

        reach * angle.sin() < obstacle.radius + clearance * CLEARANCE_SCALE
    }

    /// Closest blocking obstacle within the detection horizon.
    pub fn nearest_blocker<'a>(
        &self,
        start: &Position,
        goal: &Position,
        obstacles: &'a [Body],
        clearance: f64,
    ) -> Option<&'a Body> {
        let (closest, distance) = obstacles
            .iter()
            .filter(|obstacle| self.is_blocking(start, goal, obstacle, clearance))
            .map(|obstacle| (obstacle, self.plane.distance(start, &obstacle.position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        if distance > self.detection_horizon {
            tracing::trace!(
                obstacle = %closest.id,
                distance,
                "nearest blocker beyond detection horizon"
            );
            return None;
        }
        Some(closest)
    }
}

/// Sidestep point for a mover about to run into `blocker`.
///
/// The mover steps a quarter turn off the bearing to the blocker, towards the
/// side the target lies on, by the blocker's radius plus its own. A target
/// dead ahead takes the negative quarter turn.
pub fn avoidance_waypoint(
    plane: &Plane,
    mover: &Body,
    blocker: &Body,
    target: &Position,
) -> Position {
    let to_blocker = plane.shortest_vector(&mover.position, &blocker.position);
    let to_target = plane.shortest_vector(&mover.position, target);
    let turn = if to_blocker.cross(to_target) > 0.0 {
        core::f64::consts::FRAC_PI_2
    } else {
        -core::f64::consts::FRAC_PI_2
    };
    let step = Vec2::from_angle(to_blocker.angle() + turn, blocker.radius + mover.radius);
    let aim = mover.position.point() + step;
    plane.wrap(Position::new(aim.x, aim.y))
}
