//! Per-mover planning loop: resolve the target, lead it, mask obstacles,
//! search, and keep the resulting route fresh as the world moves.

use crate::config::PlannerConfig;
use crate::error::{PlanError, SearchError};
use crate::graph::{GraphBuilder, GraphMode, GridIndex, PlanRequest, RadialSampler};
use crate::intercept::intercept_position;
use crate::obstruction::{avoidance_waypoint, ObstructionField};
use crate::route::Route;
use crate::search::{search, PathResult, PathSearchStrategy, SearchLimits};
use crate::torus::Position;
use crate::world::{Body, BodyId, Target, WorldSnapshot};

/// What [`Planner::maintain`] did to a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Maintenance {
    Kept,
    /// Rebuilt from the mover's current position.
    Replanned,
    /// Waypoints from `at` onward were replaced.
    Spliced { at: usize },
    /// A replan was attempted and failed; the route is unchanged.
    ReplanFailed(SearchError),
}

pub struct Planner {
    config: PlannerConfig,
    grid: GridIndex,
    radial: RadialSampler,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Result<Self, PlanError> {
        config.validate()?;
        let plane = config.plane()?;
        let grid = GridIndex::new(plane, config.grid_columns, config.grid_rows)?;
        let radial = RadialSampler::new(plane, config.radial_angles, config.radial_distances);
        Ok(Self {
            config,
            grid,
            radial,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    /// Plans with the configured mode and strategy, retrying once on the
    /// radial graph when a grid search fails and fallback is enabled.
    pub fn plan(
        &mut self,
        world: &WorldSnapshot,
        mover: BodyId,
        target: Target,
    ) -> Result<Route, PlanError> {
        let (mode, strategy) = (self.config.mode, self.config.strategy);
        let route = self.plan_with(world, mover, target, mode, strategy)?;
        let Some(error) = route.failure() else {
            return Ok(route);
        };
        if mode != GraphMode::Grid || !self.config.fallback_to_radial {
            return Ok(route);
        }

        tracing::debug!(mover = %mover, %error, "grid search failed; retrying on radial graph");
        let retry = self.plan_with(world, mover, target, GraphMode::Radial, strategy)?;
        if retry.failure().is_none() {
            return Ok(retry);
        }
        Ok(route)
    }

    pub fn plan_with(
        &mut self,
        world: &WorldSnapshot,
        mover: BodyId,
        target: Target,
        mode: GraphMode,
        strategy: PathSearchStrategy,
    ) -> Result<Route, PlanError> {
        self.check_plane(world)?;
        let body = *world.body(mover)?;
        let outcome = self.search_from(world, &body, body.position, target, mode, strategy)?;
        Ok(Route::new(target, outcome))
    }

    /// Closest body sitting on the straight line from the mover to the
    /// target's intercept point, if it is near enough to react to.
    pub fn immediate_blocker(
        &self,
        world: &WorldSnapshot,
        mover: BodyId,
        target: Target,
    ) -> Result<Option<Body>, PlanError> {
        self.check_plane(world)?;
        let body = *world.body(mover)?;
        let resolved = target.resolve(world)?;
        let speed = self.cruise_speed(&body);
        let field = ObstructionField::new(world.plane, speed)
            .with_horizon(self.config.detection_horizon);
        let goal = intercept_position(&world.plane, &resolved.position, &body.position, speed);
        let obstacles = world.obstructions(mover, &resolved);
        Ok(field
            .nearest_blocker(&body.position, &goal, &obstacles, body.radius)
            .copied())
    }

    /// Sidestep waypoint when something sits in the mover's direct lane.
    pub fn avoid(
        &self,
        world: &WorldSnapshot,
        mover: BodyId,
        target: Target,
    ) -> Result<Option<Position>, PlanError> {
        let Some(blocker) = self.immediate_blocker(world, mover, target)? else {
            return Ok(None);
        };
        let body = *world.body(mover)?;
        let resolved = target.resolve(world)?;
        let step = avoidance_waypoint(&world.plane, &body, &blocker, &resolved.position);
        tracing::debug!(
            mover = %mover,
            blocker = %blocker.id,
            x = step.x,
            y = step.y,
            "sidestepping"
        );
        Ok(Some(step))
    }

    /// Per-tick upkeep for a route being followed by `mover`.
    pub fn maintain(
        &mut self,
        world: &WorldSnapshot,
        mover: BodyId,
        route: &mut Route,
    ) -> Result<Maintenance, PlanError> {
        self.check_plane(world)?;
        if route.is_done() {
            return Ok(Maintenance::Kept);
        }
        let body = *world.body(mover)?;
        let target = *route.target();
        let resolved = target.resolve(world)?;
        let obstacles = world.obstructions(mover, &resolved);

        if let Some(index) = route.blocked_ahead_index(
            &world.plane,
            &obstacles,
            body.radius,
            self.config.lookahead,
        ) {
            tracing::debug!(mover = %mover, index, "route blocked ahead; replanning");
            let fresh = self.plan(world, mover, target)?;
            if let Some(error) = fresh.failure() {
                return Ok(Maintenance::ReplanFailed(error));
            }
            *route = fresh;
            return Ok(Maintenance::Replanned);
        }

        if world.tick % self.config.replan_interval_ticks != 0 {
            return Ok(Maintenance::Kept);
        }
        let last_index = route.waypoints().len() - 1;
        let ahead = last_index - route.cursor();
        if ahead <= self.config.replan_min_remaining {
            return Ok(Maintenance::Kept);
        }
        let last = route.waypoints()[last_index];
        let goal_cell = self.grid.cell_for(&resolved.position).center();
        if last.same_location(&resolved.position) || last.same_location(&goal_cell) {
            return Ok(Maintenance::Kept);
        }

        let splice_at = last_index - self.config.replan_look_behind.min(ahead);
        let anchor = route.waypoints()[splice_at];
        let from_anchor = world.plane.distance(&anchor, &resolved.position);
        let from_mover = world.plane.distance(&body.position, &resolved.position);
        let (mode, strategy) = (self.config.mode, self.config.strategy);

        if from_anchor < from_mover {
            let outcome = self.search_from(world, &body, anchor, target, mode, strategy)?;
            let tail = match outcome {
                Ok(tail) => tail,
                Err(error) => return Ok(Maintenance::ReplanFailed(error)),
            };
            tracing::debug!(mover = %mover, at = splice_at, "target moved; splicing route tail");
            route.splice(splice_at, tail, &world.plane);
            route.pin_last(resolved.position, &world.plane);
            Ok(Maintenance::Spliced { at: splice_at })
        } else {
            let outcome = self.search_from(world, &body, body.position, target, mode, strategy)?;
            if let Err(error) = &outcome {
                return Ok(Maintenance::ReplanFailed(*error));
            }
            tracing::debug!(mover = %mover, "target moved; replanning from mover");
            *route = Route::new(target, outcome);
            route.pin_last(resolved.position, &world.plane);
            Ok(Maintenance::Replanned)
        }
    }

    fn check_plane(&self, world: &WorldSnapshot) -> Result<(), PlanError> {
        let expected = *self.grid.plane();
        if world.plane != expected {
            return Err(PlanError::PlaneMismatch {
                expected,
                found: world.plane,
            });
        }
        Ok(())
    }

    fn cruise_speed(&self, body: &Body) -> f64 {
        self.config.min_cruise_speed.max(body.position.speed())
    }

    /// Runs one search from `origin` using `mover`'s footprint and velocity.
    /// The outer result carries lookup errors, the inner one search failure.
    fn search_from(
        &mut self,
        world: &WorldSnapshot,
        mover: &Body,
        origin: Position,
        target: Target,
        mode: GraphMode,
        strategy: PathSearchStrategy,
    ) -> Result<Result<PathResult, SearchError>, PlanError> {
        let resolved = target.resolve(world)?;
        let origin = Body {
            position: Position::with_velocity(
                origin.x,
                origin.y,
                mover.position.vx,
                mover.position.vy,
            ),
            ..*mover
        };
        let goal = intercept_position(
            &world.plane,
            &resolved.position,
            &origin.position,
            self.config.min_cruise_speed,
        );
        let obstacles = world.obstructions(mover.id, &resolved);
        let request = PlanRequest {
            mover: &origin,
            goal,
            obstacles: &obstacles,
        };
        let limits = self.config.search_limits(mode);

        let outcome = match mode {
            GraphMode::Grid => run(&mut self.grid, &request, strategy, limits),
            GraphMode::Radial => run(&mut self.radial, &request, strategy, limits),
        };
        match &outcome {
            Ok(path) => tracing::debug!(
                mover = %mover.id,
                mode = mode.as_str(),
                strategy = strategy.as_str(),
                waypoints = path.waypoints.len(),
                cost = path.cost,
                expanded = path.expanded,
                "route planned"
            ),
            Err(error) => tracing::debug!(
                mover = %mover.id,
                mode = mode.as_str(),
                strategy = strategy.as_str(),
                %error,
                "route search failed"
            ),
        }
        Ok(outcome)
    }
}

fn run<B: GraphBuilder>(
    builder: &mut B,
    request: &PlanRequest<'_>,
    strategy: PathSearchStrategy,
    limits: SearchLimits,
) -> Result<PathResult, SearchError> {
    let mut graph = builder.build(request);
    search(&mut graph, strategy, limits)
}
