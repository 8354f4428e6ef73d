use serde::Serialize;

use crate::error::SearchError;
use crate::search::PathResult;
use crate::torus::{Plane, Position};
use crate::world::{Body, Target};

pub const DEFAULT_LOOKAHEAD: usize = 5;

/// A planned waypoint sequence and the cursor walking it.
///
/// Routes never replan themselves; [`crate::Planner::maintain`] decides when
/// to rebuild or splice one.
#[derive(Clone, Debug)]
pub struct Route {
    target: Target,
    waypoints: Vec<Position>,
    cursor: usize,
    cost: f64,
    expanded: usize,
    failure: Option<SearchError>,
}

impl Route {
    pub fn new(target: Target, outcome: Result<PathResult, SearchError>) -> Self {
        match outcome {
            Ok(path) => Self {
                target,
                waypoints: path.waypoints,
                cursor: 0,
                cost: path.cost,
                expanded: path.expanded,
                failure: None,
            },
            Err(error) => Self::failed(target, error),
        }
    }

    pub fn failed(target: Target, error: SearchError) -> Self {
        let expanded = match error {
            SearchError::Exhausted { expanded } => expanded,
            SearchError::IterationCap { cap } => cap,
        };
        Self {
            target,
            waypoints: Vec::new(),
            cursor: 0,
            cost: 0.0,
            expanded,
            failure: Some(error),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn failure(&self) -> Option<SearchError> {
        self.failure
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn waypoints(&self) -> &[Position] {
        &self.waypoints
    }

    /// Waypoints from the cursor on, current step included.
    pub fn remaining(&self) -> &[Position] {
        self.waypoints.get(self.cursor..).unwrap_or(&[])
    }

    /// Cost reported by the search that produced the current waypoints.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn current_step(&self) -> Option<Position> {
        if self.failure.is_some() {
            return None;
        }
        self.waypoints.get(self.cursor).copied()
    }

    pub fn next_step(&self) -> Option<Position> {
        if self.failure.is_some() {
            return None;
        }
        self.waypoints.get(self.cursor + 1).copied()
    }

    pub fn advance(&mut self) {
        if self.failure.is_none() && self.cursor < self.waypoints.len() {
            self.cursor += 1;
        }
    }

    pub fn is_done(&self) -> bool {
        self.failure.is_some() || self.cursor >= self.waypoints.len()
    }

    /// Wraparound length of the whole path.
    pub fn length(&self, plane: &Plane) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| plane.distance(&pair[0], &pair[1]))
            .sum()
    }

    /// Index of the start waypoint of the first blocked segment among the
    /// next `lookahead` segments from the cursor.
    ///
    /// A segment touching the route's first or last waypoint ignores
    /// obstacles whose clearance ring already contains that waypoint; the
    /// grid opens the start and goal cells regardless of nearby obstacles.
    pub fn blocked_ahead_index(
        &self,
        plane: &Plane,
        obstacles: &[Body],
        clearance: f64,
        lookahead: usize,
    ) -> Option<usize> {
        if self.failure.is_some() {
            return None;
        }
        let last_index = self.waypoints.len().saturating_sub(1);
        let end = self.cursor.saturating_add(lookahead).min(last_index);
        (self.cursor..end).find(|&index| {
            let from = &self.waypoints[index];
            let to = &self.waypoints[index + 1];
            let pinned: Vec<&Position> = [(index, from), (index + 1, to)]
                .into_iter()
                .filter(|(at, _)| *at == 0 || *at == last_index)
                .map(|(_, point)| point)
                .collect();
            obstacles.iter().any(|obstacle| {
                let crowds_endpoint = pinned.iter().any(|point| {
                    plane.distance(point, &obstacle.position) < obstacle.radius + clearance
                });
                !crowds_endpoint
                    && !plane.is_segment_clear(
                        from,
                        to,
                        std::slice::from_ref(obstacle),
                        clearance,
                    )
            })
        })
    }

    /// Keeps waypoints before `at` and appends `tail`.
    pub(crate) fn splice(&mut self, at: usize, tail: PathResult, plane: &Plane) {
        let at = at.max(self.cursor).min(self.waypoints.len());
        self.waypoints.truncate(at);
        self.waypoints.extend(tail.waypoints);
        self.expanded = tail.expanded;
        self.cost = self.length(plane);
    }

    /// Moves the final waypoint onto `position`, keeping `cost` in step.
    pub(crate) fn pin_last(&mut self, position: Position, plane: &Plane) {
        if let Some(last) = self.waypoints.last_mut() {
            *last = position;
            self.cost = self.length(plane);
        }
    }

    pub fn summary(&self, plane: &Plane) -> RouteSummary {
        RouteSummary {
            target: self.target,
            waypoints: self.waypoints.clone(),
            cursor: self.cursor,
            length: self.length(plane),
            expanded: self.expanded,
            failure: self.failure.map(|error| error.to_string()),
        }
    }
}

/// Serializable view of a route, used by the CLI and reports.
#[derive(Clone, Debug, Serialize)]
pub struct RouteSummary {
    pub target: Target,
    pub waypoints: Vec<Position>,
    pub cursor: usize,
    pub length: f64,
    pub expanded: usize,
    pub failure: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::BodyId;

    fn plane() -> Plane {
        Plane::new(1000.0, 1000.0).unwrap()
    }

    fn straight_route(count: usize) -> Route {
        let waypoints: Vec<Position> = (0..count)
            .map(|i| Position::new(100.0 + 20.0 * i as f64, 500.0))
            .collect();
        let cost = 20.0 * count.saturating_sub(1) as f64;
        Route::new(
            Target::Point(Position::new(100.0 + 20.0 * (count - 1) as f64, 500.0)),
            Ok(PathResult {
                waypoints,
                cost,
                expanded: count,
            }),
        )
    }

    #[test]
    fn cursor_walks_to_the_end() {
        let mut route = straight_route(3);
        assert_eq!(route.current_step().map(|p| p.x), Some(100.0));
        assert_eq!(route.next_step().map(|p| p.x), Some(120.0));
        route.advance();
        route.advance();
        assert_eq!(route.current_step().map(|p| p.x), Some(140.0));
        assert!(route.next_step().is_none());
        assert!(!route.is_done());
        route.advance();
        assert!(route.is_done());
        assert!(route.current_step().is_none());
        route.advance();
        assert_eq!(route.cursor(), 3);
        assert!(route.remaining().is_empty());
    }

    #[test]
    fn failed_route_is_done_immediately() {
        let mut route = Route::new(
            Target::Body(BodyId(4)),
            Err(SearchError::Exhausted { expanded: 12 }),
        );
        assert!(route.is_done());
        assert!(route.current_step().is_none());
        route.advance();
        assert_eq!(route.cursor(), 0);
        assert_eq!(route.failure(), Some(SearchError::Exhausted { expanded: 12 }));
        assert!(route
            .blocked_ahead_index(&plane(), &[], 1.0, DEFAULT_LOOKAHEAD)
            .is_none());
    }

    #[test]
    fn blocked_segment_reports_absolute_index() {
        let mut route = straight_route(10);
        route.advance();
        route.advance();
        // Rock sits across the segment from waypoint 4 (180) to 5 (200).
        let rocks = [Body::obstacle(BodyId(9), Position::new(190.0, 505.0), 6.0)];
        assert_eq!(
            route.blocked_ahead_index(&plane(), &rocks, 2.0, DEFAULT_LOOKAHEAD),
            Some(4)
        );
        assert_eq!(route.blocked_ahead_index(&plane(), &rocks, 2.0, 2), None);
    }

    #[test]
    fn lookahead_stops_at_last_segment() {
        let route = straight_route(3);
        let rocks = [Body::obstacle(BodyId(9), Position::new(600.0, 600.0), 6.0)];
        assert_eq!(
            route.blocked_ahead_index(&plane(), &rocks, 2.0, DEFAULT_LOOKAHEAD),
            None
        );
        let tail_rock = [Body::obstacle(BodyId(9), Position::new(130.0, 500.0), 3.0)];
        assert_eq!(
            route.blocked_ahead_index(&plane(), &tail_rock, 2.0, usize::MAX),
            Some(1)
        );
    }

    #[test]
    fn pinning_keeps_cost_in_step_with_waypoints() {
        let plane = plane();
        let mut route = straight_route(4);
        assert!((route.cost() - 60.0).abs() < 1e-9);
        route.pin_last(Position::new(180.0, 500.0), &plane);
        assert!((route.cost() - 80.0).abs() < 1e-9);
        assert!((route.cost() - route.length(&plane)).abs() < 1e-9);
    }

    #[test]
    fn rock_crowding_the_goal_does_not_stale_the_approach() {
        let plane = plane();
        let route = straight_route(6);
        // Sits 8 units past the last waypoint (200, 500); its ring reaches back
        // over the final segment.
        let goal_rock = [Body::obstacle(BodyId(9), Position::new(208.0, 500.0), 12.0)];
        assert_eq!(
            route.blocked_ahead_index(&plane, &goal_rock, 8.0, usize::MAX),
            None
        );

        // Same story at the first waypoint.
        let start_rock = [Body::obstacle(BodyId(9), Position::new(95.0, 500.0), 12.0)];
        assert_eq!(
            route.blocked_ahead_index(&plane, &start_rock, 8.0, usize::MAX),
            None
        );

        // A rock astride the last segment that leaves the goal itself clear
        // still counts.
        let lane_rock = [Body::obstacle(BodyId(9), Position::new(190.0, 500.0), 2.0)];
        assert_eq!(
            route.blocked_ahead_index(&plane, &lane_rock, 8.0, usize::MAX),
            Some(4)
        );
    }

    #[test]
    fn splice_replaces_tail_and_pins_goal() {
        let plane = plane();
        let mut route = straight_route(6);
        route.advance();
        let tail = PathResult {
            waypoints: vec![Position::new(160.0, 500.0), Position::new(180.0, 520.0)],
            cost: 0.0,
            expanded: 7,
        };
        route.splice(3, tail, &plane);
        route.pin_last(Position::new(180.0, 540.0), &plane);
        let xs: Vec<f64> = route.waypoints().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![100.0, 120.0, 140.0, 160.0, 180.0]);
        assert_eq!(route.waypoints()[4].y, 540.0);
        assert_eq!(route.cursor(), 1);
        assert_eq!(route.expanded(), 7);
        assert!((route.cost() - route.length(&plane)).abs() < 1e-9);
    }
}
