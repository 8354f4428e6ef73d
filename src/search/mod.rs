//! Goal-directed search over any [`Graph`].
//!
//! Both strategies share one loop: pop the best frontier node, stop at the
//! goal, otherwise mark it explored and relax its neighbors. A* keys on
//! `g + h` and lowers `g` whenever a strictly shorter route shows up. GBFS
//! keys on `h` alone and keeps the first predecessor it finds.

pub mod heap;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::graph::{Graph, NodeId, SearchNode};
use crate::torus::Position;

use heap::IndexedHeap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathSearchStrategy {
    #[default]
    AStar,
    Gbfs,
}

impl PathSearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AStar => "a-star",
            Self::Gbfs => "gbfs",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum node expansions before giving up.
    pub max_iterations: usize,
}

impl SearchLimits {
    pub const GRID_DEFAULT: SearchLimits = SearchLimits {
        max_iterations: 8_000,
    };
    pub const RADIAL_DEFAULT: SearchLimits = SearchLimits {
        max_iterations: 1_000,
    };
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::GRID_DEFAULT
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PathResult {
    /// Start to goal, both ends included.
    pub waypoints: Vec<Position>,
    /// Summed wraparound length of `waypoints`.
    pub cost: f64,
    pub expanded: usize,
}

pub fn search<N: SearchNode>(
    graph: &mut Graph<'_, N>,
    strategy: PathSearchStrategy,
    limits: SearchLimits,
) -> Result<PathResult, SearchError> {
    let plane = *graph.plane();
    let start = graph.start();
    let goal_position = graph.node(graph.goal()).position();

    let start_position = graph.node(start).position();
    let state = graph.node_mut(start).state_mut();
    state.path_cost = 0.0;
    if !state.heuristic.is_finite() {
        state.heuristic = plane.distance(&start_position, &goal_position);
    }
    let start_heuristic = state.heuristic;

    // g is zero at the start, so both strategies key it on h.
    let mut frontier = IndexedHeap::with_capacity(graph.len());
    frontier.push_or_update(start, start_heuristic, start_heuristic);

    let mut expanded = 0;
    while let Some((current, _)) = frontier.pop() {
        let position = graph.node(current).position();
        if position.same_location(&goal_position) {
            return Ok(reconstruct(graph, current, expanded));
        }
        if expanded >= limits.max_iterations {
            tracing::debug!(
                cap = limits.max_iterations,
                strategy = strategy.as_str(),
                "search hit iteration cap"
            );
            return Err(SearchError::IterationCap {
                cap: limits.max_iterations,
            });
        }

        graph.node_mut(current).state_mut().explored = true;
        expanded += 1;
        let current_cost = graph.node(current).state().path_cost;

        for &neighbor in graph.neighbors(current) {
            let next = graph.node(neighbor);
            if next.state().explored {
                continue;
            }
            let next_position = next.position();

            match strategy {
                PathSearchStrategy::AStar => {
                    let tentative = current_cost + plane.distance(&position, &next_position);
                    if tentative >= next.state().path_cost {
                        continue;
                    }
                    let heuristic = plane.distance(&next_position, &goal_position);
                    let state = graph.node_mut(neighbor).state_mut();
                    state.predecessor = Some(current);
                    state.path_cost = tentative;
                    state.heuristic = heuristic;
                    frontier.push_or_update(neighbor, tentative + heuristic, heuristic);
                }
                PathSearchStrategy::Gbfs => {
                    if frontier.contains(neighbor) {
                        continue;
                    }
                    let heuristic = plane.distance(&next_position, &goal_position);
                    let state = graph.node_mut(neighbor).state_mut();
                    state.predecessor = Some(current);
                    state.heuristic = heuristic;
                    frontier.push_or_update(neighbor, heuristic, heuristic);
                }
            }
        }
    }

    tracing::debug!(expanded, strategy = strategy.as_str(), "search frontier exhausted");
    Err(SearchError::Exhausted { expanded })
}

fn reconstruct<N: SearchNode>(graph: &Graph<'_, N>, goal: NodeId, expanded: usize) -> PathResult {
    let mut waypoints = vec![graph.node(goal).position()];
    let mut cursor = graph.node(goal).state().predecessor;
    while let Some(id) = cursor {
        waypoints.push(graph.node(id).position());
        cursor = graph.node(id).state().predecessor;
    }
    waypoints.reverse();

    let plane = graph.plane();
    let cost = waypoints
        .windows(2)
        .map(|pair| plane.distance(&pair[0], &pair[1]))
        .sum();

    PathResult {
        waypoints,
        cost,
        expanded,
    }
}
