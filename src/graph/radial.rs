use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::torus::{LocationKey, Plane, Position, Vec2};

use super::{Graph, GraphBuilder, NodeId, PlanRequest, SearchNode, SearchState};

/// Samples closer than this many mover radii to an obstacle center are dropped.
const KEEP_OUT_RADII: f64 = 2.0;

#[derive(Clone, Debug)]
pub struct SampleNode {
    position: Position,
    state: SearchState,
}

impl SampleNode {
    fn new(position: Position) -> Self {
        Self {
            position,
            state: SearchState::default(),
        }
    }

    pub fn key(&self) -> LocationKey {
        self.position.location_key()
    }
}

impl PartialEq for SampleNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SampleNode {}

impl Hash for SampleNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl SearchNode for SampleNode {
    fn position(&self) -> Position {
        self.position
    }

    fn state(&self) -> &SearchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }
}

/// Fan of sample points spread over the half-plane facing the goal.
///
/// `angles` bearings cover -90 to +90 degrees around the direct bearing and
/// each carries `distances` evenly spaced samples out to the goal distance.
/// Two nodes are joined when they are a short hop apart and the segment
/// between them keeps one mover radius of clearance.
#[derive(Clone, Debug)]
pub struct RadialSampler {
    plane: Plane,
    angles: usize,
    distances: usize,
    nodes: Vec<SampleNode>,
    edges: Vec<Vec<NodeId>>,
}

impl RadialSampler {
    pub fn new(plane: Plane, angles: usize, distances: usize) -> Self {
        Self {
            plane,
            angles: angles.max(1),
            distances: distances.max(1),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Nodes from the most recent build; index 0 is the start.
    pub fn nodes(&self) -> &[SampleNode] {
        &self.nodes
    }

    fn bearing_offsets(&self) -> impl Iterator<Item = f64> {
        let count = self.angles;
        let step = if count > 1 {
            core::f64::consts::PI / (count - 1) as f64
        } else {
            0.0
        };
        let first = if count > 1 {
            -core::f64::consts::FRAC_PI_2
        } else {
            0.0
        };
        (0..count).map(move |i| first + step * i as f64)
    }

    fn add_node(
        &mut self,
        seen: &mut HashSet<LocationKey>,
        position: Position,
    ) -> Option<NodeId> {
        if !seen.insert(position.location_key()) {
            return None;
        }
        self.nodes.push(SampleNode::new(position));
        Some(self.nodes.len() - 1)
    }
}

impl GraphBuilder for RadialSampler {
    type Node = SampleNode;

    fn build(&mut self, request: &PlanRequest<'_>) -> Graph<'_, SampleNode> {
        self.nodes.clear();
        self.edges.clear();

        let plane = self.plane;
        let start_position = plane.wrap(request.mover.position);
        let goal_position = plane.wrap(request.goal);
        let mut seen = HashSet::new();

        let start = self.add_node(&mut seen, start_position).unwrap_or(0);
        let goal = self.add_node(&mut seen, goal_position).unwrap_or(start);

        let to_goal = plane.shortest_vector(&start_position, &goal_position);
        let goal_distance = to_goal.length();
        let bearing = to_goal.angle();
        let keep_out = request.mover.radius * KEEP_OUT_RADII;

        let offsets: Vec<f64> = self.bearing_offsets().collect();
        for offset in offsets {
            for step in 1..=self.distances {
                let reach = goal_distance * step as f64 / self.distances as f64;
                let point = start_position.point() + Vec2::from_angle(bearing + offset, reach);
                let sample = plane.wrap(Position::new(point.x, point.y));
                let crowded = request
                    .obstacles
                    .iter()
                    .any(|obstacle| plane.distance(&sample, &obstacle.position) <= keep_out);
                if !crowded {
                    self.add_node(&mut seen, sample);
                }
            }
        }

        let hop = goal_distance / (self.distances as f64 * 0.5);
        let clearance = request.mover.radius;
        self.edges = vec![Vec::new(); self.nodes.len()];
        for from in 0..self.nodes.len() {
            for to in 0..self.nodes.len() {
                if from == to {
                    continue;
                }
                let a = &self.nodes[from].position;
                let b = &self.nodes[to].position;
                if plane.distance(a, b) < hop
                    && plane.is_segment_clear(a, b, request.obstacles, clearance)
                {
                    self.edges[from].push(to);
                }
            }
        }

        let state = &mut self.nodes[start].state;
        state.path_cost = 0.0;
        state.heuristic = goal_distance;

        tracing::trace!(
            nodes = self.nodes.len(),
            edges = self.edges.iter().map(Vec::len).sum::<usize>(),
            "radial graph built"
        );

        Graph::new(plane, &mut self.nodes, &self.edges, start, goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Body, BodyId};

    fn sampler() -> RadialSampler {
        RadialSampler::new(Plane::new(1000.0, 1000.0).unwrap(), 11, 10)
    }

    #[test]
    fn open_field_yields_full_fan() {
        let mut sampler = sampler();
        let mover = Body::ship(BodyId(0), Position::new(100.0, 500.0), 10.0);
        let request = PlanRequest {
            mover: &mover,
            goal: Position::new(300.0, 500.0),
            obstacles: &[],
        };
        let graph = sampler.build(&request);
        // 11 bearings x 10 rings, the straight-ahead outer ring sample merges with the goal.
        assert_eq!(graph.len(), 2 + 11 * 10 - 1);
        assert_eq!(graph.start(), 0);
        assert_eq!(graph.goal(), 1);
        assert!(!graph.neighbors(graph.start()).is_empty());
    }

    #[test]
    fn samples_near_obstacles_are_dropped() {
        let mut sampler = sampler();
        let mover = Body::ship(BodyId(0), Position::new(100.0, 500.0), 10.0);
        let rocks = [Body::obstacle(BodyId(3), Position::new(200.0, 500.0), 15.0)];
        let request = PlanRequest {
            mover: &mover,
            goal: Position::new(300.0, 500.0),
            obstacles: &rocks,
        };
        let graph = sampler.build(&request);
        let plane = *graph.plane();
        for node in graph.nodes().iter().skip(2) {
            assert!(plane.distance(&node.position(), &rocks[0].position) > 20.0);
        }
    }

    #[test]
    fn edges_keep_clearance_and_stay_short() {
        let mut sampler = sampler();
        let mover = Body::ship(BodyId(0), Position::new(100.0, 500.0), 10.0);
        let rocks = [Body::obstacle(BodyId(3), Position::new(200.0, 510.0), 15.0)];
        let request = PlanRequest {
            mover: &mover,
            goal: Position::new(300.0, 500.0),
            obstacles: &rocks,
        };
        let graph = sampler.build(&request);
        let plane = *graph.plane();
        for id in 0..graph.len() {
            for &next in graph.neighbors(id) {
                let a = graph.node(id).position();
                let b = graph.node(next).position();
                assert!(plane.distance(&a, &b) < 40.0);
                assert!(plane.is_segment_clear(&a, &b, &rocks, 10.0));
            }
        }
    }

    #[test]
    fn fan_follows_wrapped_bearing() {
        let mut sampler = sampler();
        let mover = Body::ship(BodyId(0), Position::new(950.0, 500.0), 10.0);
        let request = PlanRequest {
            mover: &mover,
            goal: Position::new(50.0, 500.0),
            obstacles: &[],
        };
        let graph = sampler.build(&request);
        let plane = *graph.plane();
        let start = graph.node(graph.start()).position();
        // Every sample sits on the goal side of the mover.
        for node in graph.nodes().iter().skip(2) {
            let offset = plane.shortest_vector(&start, &node.position());
            assert!(offset.x > -1e-6, "sample behind mover: {offset:?}");
        }
    }

    #[test]
    fn coincident_start_and_goal_share_a_node() {
        let mut sampler = sampler();
        let mover = Body::ship(BodyId(0), Position::new(100.0, 100.0), 10.0);
        let request = PlanRequest {
            mover: &mover,
            goal: Position::new(100.0, 100.0),
            obstacles: &[],
        };
        let graph = sampler.build(&request);
        assert_eq!(graph.start(), graph.goal());
    }
}
