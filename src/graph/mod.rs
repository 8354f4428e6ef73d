//! Search graphs over the wraparound plane.
//!
//! A builder owns its node storage and adjacency buffers and lends them out
//! as a [`Graph`] for the duration of one search. The grid builder keeps its
//! cell matrix between calls and only resets the per-cell state; the radial
//! builder refills its sample set every call.

pub mod grid;
pub mod radial;

use serde::{Deserialize, Serialize};

use crate::torus::{Plane, Position};
use crate::world::Body;

pub use grid::{GridCell, GridIndex};
pub use radial::{RadialSampler, SampleNode};

pub type NodeId = usize;

/// Mutable per-search bookkeeping carried by every node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchState {
    pub path_cost: f64,
    pub heuristic: f64,
    pub explored: bool,
    pub predecessor: Option<NodeId>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            path_cost: f64::INFINITY,
            heuristic: f64::INFINITY,
            explored: false,
            predecessor: None,
        }
    }
}

impl SearchState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub trait SearchNode {
    fn position(&self) -> Position;
    fn state(&self) -> &SearchState;
    fn state_mut(&mut self) -> &mut SearchState;
}

/// One planning call's view of a builder's nodes and edges.
pub struct Graph<'a, N> {
    plane: Plane,
    nodes: &'a mut [N],
    edges: &'a [Vec<NodeId>],
    start: NodeId,
    goal: NodeId,
}

impl<'a, N: SearchNode> Graph<'a, N> {
    pub fn new(
        plane: Plane,
        nodes: &'a mut [N],
        edges: &'a [Vec<NodeId>],
        start: NodeId,
        goal: NodeId,
    ) -> Self {
        debug_assert_eq!(nodes.len(), edges.len());
        debug_assert!(start < nodes.len() && goal < nodes.len());
        Self {
            plane,
            nodes,
            edges,
            start,
            goal,
        }
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn goal(&self) -> NodeId {
        self.goal
    }

    pub fn nodes(&self) -> &[N] {
        self.nodes
    }

    pub fn node(&self, id: NodeId) -> &N {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut N {
        &mut self.nodes[id]
    }

    pub fn neighbors(&self, id: NodeId) -> &'a [NodeId] {
        let edges: &'a [Vec<NodeId>] = self.edges;
        &edges[id]
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }
}

/// Inputs shared by every graph builder.
#[derive(Clone, Copy, Debug)]
pub struct PlanRequest<'a> {
    pub mover: &'a Body,
    /// Goal point, already intercept-predicted.
    pub goal: Position,
    pub obstacles: &'a [Body],
}

pub trait GraphBuilder {
    type Node: SearchNode;

    fn build(&mut self, request: &PlanRequest<'_>) -> Graph<'_, Self::Node>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphMode {
    #[default]
    Grid,
    Radial,
}

impl GraphMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Radial => "radial",
        }
    }
}
