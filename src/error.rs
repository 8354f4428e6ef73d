use core::fmt;

use crate::torus::Plane;
use crate::world::BodyId;

/// Why a graph search stopped without reaching the goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchError {
    Exhausted { expanded: usize },
    IterationCap { cap: usize },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { expanded } => {
                write!(f, "frontier exhausted after expanding {expanded} nodes")
            }
            Self::IterationCap { cap } => {
                write!(f, "search stopped at iteration cap {cap}")
            }
        }
    }
}

impl std::error::Error for SearchError {}

#[derive(Clone, Debug, PartialEq)]
pub enum PlanError {
    InvalidPlane { width: f64, height: f64 },
    InvalidGrid { columns: usize, rows: usize },
    InvalidConfig { field: &'static str, reason: String },
    UnknownBody { id: BodyId },
    PlaneMismatch { expected: Plane, found: Plane },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlane { width, height } => {
                write!(f, "plane must have positive finite size: got {width}x{height}")
            }
            Self::InvalidGrid { columns, rows } => write!(
                f,
                "grid needs at least one column and one row: got {columns}x{rows}"
            ),
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid config field {field}: {reason}")
            }
            Self::UnknownBody { id } => write!(f, "no body with id {id} in snapshot"),
            Self::PlaneMismatch { expected, found } => write!(
                f,
                "snapshot plane {}x{} does not match planner plane {}x{}",
                found.width(),
                found.height(),
                expected.width(),
                expected.height()
            ),
        }
    }
}

impl std::error::Error for PlanError {}
