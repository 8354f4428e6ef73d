pub mod benchmark;
pub mod config;
pub mod error;
pub mod graph;
pub mod intercept;
pub mod obstruction;
pub mod planner;
pub mod rng;
pub mod route;
pub mod scenario;
pub mod search;
pub mod torus;
pub mod util;
pub mod world;

pub use config::PlannerConfig;
pub use error::{PlanError, SearchError};
pub use graph::{GraphBuilder, GraphMode, PlanRequest};
pub use intercept::{intercept_position, solve_intercept, InterceptSolution};
pub use obstruction::{avoidance_waypoint, ObstructionField};
pub use planner::{Maintenance, Planner};
pub use route::Route;
pub use search::{search, PathResult, PathSearchStrategy, SearchLimits};
pub use torus::{Plane, Position, Vec2};
pub use world::{Body, BodyId, Target, WorldSnapshot};
