use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::graph::GraphMode;
use crate::obstruction::DEFAULT_DETECTION_HORIZON;
use crate::route::DEFAULT_LOOKAHEAD;
use crate::search::{PathSearchStrategy, SearchLimits};
use crate::torus::Plane;

pub const DEFAULT_PLANE_WIDTH: f64 = 1600.0;
pub const DEFAULT_PLANE_HEIGHT: f64 = 1080.0;
pub const DEFAULT_GRID_COLUMNS: usize = 100;
pub const DEFAULT_GRID_ROWS: usize = 60;
pub const DEFAULT_MIN_CRUISE_SPEED: f64 = 60.0;

/// Tunables for one [`crate::Planner`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub plane_width: f64,
    pub plane_height: f64,
    pub grid_columns: usize,
    pub grid_rows: usize,
    pub min_cruise_speed: f64,
    pub detection_horizon: f64,
    pub lookahead: usize,
    pub strategy: PathSearchStrategy,
    pub mode: GraphMode,
    pub grid_max_iterations: usize,
    pub radial_max_iterations: usize,
    pub radial_angles: usize,
    pub radial_distances: usize,
    pub replan_interval_ticks: u64,
    pub replan_min_remaining: usize,
    pub replan_look_behind: usize,
    pub fallback_to_radial: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            plane_width: DEFAULT_PLANE_WIDTH,
            plane_height: DEFAULT_PLANE_HEIGHT,
            grid_columns: DEFAULT_GRID_COLUMNS,
            grid_rows: DEFAULT_GRID_ROWS,
            min_cruise_speed: DEFAULT_MIN_CRUISE_SPEED,
            detection_horizon: DEFAULT_DETECTION_HORIZON,
            lookahead: DEFAULT_LOOKAHEAD,
            strategy: PathSearchStrategy::AStar,
            mode: GraphMode::Grid,
            grid_max_iterations: SearchLimits::GRID_DEFAULT.max_iterations,
            radial_max_iterations: SearchLimits::RADIAL_DEFAULT.max_iterations,
            radial_angles: 11,
            radial_distances: 10,
            replan_interval_ticks: 10,
            replan_min_remaining: 2,
            replan_look_behind: 15,
            fallback_to_radial: true,
        }
    }
}

impl PlannerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
        let cfg: PlannerConfig = serde_json::from_slice(&data)
            .with_context(|| format!("invalid planner config {}", path.display()))?;
        Ok(cfg)
    }

    /// File (or defaults), then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        cfg.apply_env_overrides();
        cfg.validate().context("planner config failed validation")?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        self.grid_columns = read_env_usize("TORUS_NAV_GRID_COLUMNS", self.grid_columns);
        self.grid_rows = read_env_usize("TORUS_NAV_GRID_ROWS", self.grid_rows);
        self.grid_max_iterations =
            read_env_usize("TORUS_NAV_MAX_ITERATIONS", self.grid_max_iterations);
        self.lookahead = read_env_usize("TORUS_NAV_LOOKAHEAD", self.lookahead);
    }

    pub fn plane(&self) -> Result<Plane, PlanError> {
        Plane::new(self.plane_width, self.plane_height)
    }

    pub fn search_limits(&self, mode: GraphMode) -> SearchLimits {
        let max_iterations = match mode {
            GraphMode::Grid => self.grid_max_iterations,
            GraphMode::Radial => self.radial_max_iterations,
        };
        SearchLimits { max_iterations }
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        self.plane()?;
        if self.grid_columns == 0 || self.grid_rows == 0 {
            return Err(PlanError::InvalidGrid {
                columns: self.grid_columns,
                rows: self.grid_rows,
            });
        }
        if !(self.min_cruise_speed.is_finite() && self.min_cruise_speed > 0.0) {
            return Err(invalid("min_cruise_speed", "must be positive and finite"));
        }
        if !(self.detection_horizon.is_finite() && self.detection_horizon > 0.0) {
            return Err(invalid("detection_horizon", "must be positive and finite"));
        }
        let counts = [
            ("lookahead", self.lookahead),
            ("grid_max_iterations", self.grid_max_iterations),
            ("radial_max_iterations", self.radial_max_iterations),
            ("radial_angles", self.radial_angles),
            ("radial_distances", self.radial_distances),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(invalid(field, "must be at least 1"));
            }
        }
        if self.replan_interval_ticks == 0 {
            return Err(invalid("replan_interval_ticks", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> PlanError {
    PlanError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

pub(crate) fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
