use std::fs;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::planner::Planner;
use crate::scenario::Scenario;
use crate::search::PathSearchStrategy;
use crate::util::seed_to_hex;

const STRATEGIES: [PathSearchStrategy; 2] = [PathSearchStrategy::AStar, PathSearchStrategy::Gbfs];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub seed: u32,
    pub seed_hex: String,
    pub strategy: PathSearchStrategy,
    pub obstacles: usize,
    pub success: bool,
    pub waypoints: usize,
    pub path_length: f64,
    pub direct_distance: f64,
    pub expanded: usize,
    pub micros: u64,
    pub failure: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy: PathSearchStrategy,
    pub runs: usize,
    pub success_rate: f64,
    /// Mean of path length over direct distance, successful runs only.
    pub avg_stretch: f64,
    pub avg_expanded: f64,
    pub avg_micros: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub seed_count: usize,
    pub obstacle_count: usize,
    pub config: PlannerConfig,
    pub summaries: Vec<StrategySummary>,
    pub runs: Vec<RunRecord>,
}

pub struct BenchmarkConfig {
    pub planner: PlannerConfig,
    pub seeds: Vec<u32>,
    pub obstacle_count: usize,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    let plane = config.planner.plane()?;

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_one = |seed: &u32| -> Result<Vec<RunRecord>> {
        let scenario = Scenario::generate(*seed, plane, config.obstacle_count);
        let mut planner = Planner::new(config.planner.clone())?;
        let mode = config.planner.mode;
        let mut records = Vec::with_capacity(STRATEGIES.len());
        for strategy in STRATEGIES {
            let started = Instant::now();
            let route = planner
                .plan_with(&scenario.world, scenario.mover, scenario.target, mode, strategy)
                .with_context(|| format!("benchmark run failed for seed={seed:#x}"))?;
            let micros = started.elapsed().as_micros() as u64;
            records.push(RunRecord {
                seed: *seed,
                seed_hex: seed_to_hex(*seed),
                strategy,
                obstacles: scenario.obstacle_count(),
                success: route.failure().is_none(),
                waypoints: route.waypoints().len(),
                path_length: route.length(&plane),
                direct_distance: scenario.direct_distance(),
                expanded: route.expanded(),
                micros,
                failure: route.failure().map(|error| error.to_string()),
            });
        }
        Ok(records)
    };

    let run_results: Vec<Result<Vec<RunRecord>>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.seeds.par_iter().map(run_one).collect())
    } else {
        config.seeds.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(run_results.len() * STRATEGIES.len());
    for result in run_results {
        runs.extend(result?);
    }

    let summaries = STRATEGIES
        .iter()
        .map(|strategy| summarize(*strategy, &runs))
        .collect();

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        seed_count: config.seeds.len(),
        obstacle_count: config.obstacle_count,
        config: config.planner.clone(),
        summaries,
        runs,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}

fn summarize(strategy: PathSearchStrategy, runs: &[RunRecord]) -> StrategySummary {
    let mine: Vec<&RunRecord> = runs.iter().filter(|r| r.strategy == strategy).collect();
    let total = mine.len().max(1) as f64;
    let solved: Vec<&&RunRecord> = mine.iter().filter(|r| r.success).collect();
    let stretch_sum: f64 = solved
        .iter()
        .filter(|r| r.direct_distance > 0.0)
        .map(|r| r.path_length / r.direct_distance)
        .sum();

    StrategySummary {
        strategy,
        runs: mine.len(),
        success_rate: solved.len() as f64 / total,
        avg_stretch: stretch_sum / solved.len().max(1) as f64,
        avg_expanded: mine.iter().map(|r| r.expanded as f64).sum::<f64>() / total,
        avg_micros: mine.iter().map(|r| r.micros as f64).sum::<f64>() / total,
    }
}
