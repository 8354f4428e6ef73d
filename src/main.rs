use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use torus_nav::benchmark::{self, BenchmarkConfig};
use torus_nav::scenario::Scenario;
use torus_nav::util::{generate_seeds, parse_seed, seed_to_hex};
use torus_nav::{GraphMode, PathSearchStrategy, Planner, PlannerConfig};

#[derive(Parser)]
#[command(
    name = "torus-nav",
    about = "Route planning on a wraparound arena with moving obstacles"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliStrategy {
    AStar,
    Gbfs,
}

impl From<CliStrategy> for PathSearchStrategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::AStar => PathSearchStrategy::AStar,
            CliStrategy::Gbfs => PathSearchStrategy::Gbfs,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMode {
    Grid,
    Radial,
}

impl From<CliMode> for GraphMode {
    fn from(value: CliMode) -> Self {
        match value {
            CliMode::Grid => GraphMode::Grid,
            CliMode::Radial => GraphMode::Radial,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Generate one seeded scenario, plan a route and print it as JSON
    Plan {
        /// Scenario seed (hex, e.g. 0xDEADBEEF, or decimal)
        #[arg(long)]
        seed: String,

        /// Number of obstacles to scatter
        #[arg(long, default_value = "24")]
        obstacles: usize,

        /// Search strategy (defaults to the config's)
        #[arg(long, value_enum)]
        strategy: Option<CliStrategy>,

        /// Graph builder (defaults to the config's)
        #[arg(long, value_enum)]
        mode: Option<CliMode>,

        /// Also print the generated world
        #[arg(long)]
        with_world: bool,

        /// Config file path (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Plan across many seeded scenarios with both strategies
    Bench {
        /// Number of seeds
        #[arg(long, default_value = "32")]
        seed_count: usize,

        /// Starting seed
        #[arg(long, default_value = "0xDEADBEEF")]
        base_seed: String,

        /// Number of obstacles per scenario
        #[arg(long, default_value = "24")]
        obstacles: usize,

        /// Config file path (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(long, default_value = "bench-output")]
        out_dir: PathBuf,

        /// Parallel jobs (default: all cores)
        #[arg(long)]
        jobs: Option<usize>,
    },

    /// Print the effective config as JSON
    ShowConfig {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Plan {
            seed,
            obstacles,
            strategy,
            mode,
            with_world,
            config,
        } => {
            let cfg = PlannerConfig::load(config.as_deref())?;
            let seed_val = parse_seed(&seed)?;
            let scenario = Scenario::generate(seed_val, cfg.plane()?, obstacles);
            let strategy = strategy.map(Into::into).unwrap_or(cfg.strategy);
            let mode = mode.map(Into::into).unwrap_or(cfg.mode);

            let mut planner = Planner::new(cfg)?;
            let route = planner
                .plan_with(&scenario.world, scenario.mover, scenario.target, mode, strategy)
                .with_context(|| format!("planning failed for seed={}", seed_to_hex(seed_val)))?;
            let blocker = planner.immediate_blocker(
                &scenario.world,
                scenario.mover,
                scenario.target,
            )?;
            let sidestep = planner.avoid(&scenario.world, scenario.mover, scenario.target)?;

            tracing::info!(
                seed = %seed_to_hex(seed_val),
                mode = mode.as_str(),
                strategy = strategy.as_str(),
                waypoints = route.waypoints().len(),
                expanded = route.expanded(),
                direct_blocker = ?blocker.map(|body| body.id.0),
                sidestep = ?sidestep.map(|step| (step.x, step.y)),
                "planned"
            );

            let summary = route.summary(&scenario.world.plane);
            if with_world {
                let out = serde_json::json!({ "scenario": scenario, "route": summary });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }

        Command::Bench {
            seed_count,
            base_seed,
            obstacles,
            config,
            out_dir,
            jobs,
        } => {
            let cfg = PlannerConfig::load(config.as_deref())?;
            let base = parse_seed(&base_seed)?;
            let seeds = generate_seeds(base, seed_count);

            tracing::info!(
                seeds = seed_count,
                obstacles,
                mode = cfg.mode.as_str(),
                "benchmarking"
            );

            let report = benchmark::run_benchmark(BenchmarkConfig {
                planner: cfg,
                seeds,
                obstacle_count: obstacles,
                out_dir: out_dir.clone(),
                jobs,
            })?;

            for summary in &report.summaries {
                eprintln!(
                    "{:<7} success={:.1}% stretch={:.3} expanded={:.0} time={:.0}us",
                    summary.strategy.as_str(),
                    summary.success_rate * 100.0,
                    summary.avg_stretch,
                    summary.avg_expanded,
                    summary.avg_micros,
                );
            }
            eprintln!("report saved to {}/summary.json", out_dir.display());
        }

        Command::ShowConfig { config } => {
            let cfg = PlannerConfig::load(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }

    Ok(())
}
