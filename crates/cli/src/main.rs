//! SWSB pass driver.
//!
//! This binary runs the dependency-resolution pass on kernels stored as JSON. It performs:
//! 1. **Run:** Annotate kernels and print each listing (or JSON) and the totalled pass statistics.
//! 2. **Verify:** Annotate a kernel, then replay it in the hazard simulator under seeded
//!    random completion timings and predicate outcomes, reporting any violation.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use swsb_core::common::InstLocation;
use swsb_core::ir::Instruction;
use swsb_core::sim::loader;
use swsb_core::sim::{CompletionModel, HazardSimulator, OooDelays};
use swsb_core::stats::{STATS_SECTIONS, SwsbStats};
use swsb_core::{Kernel, LoadError, SwsbError, TargetModel};

#[derive(Parser, Debug)]
#[command(
    name = "swsb",
    author,
    version,
    about = "Software scoreboard dependency resolution",
    long_about = "Insert distance and token synchronization into a scheduled GPU kernel.\n\nKernels and target models are JSON files. Without --target the built-in default target is used.\n\nExamples:\n  swsb run kernel.json other.json --stats\n  swsb run kernel.json --target target.json --json\n  swsb verify kernel.json --trials 1000 --seed 7"
)]
struct Cli {
    /// Log pass decisions (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Annotate kernels and print the results.
    Run {
        /// Kernel JSON files; statistics are totalled across them.
        #[arg(required = true)]
        kernels: Vec<PathBuf>,

        /// Target model JSON file.
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Print statistics; optionally only the named sections (summary, tokens, distance).
        #[arg(long, num_args = 0.., value_name = "SECTION")]
        stats: Option<Vec<String>>,

        /// Print the annotated kernel as JSON instead of a listing.
        #[arg(long)]
        json: bool,
    },

    /// Annotate a kernel and check it in the hazard simulator.
    Verify {
        /// Kernel JSON file.
        kernel: PathBuf,

        /// Target model JSON file.
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Number of randomized executions.
        #[arg(long, default_value_t = 100)]
        trials: u32,

        /// Seed for the completion model.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Probability that a predicated instruction is skipped.
        #[arg(long, default_value_t = 0.25)]
        skip_rate: f64,

        /// Largest out-of-order read or write delay.
        #[arg(long, default_value_t = 32)]
        max_delay: u64,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Pass(#[from] SwsbError),

    #[error("could not serialize kernel: {0}")]
    Output(#[from] serde_json::Error),
}

/// Random predicate outcomes and out-of-order delays from a seeded PCG stream.
#[derive(Debug)]
struct RandomCompletion {
    rng: Pcg64,
    skip_rate: f64,
    max_delay: u64,
}

impl RandomCompletion {
    fn new(seed: u64, skip_rate: f64, max_delay: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            skip_rate: skip_rate.clamp(0.0, 1.0),
            max_delay: max_delay.max(1),
        }
    }
}

impl CompletionModel for RandomCompletion {
    fn executes(&mut self, _at: InstLocation, _inst: &Instruction) -> bool {
        !self.rng.random_bool(self.skip_rate)
    }

    fn delays(&mut self, _at: InstLocation, _inst: &Instruction) -> OooDelays {
        OooDelays {
            read: self.rng.random_range(0..=self.max_delay),
            write: self.rng.random_range(1..=self.max_delay),
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_target(path: Option<&Path>) -> Result<TargetModel, CliError> {
    match path {
        Some(p) => Ok(loader::load_target(p)?),
        None => Ok(TargetModel::default()),
    }
}

/// Annotates each kernel and prints it, then the requested statistics for all of them.
fn cmd_run(
    kernel_paths: &[PathBuf],
    target_path: Option<&Path>,
    stats: Option<&[String]>,
    json: bool,
) -> Result<ExitCode, CliError> {
    let target = load_target(target_path)?;
    let mut pass_stats = SwsbStats::default();
    for path in kernel_paths {
        let mut kernel = loader::load_kernel(path)?;
        pass_stats.merge(&swsb_core::run(&mut kernel, &target)?);
        if json {
            println!("{}", serde_json::to_string_pretty(&kernel)?);
        } else {
            print!("{kernel}");
        }
    }
    if let Some(sections) = stats {
        for unknown in sections.iter().filter(|s| !STATS_SECTIONS.contains(&s.as_str())) {
            warn!(section = %unknown, "unknown stats section");
        }
        pass_stats.print_sections(sections);
    }
    Ok(ExitCode::SUCCESS)
}

/// Annotates the kernel and replays it `trials` times; fails on the first violating trial.
fn cmd_verify(
    kernel_path: &Path,
    target_path: Option<&Path>,
    trials: u32,
    model: &mut RandomCompletion,
) -> Result<ExitCode, CliError> {
    let target = load_target(target_path)?;
    let mut kernel: Kernel = loader::load_kernel(kernel_path)?;
    let stats = swsb_core::run(&mut kernel, &target)?;
    info!(syncs = stats.syncs_inserted, "kernel annotated");

    let sim = HazardSimulator::new(&target)?;
    let mut makespan = 0;
    for trial in 0..trials {
        let report = sim.run(&kernel, &mut *model)?;
        makespan = makespan.max(report.makespan);
        if !report.is_clean() {
            eprintln!("trial {trial}: {} violation(s)", report.violations.len());
            for v in &report.violations {
                eprintln!("  {v}");
            }
            return Ok(ExitCode::FAILURE);
        }
    }
    println!(
        "{trials} trials clean ({} syncs inserted, worst makespan {makespan})",
        stats.syncs_inserted
    );
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Run {
            kernels,
            target,
            stats,
            json,
        } => cmd_run(kernels, target.as_deref(), stats.as_deref(), *json),
        Commands::Verify {
            kernel,
            target,
            trials,
            seed,
            skip_rate,
            max_delay,
        } => {
            let mut model = RandomCompletion::new(*seed, *skip_rate, *max_delay);
            cmd_verify(kernel, target.as_deref(), *trials, &mut model)
        }
    };

    result.unwrap_or_else(|err| {
        eprintln!("error: {err}");
        ExitCode::FAILURE
    })
}
