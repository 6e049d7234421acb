//! The SWSB dependency-resolution pass.
//!
//! # Contents
//!
//! * `footprint`: Operand to bucket mapping.
//! * `deps`: Dependency sets and their arena.
//! * `bucket`: Per-unit lists of live dependency sets.
//! * `token_pool`: Bounded pool of synchronization tokens.
//! * `distance`: In-order counters and the distance tracker.
//! * `decision`: Per-instruction decisions and plans.
//! * `analyzer`: Hazard detection and wait assignment.
//! * `rewriter`: Applies a plan to a kernel.

/// Hazard analyzer.
pub mod analyzer;

/// Bucket table.
pub mod bucket;

/// Analyzer output consumed by the rewriter.
pub mod decision;

/// Dependency sets.
pub mod deps;

/// Issue counters and distance tracker.
pub mod distance;

/// Instruction footprints.
pub mod footprint;

/// Sync rewriter.
pub mod rewriter;

/// Token pool.
pub mod token_pool;

use crate::common::SwsbError;
use crate::config::TargetModel;
use crate::ir::Kernel;
use crate::stats::SwsbStats;

pub use analyzer::SwsbAnalyzer;
pub use decision::{BlockPlan, Hazard, HazardKind, InstDecision, KernelPlan, Resolution};

/// Analyzes `kernel` without modifying it.
///
/// # Errors
///
/// Returns the first [`SwsbError`] found in the target model or the kernel.
pub fn analyze(
    kernel: &Kernel,
    target: &TargetModel,
) -> Result<(KernelPlan, SwsbStats), SwsbError> {
    let mut analyzer = SwsbAnalyzer::new(target)?;
    let plan = analyzer.analyze_kernel(kernel)?;
    Ok((plan, analyzer.into_stats()))
}

/// Runs the pass: analyzes `kernel` and rewrites it in place with the required synchronization.
///
/// The kernel is left untouched if any error is returned.
///
/// # Errors
///
/// Returns the first [`SwsbError`] found in the target model or the kernel.
pub fn run(kernel: &mut Kernel, target: &TargetModel) -> Result<SwsbStats, SwsbError> {
    let (plan, mut stats) = analyze(kernel, target)?;
    rewriter::apply(kernel, &plan, &mut stats)?;
    Ok(stats)
}
