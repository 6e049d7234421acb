//! Software scoreboard (SWSB) dependency-resolution pass.
//!
//! This crate annotates a scheduled GPU instruction stream with the synchronization it needs:
//! 1. **IR:** Kernels, blocks, instructions, register operands and SWSB annotations.
//! 2. **Pass:** Footprints, bucket table, token pool, distance tracker, hazard analyzer and rewriter.
//! 3. **Target:** Token count, distance range, pipe latencies and register-file layout.
//! 4. **Verification:** A hazard simulator that replays annotated kernels, and JSON loaders.
//! 5. **Statistics:** Counts of waits, stalls, drains and inserted syncs.

/// Common types (typed indices, errors).
pub mod common;
/// Target model (defaults, enums, register-file layout).
pub mod config;
/// Instruction-stream representation and listings.
pub mod ir;
/// The dependency-resolution pass.
pub mod pass;
/// Hazard simulator and file loaders.
pub mod sim;
/// Pass statistics collection and reporting.
pub mod stats;

/// Error raised by the pass; see [`common::error`].
pub use crate::common::{LoadError, SwsbError};
/// Target model; use `TargetModel::default()` or deserialize from JSON.
pub use crate::config::TargetModel;
/// Kernel representation consumed and rewritten by the pass.
pub use crate::ir::{Block, Instruction, Kernel};
/// Entry points of the pass.
pub use crate::pass::{analyze, run};
/// Counters returned by [`run`].
pub use crate::stats::SwsbStats;
