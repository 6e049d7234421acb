//! Verification utilities and file loading.
//!
//! Provides a hazard simulator that replays annotated kernels under chosen
//! completion timings, and loaders for kernels and target models.

pub mod loader;
pub mod simulator;

pub use simulator::{
    CompletionModel, FixedCompletion, HazardSimulator, OooDelays, ScriptedCompletion, SimReport,
    Violation, ViolationKind,
};
