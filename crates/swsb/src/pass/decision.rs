//! Decisions produced by the analyzer and consumed by the rewriter.
//!
//! Analysis never touches the kernel. It produces one [`InstDecision`] per
//! input instruction so the whole kernel can be checked before any
//! instruction is rewritten, and so tests can inspect why a wait was chosen.

use std::fmt;

use crate::common::BucketIdx;
use crate::ir::{Swsb, SyncOp, TokenField};

/// Dependency class between a producer and a consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HazardKind {
    /// Read after write.
    Raw,
    /// Write after read.
    War,
    /// Write after write.
    Waw,
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Raw => "RAW",
            Self::War => "WAR",
            Self::Waw => "WAW",
        })
    }
}

/// How one hazard was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// In-order completion already guarantees the ordering.
    Ordered,
    /// A distance wait of the given value.
    Distance(u32),
    /// A token wait.
    Token(TokenField),
    /// A full drain (`sync.allwr` or `sync.allrd`).
    Drain,
}

/// A hazard found against a live dependency set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hazard {
    /// Index of the producing instruction in the block.
    pub producer: usize,
    /// First bucket the hazard was found in.
    pub bucket: BucketIdx,
    /// Dependency class.
    pub kind: HazardKind,
    /// How it was satisfied.
    pub resolution: Resolution,
}

/// Synchronization chosen for one input instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstDecision {
    /// Annotation for the instruction itself.
    pub swsb: Swsb,
    /// Standalone syncs to insert immediately before the instruction, in order.
    pub pre: Vec<SyncOp>,
    /// Hazards found, in discovery order.
    pub hazards: Vec<Hazard>,
}

impl InstDecision {
    /// Whether the instruction needs no synchronization at all.
    pub fn is_empty(&self) -> bool {
        self.swsb.is_empty() && self.pre.is_empty()
    }
}

/// Decisions for one block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockPlan {
    /// One decision per input instruction.
    pub insts: Vec<InstDecision>,
    /// Syncs appended at the end of a block without a terminator.
    pub exit: Vec<SyncOp>,
}

/// Decisions for a whole kernel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KernelPlan {
    /// One plan per block, in program order.
    pub blocks: Vec<BlockPlan>,
}

impl KernelPlan {
    /// Number of standalone syncs the plan will insert.
    pub fn sync_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|b| b.exit.len() + b.insts.iter().map(|d| d.pre.len()).sum::<usize>())
            .sum()
    }
}
