//! Scheduled instructions as seen by the pass.

use serde::{Deserialize, Serialize};

use super::operand::Operand;
use super::swsb::{Swsb, SyncOp};
use crate::common::PipeId;

/// Out-of-order functional unit. Completion time is unknown at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Message gateway: loads, stores, samplers.
    Send,
    /// Extended math unit.
    Math,
    /// Systolic array.
    Dpas,
}

/// How an instruction's results become visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionClass {
    /// Completes in issue order after the pipe's fixed latency.
    InOrder(PipeId),
    /// Completes asynchronously; consumers must wait on a token.
    OutOfOrder(Unit),
}

impl CompletionClass {
    /// Whether the class completes out of order.
    pub const fn is_out_of_order(self) -> bool {
        matches!(self, Self::OutOfOrder(_))
    }
}

/// Role of an instruction in the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstKind {
    /// Ordinary computation, load, store or message.
    #[default]
    Op,
    /// Control transfer terminating the block.
    Branch,
    /// Explicit barrier: all outstanding state is drained before it.
    Barrier,
    /// Synchronization instruction inserted by the pass.
    Sync(SyncOp),
}

/// One instruction of a basic block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Mnemonic, used for listings and diagnostics.
    pub mnemonic: String,
    /// Role in the block.
    #[serde(default)]
    pub kind: InstKind,
    /// Completion class; required for any instruction touching registers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<CompletionClass>,
    /// Whether execution is guarded by a predicate and may be skipped.
    #[serde(default)]
    pub predicated: bool,
    /// Source operands, including implicit ones (accumulator, flags, address registers).
    #[serde(default)]
    pub reads: Vec<Operand>,
    /// Destination operands.
    #[serde(default)]
    pub writes: Vec<Operand>,
    /// Synchronization annotation, filled in by the pass.
    #[serde(default, skip_serializing_if = "Swsb::is_empty")]
    pub swsb: Swsb,
}

impl Instruction {
    /// An unannotated instruction with no operands and no completion class.
    pub fn new(mnemonic: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            kind: InstKind::Op,
            class: None,
            predicated: false,
            reads: Vec::new(),
            writes: Vec::new(),
            swsb: Swsb::default(),
        }
    }

    /// A standalone synchronization instruction.
    pub fn sync(op: SyncOp) -> Self {
        let mut inst = Self::new(op.mnemonic());
        inst.kind = InstKind::Sync(op);
        if let SyncOp::Nop(swsb) = op {
            inst.swsb = swsb;
        }
        inst
    }

    /// An explicit barrier.
    pub fn barrier() -> Self {
        let mut inst = Self::new("barrier");
        inst.kind = InstKind::Barrier;
        inst
    }

    /// Sets the instruction to complete in order on `pipe`.
    #[must_use]
    pub fn in_order(mut self, pipe: PipeId) -> Self {
        self.class = Some(CompletionClass::InOrder(pipe));
        self
    }

    /// Sets the instruction to complete out of order on `unit`.
    #[must_use]
    pub fn out_of_order(mut self, unit: Unit) -> Self {
        self.class = Some(CompletionClass::OutOfOrder(unit));
        self
    }

    /// Adds a source operand.
    #[must_use]
    pub fn reading(mut self, op: Operand) -> Self {
        self.reads.push(op);
        self
    }

    /// Adds a destination operand.
    #[must_use]
    pub fn writing(mut self, op: Operand) -> Self {
        self.writes.push(op);
        self
    }

    /// Marks the instruction as predicated.
    #[must_use]
    pub const fn predicated(mut self) -> Self {
        self.predicated = true;
        self
    }

    /// Marks the instruction as a block-terminating branch.
    #[must_use]
    pub const fn branch(mut self) -> Self {
        self.kind = InstKind::Branch;
        self
    }

    /// Whether the instruction was inserted by the pass.
    pub const fn is_sync(&self) -> bool {
        matches!(self.kind, InstKind::Sync(_))
    }

    /// Whether the instruction completes out of order.
    pub fn is_out_of_order(&self) -> bool {
        self.class.is_some_and(CompletionClass::is_out_of_order)
    }
}
