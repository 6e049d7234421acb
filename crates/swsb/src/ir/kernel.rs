//! Kernels and basic blocks.

use serde::{Deserialize, Serialize};

use super::instruction::{InstKind, Instruction};

/// A straight-line sequence of scheduled instructions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Label printed in listings.
    #[serde(default)]
    pub label: String,
    /// Instructions in execution order.
    pub insts: Vec<Instruction>,
}

impl Block {
    /// Creates a block from its instructions.
    pub fn new(label: impl Into<String>, insts: Vec<Instruction>) -> Self {
        Self {
            label: label.into(),
            insts,
        }
    }

    /// Index of the terminating branch, if the block ends in one.
    pub fn terminator(&self) -> Option<usize> {
        self.insts
            .last()
            .filter(|inst| inst.kind == InstKind::Branch)
            .map(|_| self.insts.len() - 1)
    }

    /// Number of synchronization instructions in the block.
    pub fn sync_count(&self) -> usize {
        self.insts.iter().filter(|inst| inst.is_sync()).count()
    }
}

/// An ordered collection of basic blocks processed by one pass instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kernel {
    /// Kernel name.
    #[serde(default)]
    pub name: String,
    /// Blocks in program order.
    pub blocks: Vec<Block>,
}

impl Kernel {
    /// Creates a kernel from its blocks.
    pub fn new(name: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            name: name.into(),
            blocks,
        }
    }

    /// Total instruction count across all blocks.
    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.insts.len()).sum()
    }

    /// Whether the kernel has no instructions.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.insts.is_empty())
    }

    /// Iterates over every instruction in program order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.insts.iter())
    }
}
