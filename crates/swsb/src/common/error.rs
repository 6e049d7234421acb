//! Error definitions for the dependency pass and its loaders.
//!
//! The pass itself can only fail on malformed input: everything else (token
//! exhaustion, distance overflow) is resolved internally by emitting syncs.
//! 1. **`SwsbError`:** Fatal configuration and usage errors raised by the pass.
//! 2. **`LoadError`:** I/O and JSON failures while reading kernels or target models.

use std::path::PathBuf;

use thiserror::Error;

use crate::ir::Operand;

/// Position of an instruction inside a kernel, used to identify the culprit in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstLocation {
    /// Index of the basic block within the kernel.
    pub block: usize,
    /// Index of the instruction within the block (input order).
    pub inst: usize,
}

impl std::fmt::Display for InstLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "block {} inst {}", self.block, self.inst)
    }
}

/// Fatal errors raised by the SWSB pass.
///
/// Any of these aborts the compilation unit; the kernel is left untouched
/// because rewriting only starts once every block has been analyzed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SwsbError {
    /// An operand does not map to any bucket of the target's register file.
    #[error("{at} ({mnemonic}): operand {operand} cannot be resolved to a register-file bucket")]
    UnresolvableOperand {
        /// Where the instruction sits.
        at: InstLocation,
        /// Mnemonic of the offending instruction.
        mnemonic: String,
        /// The operand that failed to resolve.
        operand: Operand,
    },

    /// An instruction touching registers has no usable completion class.
    #[error("{at} ({mnemonic}): unknown completion class: {reason}")]
    UnknownCompletionClass {
        /// Where the instruction sits.
        at: InstLocation,
        /// Mnemonic of the offending instruction.
        mnemonic: String,
        /// What was wrong with the class.
        reason: String,
    },

    /// The input already carries synchronization; the pass is not re-entrant.
    #[error("{at} ({mnemonic}): instruction is already annotated with synchronization")]
    AlreadyAnnotated {
        /// Where the instruction sits.
        at: InstLocation,
        /// Mnemonic of the offending instruction.
        mnemonic: String,
    },

    /// A plan does not describe the block it is applied to.
    #[error("plan for block {block} does not match its instructions")]
    PlanMismatch {
        /// Index of the mismatched block.
        block: usize,
    },

    /// The target model descriptor is inconsistent.
    #[error("invalid target model: {0}")]
    InvalidTarget(String),
}

/// Errors raised while loading kernels or target models from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("could not read '{path}': {source}")]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for the expected type.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The loaded target model failed validation.
    #[error(transparent)]
    Target(#[from] SwsbError),
}
