//! Instruction-stream representation consumed and produced by the pass.
//!
//! # Contents
//!
//! * `operand`: Register regions and register files.
//! * `instruction`: Instructions, completion classes and instruction kinds.
//! * `kernel`: Basic blocks and kernels.
//! * `swsb`: Distance/token annotations and standalone sync operations.
//! * `disasm`: Assembly-style listings.

/// Assembly-style listing for kernels, blocks and instructions.
pub mod disasm;

/// Instructions and completion classes.
pub mod instruction;

/// Basic blocks and kernels.
pub mod kernel;

/// Register operands.
pub mod operand;

/// SWSB annotations and sync operations.
pub mod swsb;

pub use instruction::{CompletionClass, InstKind, Instruction, Unit};
pub use kernel::{Block, Kernel};
pub use operand::{Operand, RegFile};
pub use swsb::{DistPipe, DistanceDep, Swsb, SyncOp, TokenField};
