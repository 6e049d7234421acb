//! Register operands.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Register file an operand lives in. Each file is its own bucket namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegFile {
    /// General register file.
    Grf,
    /// Accumulators, including implicit accumulator reads.
    Acc,
    /// Flag registers (predicates, conditional modifiers).
    Flag,
    /// Address registers used for indirect addressing.
    Addr,
}

impl RegFile {
    /// Assembly prefix of the register file.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Grf => "r",
            Self::Acc => "acc",
            Self::Flag => "f",
            Self::Addr => "a",
        }
    }
}

/// A register region touched by an instruction: `bytes` bytes starting at
/// byte `byte` of register `reg`. Regions may run into following registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operand {
    /// Register file.
    pub file: RegFile,
    /// Register number within the file.
    pub reg: u32,
    /// Starting byte offset within the register.
    #[serde(default)]
    pub byte: u32,
    /// Size of the region in bytes.
    pub bytes: u32,
}

impl Operand {
    /// A region of the general register file.
    pub const fn grf(reg: u32, bytes: u32) -> Self {
        Self {
            file: RegFile::Grf,
            reg,
            byte: 0,
            bytes,
        }
    }

    /// An accumulator region.
    pub const fn acc(reg: u32, bytes: u32) -> Self {
        Self {
            file: RegFile::Acc,
            reg,
            byte: 0,
            bytes,
        }
    }

    /// A whole flag register of `bytes` bytes.
    pub const fn flag(reg: u32, bytes: u32) -> Self {
        Self {
            file: RegFile::Flag,
            reg,
            byte: 0,
            bytes,
        }
    }

    /// An address register region.
    pub const fn addr(reg: u32, bytes: u32) -> Self {
        Self {
            file: RegFile::Addr,
            reg,
            byte: 0,
            bytes,
        }
    }

    /// Returns the same region shifted to start at `byte` within the register.
    #[must_use]
    pub const fn at_byte(mut self, byte: u32) -> Self {
        self.byte = byte;
        self
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file.prefix(), self.reg)?;
        if self.byte != 0 {
            write!(f, ".{}", self.byte)?;
        }
        write!(f, ":{}", self.bytes)
    }
}
