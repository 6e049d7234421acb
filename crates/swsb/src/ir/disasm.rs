//! Assembly-style listing of annotated kernels.
//!
//! Renders instructions for the CLI, debug tracing and test diagnostics.
//!
//! # Format
//!
//! ```text
//! (p) send r10:64 <- r2:32 {P0@2 $1}
//! sync.nop {$0.dst}
//! sync.allwr
//! ```

use std::fmt;

use super::instruction::{InstKind, Instruction};
use super::kernel::{Block, Kernel};
use super::operand::Operand;

fn write_operands(f: &mut fmt::Formatter<'_>, ops: &[Operand]) -> fmt::Result {
    for (i, op) in ops.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{op}")?;
    }
    Ok(())
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let InstKind::Sync(op) = self.kind {
            return write!(f, "{op}");
        }
        if self.predicated {
            f.write_str("(p) ")?;
        }
        f.write_str(&self.mnemonic)?;
        if !self.writes.is_empty() {
            f.write_str(" ")?;
            write_operands(f, &self.writes)?;
        }
        if !self.reads.is_empty() {
            f.write_str(" <- ")?;
            write_operands(f, &self.reads)?;
        }
        if !self.swsb.is_empty() {
            write!(f, " {}", self.swsb)?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.label.is_empty() {
            writeln!(f, "{}:", self.label)?;
        }
        for inst in &self.insts {
            writeln!(f, "    {inst}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            writeln!(f, "// kernel {}", self.name)?;
        }
        for (i, block) in self.blocks.iter().enumerate() {
            if block.label.is_empty() {
                writeln!(f, "B{i}:")?;
            }
            write!(f, "{block}")?;
        }
        Ok(())
    }
}
