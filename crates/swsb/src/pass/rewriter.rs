//! Sync rewriter: applies a [`KernelPlan`] to the kernel it was computed for.
//!
//! Each instruction receives its annotation and is preceded by its standalone
//! syncs; the block-exit drain is appended to blocks without a terminator.
//! Existing instructions are never reordered.

use std::mem;

use crate::common::{InstLocation, SwsbError};
use crate::ir::{Instruction, Kernel};
use crate::pass::decision::KernelPlan;
use crate::stats::SwsbStats;

/// Rewrites `kernel` in place according to `plan`.
///
/// The whole plan is checked against the kernel before the first block is
/// modified, so on error the kernel is unchanged.
///
/// # Errors
///
/// Returns [`SwsbError::PlanMismatch`] if the plan's shape differs from the
/// kernel's and [`SwsbError::AlreadyAnnotated`] if an instruction already
/// carries synchronization.
pub fn apply(
    kernel: &mut Kernel,
    plan: &KernelPlan,
    stats: &mut SwsbStats,
) -> Result<(), SwsbError> {
    if plan.blocks.len() != kernel.blocks.len() {
        return Err(SwsbError::PlanMismatch {
            block: plan.blocks.len().min(kernel.blocks.len()),
        });
    }
    for (b, (block, block_plan)) in kernel.blocks.iter().zip(&plan.blocks).enumerate() {
        if block.insts.len() != block_plan.insts.len() {
            return Err(SwsbError::PlanMismatch { block: b });
        }
        if let Some(i) = block
            .insts
            .iter()
            .position(|inst| inst.is_sync() || !inst.swsb.is_empty())
        {
            return Err(SwsbError::AlreadyAnnotated {
                at: InstLocation { block: b, inst: i },
                mnemonic: block.insts[i].mnemonic.clone(),
            });
        }
    }

    for (block, block_plan) in kernel.blocks.iter_mut().zip(&plan.blocks) {
        let inserted = block_plan.exit.len()
            + block_plan.insts.iter().map(|d| d.pre.len()).sum::<usize>();
        let original = mem::take(&mut block.insts);
        let mut insts = Vec::with_capacity(original.len() + inserted);
        for (mut inst, decision) in original.into_iter().zip(&block_plan.insts) {
            insts.extend(decision.pre.iter().map(|&op| Instruction::sync(op)));
            inst.swsb = decision.swsb;
            insts.push(inst);
        }
        insts.extend(block_plan.exit.iter().map(|&op| Instruction::sync(op)));
        block.insts = insts;
        stats.syncs_inserted += inserted as u64;
    }
    Ok(())
}
