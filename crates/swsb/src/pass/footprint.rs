//! Footprint model: operands to register-file buckets.
//!
//! The bucket table is laid out as `[grf rows | acc rows | flag regs | addr regs]`.
//! Each register file is its own namespace, so a flag write can never alias a
//! GRF row with the same number.

use std::ops::RangeInclusive;

use crate::common::{BucketIdx, InstLocation, SwsbError};
use crate::config::RegisterFileModel;
use crate::ir::{Instruction, Operand, RegFile};

/// Geometry of one register file inside the bucket table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FileSpan {
    base: u32,
    count: u32,
    row_bytes: u32,
}

/// Maps register regions to bucket indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketLayout {
    grf: FileSpan,
    acc: FileSpan,
    flag: FileSpan,
    addr: FileSpan,
    total: u32,
}

impl BucketLayout {
    /// Builds the layout for a register-file model.
    ///
    /// The model must have passed [`TargetModel::validate`](crate::config::TargetModel::validate),
    /// which bounds the bucket count.
    pub const fn new(rf: &RegisterFileModel) -> Self {
        let grf = FileSpan {
            base: 0,
            count: rf.grf_count,
            row_bytes: rf.grf_bytes,
        };
        let acc = FileSpan {
            base: grf.base + grf.count,
            count: rf.acc_count,
            row_bytes: rf.grf_bytes,
        };
        let flag = FileSpan {
            base: acc.base + acc.count,
            count: rf.flag_count,
            row_bytes: rf.flag_bytes,
        };
        let addr = FileSpan {
            base: flag.base + flag.count,
            count: rf.addr_count,
            row_bytes: rf.addr_bytes,
        };
        Self {
            grf,
            acc,
            flag,
            addr,
            total: addr.base + addr.count,
        }
    }

    /// Number of buckets.
    pub const fn total(&self) -> u32 {
        self.total
    }

    const fn span(&self, file: RegFile) -> FileSpan {
        match file {
            RegFile::Grf => self.grf,
            RegFile::Acc => self.acc,
            RegFile::Flag => self.flag,
            RegFile::Addr => self.addr,
        }
    }

    /// Buckets covered by `op`, or `None` if the region falls outside its register file.
    pub fn resolve(&self, op: &Operand) -> Option<RangeInclusive<u32>> {
        let span = self.span(op.file);
        if op.bytes == 0 || span.row_bytes == 0 {
            return None;
        }
        let row = u64::from(span.row_bytes);
        let start = u64::from(op.reg) * row + u64::from(op.byte);
        let end = start + u64::from(op.bytes) - 1;
        let (first, last) = (start / row, end / row);
        if last >= u64::from(span.count) {
            return None;
        }
        Some(span.base + first as u32..=span.base + last as u32)
    }

    /// The register file and register number a bucket stands for.
    pub fn describe(&self, bucket: BucketIdx) -> Option<(RegFile, u32)> {
        [RegFile::Grf, RegFile::Acc, RegFile::Flag, RegFile::Addr]
            .into_iter()
            .find_map(|file| {
                let span = self.span(file);
                (span.base..span.base + span.count)
                    .contains(&bucket.0)
                    .then(|| (file, bucket.0 - span.base))
            })
    }
}

/// Read and write footprints of one instruction as sorted, de-duplicated bucket lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Footprint {
    /// Buckets read.
    pub reads: Vec<BucketIdx>,
    /// Buckets written.
    pub writes: Vec<BucketIdx>,
}

impl Footprint {
    /// Whether the instruction touches no bucket at all.
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }
}

fn collect(
    layout: &BucketLayout,
    inst: &Instruction,
    at: InstLocation,
    ops: &[Operand],
) -> Result<Vec<BucketIdx>, SwsbError> {
    let mut buckets = Vec::new();
    for op in ops {
        let range = layout
            .resolve(op)
            .ok_or_else(|| SwsbError::UnresolvableOperand {
                at,
                mnemonic: inst.mnemonic.clone(),
                operand: *op,
            })?;
        buckets.extend(range.map(BucketIdx));
    }
    buckets.sort_unstable();
    buckets.dedup();
    Ok(buckets)
}

/// Computes the footprint of `inst`.
///
/// # Errors
///
/// Returns [`SwsbError::UnresolvableOperand`] for the first operand that does
/// not map onto the target's register file.
pub fn footprint(
    layout: &BucketLayout,
    inst: &Instruction,
    at: InstLocation,
) -> Result<Footprint, SwsbError> {
    Ok(Footprint {
        reads: collect(layout, inst, at, &inst.reads)?,
        writes: collect(layout, inst, at, &inst.writes)?,
    })
}
