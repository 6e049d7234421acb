//! Encoding mode tests.

use pretty_assertions::assert_eq;
use rstest::rstest;
use swsb_core::config::{DistanceCounters, EncodeMode};
use swsb_core::ir::{Instruction, Kernel, SyncOp};

use crate::common::builder::{alu, fpu, kernel, load, math, store};
use crate::common::harness::TestContext;

fn mixed_kernel() -> Kernel {
    kernel(vec![
        load(5, 1),
        alu(3, &[2]),
        math(6, 3),
        fpu(7, &[5, 3]),
        store(1, 7),
        alu(1, &[6]).predicated(),
        load(8, 1),
        fpu(9, &[8, 7]),
        alu(5, &[9]),
    ])
}

fn mode_context(mode: EncodeMode) -> TestContext {
    let mut ctx = TestContext::new();
    ctx.target.encode_mode = mode;
    ctx
}

#[rstest]
#[case::distance_only(EncodeMode::DistanceOnly)]
#[case::token_only(EncodeMode::TokenOnly)]
#[case::hybrid(EncodeMode::Hybrid)]
fn test_mixed_kernel_is_safe(
    #[case] mode: EncodeMode,
    #[values(1, 2, 16)] tokens: u32,
    #[values(DistanceCounters::PerPipe, DistanceCounters::Shared)] counters: DistanceCounters,
) {
    let mut ctx = mode_context(mode).with_tokens(tokens).with_latency(4);
    ctx.target.distance_counters = counters;
    for (read, write) in [(0, 1), (3, 8), (20, 40)] {
        ctx.assert_safe(&mixed_kernel(), read, write);
    }
}

#[test]
fn test_distance_only_never_uses_tokens() {
    let ctx = mode_context(EncodeMode::DistanceOnly);
    let (out, stats) = ctx.annotate(&mixed_kernel());
    assert!(out.instructions().all(|i| i.swsb.token.is_none()));
    assert_eq!(stats.token_assignments, 0);
    assert!(stats.escalations > 0);
}

#[test]
fn test_token_only_never_uses_distances() {
    let ctx = mode_context(EncodeMode::TokenOnly);
    let (out, _) = ctx.annotate(&mixed_kernel());
    assert!(out.instructions().all(|i| i.swsb.distance.is_none()));
}

#[test]
fn test_token_only_drains_in_order_hazard() {
    let ctx = mode_context(EncodeMode::TokenOnly);
    let (plan, stats) = ctx.plan(&kernel(vec![alu(3, &[1]), alu(4, &[3])]));
    assert_eq!(plan.blocks[0].insts[1].pre, vec![SyncOp::AllWr]);
    assert_eq!(stats.escalations, 1);
}

#[test]
fn test_distance_only_tokenless_reader_uses_allrd() {
    let ctx = mode_context(EncodeMode::DistanceOnly);
    let (out, stats) = ctx.annotate(&kernel(vec![store(1, 2), alu(1, &[3])]));
    let listing: Vec<_> = out.blocks[0].insts.iter().map(Instruction::to_string).collect();
    assert_eq!(
        listing,
        vec!["sends <- r1:32, r2:32", "sync.allrd", "add r1:32 <- r3:32", "sync.allwr"]
    );
    assert_eq!(stats.escalations, 1);
}
