//! Distance encoding tests.

use pretty_assertions::assert_eq;
use swsb_core::common::PipeId;
use swsb_core::config::DistanceCounters;
use swsb_core::ir::{DistPipe, DistanceDep, SyncOp};
use swsb_core::pass::Resolution;

use crate::common::builder::{FLOAT, INT, LONG, alu, fpu, kernel, on_pipe};
use crate::common::harness::TestContext;

fn dist(pipe: DistPipe, distance: u32) -> Option<DistanceDep> {
    Some(DistanceDep { pipe, distance })
}

#[test]
fn test_cross_pipe_raw_names_producer_pipe() {
    let ctx = TestContext::new();
    let (plan, _) = ctx.plan(&kernel(vec![alu(3, &[1]), fpu(5, &[3])]));
    assert_eq!(
        plan.blocks[0].insts[1].swsb.distance,
        dist(DistPipe::Pipe(INT), 1)
    );
}

#[test]
fn test_distance_counts_only_producer_pipe() {
    let ctx = TestContext::new();
    let (plan, _) = ctx.plan(&kernel(vec![
        alu(3, &[1]),
        fpu(10, &[1]),
        fpu(11, &[1]),
        alu(4, &[1]),
        fpu(12, &[3]),
    ]));
    // Two integer instructions issued since r3; float traffic does not count.
    assert_eq!(
        plan.blocks[0].insts[4].swsb.distance,
        dist(DistPipe::Pipe(INT), 2)
    );
}

#[test]
fn test_several_pipes_collapse_to_all() {
    let ctx = TestContext::new();
    let (plan, _) = ctx.plan(&kernel(vec![
        alu(3, &[1]),
        alu(4, &[1]),
        fpu(5, &[1]),
        fpu(6, &[3, 5]),
    ]));
    assert_eq!(
        plan.blocks[0].insts[3].swsb.distance,
        dist(DistPipe::All, 1)
    );
}

#[test]
fn test_shared_counter_uses_all() {
    let mut ctx = TestContext::new();
    ctx.target.distance_counters = DistanceCounters::Shared;
    let (plan, _) = ctx.plan(&kernel(vec![alu(3, &[1]), fpu(4, &[1]), fpu(5, &[3])]));
    assert_eq!(
        plan.blocks[0].insts[2].swsb.distance,
        dist(DistPipe::All, 2)
    );
}

#[test]
fn test_smallest_distance_wins() {
    let ctx = TestContext::new();
    let (plan, _) = ctx.plan(&kernel(vec![alu(3, &[1]), alu(4, &[1]), alu(5, &[3, 4])]));
    let decision = &plan.blocks[0].insts[2];
    assert_eq!(decision.swsb.distance, dist(DistPipe::Pipe(INT), 1));
    let resolutions: Vec<_> = decision.hazards.iter().map(|h| h.resolution).collect();
    assert_eq!(
        resolutions,
        vec![Resolution::Distance(2), Resolution::Distance(1)]
    );
}

#[test]
fn test_same_pipe_waw_needs_nothing() {
    let ctx = TestContext::new();
    let (plan, _) = ctx.plan(&kernel(vec![alu(3, &[1]), alu(3, &[2])]));
    assert!(plan.blocks[0].insts[1].is_empty());
    assert_eq!(plan.blocks[0].insts[1].hazards[0].resolution, Resolution::Ordered);
}

#[test]
fn test_cross_pipe_waw_needs_distance() {
    let ctx = TestContext::new();
    let (plan, _) = ctx.plan(&kernel(vec![on_pipe(LONG, 3, &[1]), fpu(3, &[2])]));
    assert_eq!(
        plan.blocks[0].insts[1].swsb.distance,
        dist(DistPipe::Pipe(PipeId(2)), 1)
    );
}

#[test]
fn test_expired_producer_needs_no_wait() {
    let ctx = TestContext::new().with_single_pipe(3);
    let (plan, _) = ctx.plan(&kernel(vec![
        alu(3, &[1]),
        alu(10, &[1]),
        alu(11, &[1]),
        alu(12, &[1]),
        alu(4, &[3]),
    ]));
    assert!(plan.blocks[0].insts[4].hazards.is_empty());
}

#[test]
fn test_distance_overflow_escalates_to_drain() {
    let mut ctx = TestContext::new().with_single_pipe(12);
    ctx.target.max_distance = 7;
    let mut insts = vec![alu(3, &[1])];
    insts.extend((0..8).map(|i| alu(10 + i, &[1])));
    insts.push(alu(4, &[3]));
    let k = kernel(insts);

    let (plan, stats) = ctx.plan(&k);
    let decision = &plan.blocks[0].insts[9];
    assert_eq!(decision.pre, vec![SyncOp::AllWr]);
    assert_eq!(decision.swsb.distance, None);
    assert_eq!(decision.hazards[0].resolution, Resolution::Drain);
    assert_eq!(stats.escalations, 1);
    ctx.assert_safe(&k, 1, 4);
}

#[test]
fn test_distance_kernels_are_safe() {
    let ctx = TestContext::new().with_latency(5);
    let k = kernel(vec![
        alu(3, &[1]),
        fpu(4, &[3]),
        on_pipe(LONG, 5, &[4]),
        alu(3, &[5]),
        fpu(6, &[3, 4]),
        on_pipe(FLOAT, 5, &[6]),
        alu(7, &[5]),
    ]);
    ctx.assert_safe(&k, 1, 4);
}
