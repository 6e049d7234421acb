//! Predicated instruction handling.

use pretty_assertions::assert_eq;
use swsb_core::common::PipeId;
use swsb_core::ir::{DistPipe, DistanceDep};

use crate::common::builder::{alu, fpu, kernel, load};
use crate::common::harness::TestContext;

#[test]
fn test_token_wait_is_shot_down() {
    let ctx = TestContext::new();
    let k = kernel(vec![load(5, 1), alu(6, &[5]).predicated()]);
    let (out, stats) = ctx.annotate(&k);
    let listing: Vec<_> = out.blocks[0].insts.iter().map(ToString::to_string).collect();
    assert_eq!(
        listing,
        vec![
            "send r5:32 <- r1:32 {$0}",
            "sync.nop {$0.dst}",
            "(p) add r6:32 <- r5:32",
            "sync.allwr",
        ]
    );
    assert_eq!(stats.shootdown_syncs, 1);
    ctx.assert_safe(&k, 2, 10);
}

#[test]
fn test_distance_stays_on_predicated_instruction() {
    let ctx = TestContext::new();
    assert_eq!(
        ctx.listing(vec![alu(3, &[1]), alu(4, &[3]).predicated()]),
        vec![
            "add r3:32 <- r1:32",
            "(p) add r4:32 <- r3:32 {P0@1}",
            "sync.allwr",
        ]
    );
}

#[test]
fn test_predicated_writer_does_not_supersede() {
    let ctx = TestContext::new();
    let k = kernel(vec![alu(5, &[1]), fpu(5, &[2]).predicated(), fpu(6, &[5])]);
    let (plan, _) = ctx.plan(&k);
    let consumer = &plan.blocks[0].insts[2];
    // Either write may be the one that lands.
    assert_eq!(consumer.hazards.len(), 2);
    assert_eq!(
        consumer.swsb.distance,
        Some(DistanceDep {
            pipe: DistPipe::All,
            distance: 1,
        })
    );
    ctx.assert_safe(&k, 1, 4);
}

#[test]
fn test_unpredicated_writer_supersedes() {
    let ctx = TestContext::new();
    let (plan, _) = ctx.plan(&kernel(vec![alu(5, &[1]), fpu(5, &[2]), fpu(6, &[5])]));
    let consumer = &plan.blocks[0].insts[2];
    assert_eq!(consumer.hazards.len(), 1);
    assert_eq!(
        consumer.swsb.distance,
        Some(DistanceDep {
            pipe: DistPipe::Pipe(PipeId(1)),
            distance: 1,
        })
    );
}

#[test]
fn test_predicated_producer_still_gets_token() {
    let ctx = TestContext::new();
    let k = kernel(vec![load(5, 1).predicated(), alu(6, &[5])]);
    assert_eq!(
        ctx.listing(k.blocks[0].insts.clone()),
        vec![
            "(p) send r5:32 <- r1:32 {$0}",
            "add r6:32 <- r5:32 {$0.dst}",
            "sync.allwr",
        ]
    );
    ctx.assert_safe(&k, 3, 7);
}

#[test]
fn test_skipped_producer_then_reuse_is_safe() {
    let ctx = TestContext::new().with_tokens(1);
    let k = kernel(vec![
        load(5, 1).predicated(),
        load(6, 5).predicated(),
        alu(7, &[5, 6]).predicated(),
        load(5, 7),
    ]);
    ctx.assert_safe(&k, 4, 9);
}
