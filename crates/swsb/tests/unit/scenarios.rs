//! End-to-end listings of small kernels.

use pretty_assertions::assert_eq;

use crate::common::builder::{alu, load};
use crate::common::harness::TestContext;

#[test]
fn test_pool_exhaustion_reuses_oldest_token() {
    let ctx = TestContext::new().with_tokens(2);
    let listing = ctx.listing(vec![
        load(5, 1),
        load(7, 1),
        load(9, 1),
        alu(20, &[5]),
        alu(21, &[9]),
    ]);
    assert_eq!(
        listing,
        vec![
            "send r5:32 <- r1:32 {$0}",
            "send r7:32 <- r1:32 {$1}",
            "sync.nop {$0.dst}",
            "send r9:32 <- r1:32 {$0}",
            // r5 was covered by the reuse stall.
            "add r20:32 <- r5:32",
            "add r21:32 <- r9:32 {$0.dst}",
            "sync.allwr",
        ]
    );
}

#[test]
fn test_in_order_distance_and_expiry() {
    let ctx = TestContext::new().with_single_pipe(4);
    let listing = ctx.listing(vec![
        alu(3, &[1]),
        alu(4, &[2]),
        alu(5, &[3]),
        alu(6, &[7]),
        alu(8, &[3]),
    ]);
    assert_eq!(
        listing,
        vec![
            "add r3:32 <- r1:32",
            "add r4:32 <- r2:32",
            "add r5:32 <- r3:32 {P0@2}",
            "add r6:32 <- r7:32",
            // Four instructions have issued on the pipe since r3 was written.
            "add r8:32 <- r3:32",
            "sync.allwr",
        ]
    );
}

#[test]
fn test_demoted_distance_becomes_sync() {
    let ctx = TestContext::new();
    let insts = vec![load(5, 1), alu(3, &[2]), alu(6, &[5, 3])];
    let (_, stats) = ctx.annotate(&crate::common::builder::kernel(insts.clone()));
    assert_eq!(
        ctx.listing(insts),
        vec![
            "send r5:32 <- r1:32 {$0}",
            "add r3:32 <- r2:32",
            "sync.nop {P0@1}",
            "add r6:32 <- r5:32, r3:32 {$0.dst}",
            "sync.allwr",
        ]
    );
    assert_eq!(stats.demoted_distances, 1);
    assert_eq!(stats.distance_deps, 1);
}

#[test]
fn test_distance_shares_slot_with_token_wait_when_allowed() {
    let mut ctx = TestContext::new();
    ctx.target.allow_distance_with_token_wait = true;
    assert_eq!(
        ctx.listing(vec![load(5, 1), alu(3, &[2]), alu(6, &[5, 3])]),
        vec![
            "send r5:32 <- r1:32 {$0}",
            "add r3:32 <- r2:32",
            "add r6:32 <- r5:32, r3:32 {P0@1 $0.dst}",
            "sync.allwr",
        ]
    );
}

#[test]
fn test_independent_instructions_are_left_alone() {
    let ctx = TestContext::new();
    let insts = vec![alu(2, &[1]), alu(3, &[1]), alu(4, &[1])];
    let (out, stats) = ctx.annotate(&crate::common::builder::kernel(insts.clone()));
    // Only the block-exit drain is added.
    assert_eq!(out.blocks[0].insts[..3], insts[..]);
    assert_eq!(stats.syncs_inserted, 1);
    assert_eq!(stats.distance_deps, 0);
}
