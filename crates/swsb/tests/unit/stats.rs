//! Statistics tests.

use pretty_assertions::assert_eq;
use swsb_core::stats::{STATS_SECTIONS, SwsbStats};

use crate::common::builder::{alu, kernel, kernel_blocks, load};
use crate::common::harness::TestContext;

#[test]
fn test_syncs_inserted_matches_output() {
    let ctx = TestContext::new().with_tokens(1);
    let k = kernel_blocks(vec![
        vec![load(5, 1), load(6, 1), alu(7, &[5, 6]).predicated()],
        vec![alu(3, &[1]), load(4, 3)],
    ]);
    let (plan, _) = ctx.plan(&k);
    let (out, stats) = ctx.annotate(&k);
    let syncs: usize = out.blocks.iter().map(|b| b.sync_count()).sum();
    assert_eq!(stats.syncs_inserted, syncs as u64);
    assert_eq!(plan.sync_count(), syncs);
    assert_eq!(out.len(), k.len() + syncs);
}

#[test]
fn test_counters_for_small_kernel() {
    let ctx = TestContext::new();
    let (_, stats) = ctx.annotate(&kernel_blocks(vec![
        vec![load(5, 1), alu(6, &[5]), alu(7, &[6])],
        vec![alu(8, &[1])],
    ]));
    assert_eq!(
        stats,
        SwsbStats {
            blocks: 2,
            instructions: 4,
            distance_deps: 1,
            token_waits: 1,
            token_assignments: 1,
            drains: 2,
            syncs_inserted: 2,
            ..SwsbStats::default()
        }
    );
}

#[test]
fn test_merge_adds_counters() {
    let ctx = TestContext::new();
    let (_, a) = ctx.annotate(&kernel(vec![load(5, 1), alu(6, &[5])]));
    let mut total = a.clone();
    total.merge(&a);
    assert_eq!(total.instructions, 2 * a.instructions);
    assert_eq!(total.token_waits, 2 * a.token_waits);
}

#[test]
fn test_render_selected_sections() {
    let stats = SwsbStats {
        token_reuse_stalls: 3,
        distance_deps: 5,
        ..SwsbStats::default()
    };
    let tokens = stats.render_sections(&["tokens".to_owned()]);
    assert!(tokens.contains("SWSB PASS STATISTICS"));
    assert!(tokens.contains("token.reuse_stalls     3"));
    assert!(!tokens.contains("DISTANCE"));
    assert!(!tokens.contains("instructions"));

    let all = stats.render_sections(&[]);
    assert!(all.contains("TOKENS"));
    assert!(all.contains("dist.deps              5"));
    assert!(all.contains("blocks"));
}

#[test]
fn test_every_section_is_rendered() {
    let stats = SwsbStats::default();
    let names: Vec<String> = STATS_SECTIONS.iter().map(|s| (*s).to_owned()).collect();
    assert_eq!(stats.render_sections(&names), stats.render_sections(&[]));
}
