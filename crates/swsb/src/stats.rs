//! Pass statistics collection and reporting.
//!
//! This module tracks what the SWSB pass emitted for one kernel. It provides:
//! 1. **Summary:** Blocks and instructions analyzed, standalone syncs inserted, drains.
//! 2. **Tokens:** Token assignments, token waits, reuse stalls and shoot-down syncs.
//! 3. **Distance:** Distance dependencies, demotions and overflow escalations.

use serde::Serialize;

/// Counters accumulated by one run of the pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SwsbStats {
    /// Basic blocks analyzed.
    pub blocks: u64,
    /// Input instructions analyzed (excluding inserted syncs).
    pub instructions: u64,

    /// Distance dependencies emitted, on an instruction or demoted to a sync.
    pub distance_deps: u64,
    /// Distances moved to a standalone `sync.nop` because the instruction carried a token wait.
    pub demoted_distances: u64,
    /// Hazards that could not be encoded and forced `sync.allwr` or `sync.allrd`.
    pub escalations: u64,

    /// Token waits emitted (`.src` or `.dst`), on an instruction or as a sync.
    pub token_waits: u64,
    /// Tokens handed to out-of-order producers.
    pub token_assignments: u64,
    /// Reassignments of a busy token, each preceded by a `.dst` wait.
    pub token_reuse_stalls: u64,
    /// Token waits moved off a predicated instruction into an unpredicated sync.
    pub shootdown_syncs: u64,

    /// Drains that emitted `sync.allwr` or `sync.allrd` (barriers, block exits, escalations).
    pub drains: u64,
    /// Standalone synchronization instructions inserted into the kernel.
    pub syncs_inserted: u64,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"tokens"`, `"distance"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "tokens", "distance"];

const RULE: &str = "==========================================================";
const THIN_RULE: &str = "----------------------------------------------------------";

impl SwsbStats {
    /// Adds another run's counters to these.
    pub fn merge(&mut self, other: &Self) {
        self.blocks += other.blocks;
        self.instructions += other.instructions;
        self.distance_deps += other.distance_deps;
        self.demoted_distances += other.demoted_distances;
        self.escalations += other.escalations;
        self.token_waits += other.token_waits;
        self.token_assignments += other.token_assignments;
        self.token_reuse_stalls += other.token_reuse_stalls;
        self.shootdown_syncs += other.shootdown_syncs;
        self.drains += other.drains;
        self.syncs_inserted += other.syncs_inserted;
    }

    /// Renders the requested sections as text.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]; unknown
    /// names are ignored. An empty slice renders every section.
    pub fn render_sections(&self, sections: &[String]) -> String {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let insts = self.instructions.max(1) as f64;
        let mut lines = vec![RULE.to_owned(), "SWSB PASS STATISTICS".to_owned(), RULE.to_owned()];

        if want("summary") {
            let overhead = self.syncs_inserted as f64 / insts * 100.0;
            lines.push(format!("blocks                   {}", self.blocks));
            lines.push(format!("instructions             {}", self.instructions));
            lines.push(format!(
                "syncs_inserted           {} ({overhead:.2}%)",
                self.syncs_inserted
            ));
            lines.push(format!("drains                   {}", self.drains));
            lines.push(THIN_RULE.to_owned());
        }
        if want("tokens") {
            lines.push("TOKENS".to_owned());
            lines.push(format!("  token.assignments      {}", self.token_assignments));
            lines.push(format!("  token.waits            {}", self.token_waits));
            lines.push(format!("  token.reuse_stalls     {}", self.token_reuse_stalls));
            lines.push(format!("  token.shootdown_syncs  {}", self.shootdown_syncs));
            lines.push(THIN_RULE.to_owned());
        }
        if want("distance") {
            lines.push("DISTANCE".to_owned());
            lines.push(format!("  dist.deps              {}", self.distance_deps));
            lines.push(format!("  dist.demoted           {}", self.demoted_distances));
            lines.push(format!("  dist.escalations       {}", self.escalations));
        }
        lines.push(RULE.to_owned());
        lines.join("\n")
    }

    /// Prints only the requested statistics sections to stdout.
    pub fn print_sections(&self, sections: &[String]) {
        println!("{}", self.render_sections(sections));
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
