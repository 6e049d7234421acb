//! Hazard analyzer.
//!
//! This module walks each basic block in program order and decides the
//! synchronization every instruction needs. It provides:
//! 1. **Hazard detection:** RAW, WAR and WAW hazards against the live dependency sets of the bucket table.
//! 2. **Resolution:** Distance waits for in-order producers, token waits for out-of-order producers,
//!    drains when neither can be encoded.
//! 3. **Slot assignment:** Which waits fit on the instruction and which become standalone syncs.
//! 4. **Bookkeeping:** Token assignment and reuse, superseding writes, distance-tracker expiry and drains.
//!
//! The analyzer never touches the kernel; it produces a [`KernelPlan`] that the
//! rewriter applies once every block has been checked.

use tracing::{debug, info};

use crate::common::{BucketIdx, DepId, InstLocation, PipeId, SwsbError, TokenId};
use crate::config::{DistanceCounters, TargetModel};
use crate::ir::{
    Block, CompletionClass, DistPipe, DistanceDep, InstKind, Instruction, Kernel, Swsb, SyncOp,
    TokenField,
};
use crate::pass::bucket::BucketTable;
use crate::pass::decision::{BlockPlan, Hazard, HazardKind, InstDecision, KernelPlan, Resolution};
use crate::pass::deps::{Access, DepArena, DepSet, ExecTag};
use crate::pass::distance::{DistanceEntry, DistanceTracker, IssueCounters};
use crate::pass::footprint::{self, BucketLayout, Footprint};
use crate::pass::token_pool::TokenPool;
use crate::stats::SwsbStats;

/// A live dependency set that conflicts with the instruction being analyzed.
#[derive(Clone, Copy, Debug)]
struct Conflict {
    dep: DepId,
    bucket: BucketIdx,
    kind: HazardKind,
}

/// Waits required by one instruction before slot assignment.
#[derive(Debug)]
struct Waits {
    /// A hazard could not be encoded; everything must drain.
    drain: bool,
    /// A tokenless out-of-order reader must finish reading.
    all_rd: bool,
    /// Smallest required distance per counter.
    distance: Vec<Option<u32>>,
    /// Token waits in discovery order; `true` for `.dst`.
    tokens: Vec<(TokenId, bool)>,
}

impl Waits {
    fn new(counters: usize) -> Self {
        Self {
            drain: false,
            all_rd: false,
            distance: vec![None; counters],
            tokens: Vec::new(),
        }
    }

    fn need_distance(&mut self, counter: usize, distance: u32) {
        let slot = &mut self.distance[counter];
        *slot = Some(slot.map_or(distance, |d| d.min(distance)));
    }

    fn need_token(&mut self, token: TokenId, dst: bool) {
        match self.tokens.iter_mut().find(|(t, _)| *t == token) {
            Some((_, strongest)) => *strongest |= dst,
            None => self.tokens.push((token, dst)),
        }
    }
}

/// Per-kernel analysis state: bucket table, token pool, distance tracker and counters.
///
/// One analyzer instance owns all of its state exclusively and processes
/// blocks sequentially, so token choices are deterministic.
#[derive(Debug)]
pub struct SwsbAnalyzer<'t> {
    target: &'t TargetModel,
    layout: BucketLayout,
    arena: DepArena,
    buckets: BucketTable,
    tokens: TokenPool,
    tracker: DistanceTracker,
    counters: IssueCounters,
    latencies: Vec<u32>,
    stats: SwsbStats,
}

impl<'t> SwsbAnalyzer<'t> {
    /// Creates an analyzer for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SwsbError::InvalidTarget`] if the target model fails validation.
    pub fn new(target: &'t TargetModel) -> Result<Self, SwsbError> {
        target.validate()?;
        let layout = BucketLayout::new(&target.register_file);
        let counters = target.counter_count();
        Ok(Self {
            target,
            buckets: BucketTable::new(layout.total()),
            layout,
            arena: DepArena::new(),
            tokens: TokenPool::new(target.effective_token_count()),
            tracker: DistanceTracker::new(counters),
            counters: IssueCounters::new(counters),
            latencies: (0..counters).map(|c| target.counter_latency(c)).collect(),
            stats: SwsbStats::default(),
        })
    }

    /// Statistics accumulated so far.
    pub const fn stats(&self) -> &SwsbStats {
        &self.stats
    }

    /// Consumes the analyzer, returning its statistics.
    pub fn into_stats(self) -> SwsbStats {
        self.stats
    }

    /// The bucket table, for inspection between instructions.
    pub const fn buckets(&self) -> &BucketTable {
        &self.buckets
    }

    /// The token pool, for inspection between instructions.
    pub const fn tokens(&self) -> &TokenPool {
        &self.tokens
    }

    /// The distance tracker, for inspection between instructions.
    pub const fn tracker(&self) -> &DistanceTracker {
        &self.tracker
    }

    /// Whether no dependency is outstanding.
    pub fn is_clear(&self) -> bool {
        self.buckets.is_empty() && self.tracker.is_empty() && self.tokens.assigned_count() == 0
    }

    /// Analyzes every block of `kernel`.
    ///
    /// # Errors
    ///
    /// Returns the first [`SwsbError`] raised by any instruction; no plan is produced then.
    pub fn analyze_kernel(&mut self, kernel: &Kernel) -> Result<KernelPlan, SwsbError> {
        self.reset();
        let blocks = kernel
            .blocks
            .iter()
            .enumerate()
            .map(|(i, block)| self.analyze_block(i, block))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            kernel = %kernel.name,
            blocks = self.stats.blocks,
            instructions = self.stats.instructions,
            distance_deps = self.stats.distance_deps,
            token_waits = self.stats.token_waits,
            reuse_stalls = self.stats.token_reuse_stalls,
            drains = self.stats.drains,
            "swsb analysis complete"
        );
        Ok(KernelPlan { blocks })
    }

    /// Analyzes one block.
    ///
    /// The block ends with empty state unless its terminator leaves results in
    /// flight; those are drained ahead of the first instruction of the next block.
    ///
    /// # Errors
    ///
    /// Returns the first [`SwsbError`] raised by an instruction of the block.
    pub fn analyze_block(&mut self, index: usize, block: &Block) -> Result<BlockPlan, SwsbError> {
        let terminator = block.terminator();
        let mut plan = BlockPlan {
            insts: Vec::with_capacity(block.insts.len()),
            exit: Vec::new(),
        };
        let mut carried = if self.is_clear() {
            self.reset();
            None
        } else {
            debug!(block = index, "draining state carried past previous terminator");
            self.drain(InstLocation { block: index, inst: 0 })
        };

        for (i, inst) in block.insts.iter().enumerate() {
            let at = InstLocation { block: index, inst: i };
            if inst.is_sync() || !inst.swsb.is_empty() {
                return Err(SwsbError::AlreadyAnnotated {
                    at,
                    mnemonic: inst.mnemonic.clone(),
                });
            }
            let mut decision = InstDecision::default();
            decision.pre.extend(carried.take());
            if inst.kind == InstKind::Barrier || terminator == Some(i) {
                decision.pre.extend(self.drain(at));
            }
            self.analyze_inst(i, inst, at, &mut decision)?;
            plan.insts.push(decision);
        }

        if terminator.is_some() {
            if !self.is_clear() {
                debug!(
                    block = index,
                    live_buckets = self.buckets.occupied(),
                    "terminator leaves state for the next block"
                );
            }
        } else {
            plan.exit.extend(carried);
            plan.exit.extend(self.drain(InstLocation {
                block: index,
                inst: block.insts.len(),
            }));
        }

        self.stats.blocks += 1;
        Ok(plan)
    }

    /// Analyzes one instruction and records its state.
    ///
    /// `decision` may already hold syncs (a drain before a barrier); new syncs are appended.
    ///
    /// # Errors
    ///
    /// Returns [`SwsbError::UnresolvableOperand`] or [`SwsbError::UnknownCompletionClass`].
    pub fn analyze_inst(
        &mut self,
        index: usize,
        inst: &Instruction,
        at: InstLocation,
        decision: &mut InstDecision,
    ) -> Result<(), SwsbError> {
        let fp = footprint::footprint(&self.layout, inst, at)?;
        let class = self.completion_class(inst, &fp, at)?;
        self.stats.instructions += 1;

        let conflicts = self.collect_hazards(&fp);
        let own_counter = match class {
            Some(CompletionClass::InOrder(pipe)) => Some(self.target.counter_of(pipe)),
            _ => None,
        };
        let mut waits = Waits::new(self.latencies.len());
        for c in &conflicts {
            let resolution = self.resolve_wait(c, own_counter, &mut waits);
            decision.hazards.push(Hazard {
                producer: self.arena.get(c.dep).inst,
                bucket: c.bucket,
                kind: c.kind,
                resolution,
            });
        }

        if waits.drain {
            self.stats.escalations += 1;
            decision.pre.extend(self.drain(at));
            for hazard in &mut decision.hazards {
                hazard.resolution = Resolution::Drain;
            }
            waits = Waits::new(self.latencies.len());
        } else if waits.all_rd {
            self.stats.escalations += 1;
            decision.pre.push(SyncOp::AllRd);
            self.clear_out_of_order_reads();
            debug!(%at, "sync.allrd for tokenless reader");
        }

        for hazard in &decision.hazards {
            debug!(
                %at,
                producer = hazard.producer,
                bucket = %hazard.bucket,
                register = ?self.layout.describe(hazard.bucket),
                kind = %hazard.kind,
                resolution = ?hazard.resolution,
                "hazard"
            );
        }

        let token_waits: Vec<TokenField> = waits
            .tokens
            .iter()
            .map(|&(t, dst)| {
                if dst {
                    TokenField::Dst(t)
                } else {
                    TokenField::Src(t)
                }
            })
            .collect();
        for &(t, dst) in &waits.tokens {
            if dst {
                self.release_token(t);
            } else if let Some(input) = self.tokens.clear_input(t) {
                self.buckets.remove(&mut self.arena, input);
            }
        }
        self.stats.token_waits += token_waits.len() as u64;

        let out_of_order = class.is_some_and(CompletionClass::is_out_of_order);
        let mut field_wait = None;
        let mut standalone = token_waits.as_slice();
        if !out_of_order && !token_waits.is_empty() {
            if inst.predicated {
                self.stats.shootdown_syncs += token_waits.len() as u64;
                debug!(
                    %at,
                    waits = token_waits.len(),
                    "token waits moved off predicated instruction"
                );
            } else {
                field_wait = Some(token_waits[0]);
                standalone = &token_waits[1..];
            }
        }
        decision
            .pre
            .extend(standalone.iter().map(|&w| SyncOp::Nop(Swsb::token(w))));

        let mut distance = self.distance_field(&waits.distance);
        let mut demoted = None;
        if distance.is_some() {
            self.stats.distance_deps += 1;
            if field_wait.is_some() && !self.target.allow_distance_with_token_wait {
                self.stats.demoted_distances += 1;
                demoted = distance.take();
            }
        }

        let token = if out_of_order && !fp.is_empty() {
            self.acquire_token(at, &mut decision.pre)
        } else {
            None
        };
        if let Some(dep) = demoted {
            decision.pre.push(SyncOp::Nop(Swsb::distance(dep)));
        }

        decision.swsb = Swsb {
            distance,
            token: token.map(TokenField::Set).or(field_wait),
        };

        if let Some(class) = class {
            self.register(index, inst, class, fp, token);
        }
        Ok(())
    }

    /// Checks the completion class of an instruction against the target.
    fn completion_class(
        &self,
        inst: &Instruction,
        fp: &Footprint,
        at: InstLocation,
    ) -> Result<Option<CompletionClass>, SwsbError> {
        match inst.class {
            Some(CompletionClass::InOrder(pipe)) if self.target.pipe(pipe).is_none() => {
                Err(SwsbError::UnknownCompletionClass {
                    at,
                    mnemonic: inst.mnemonic.clone(),
                    reason: format!("{pipe} is not in the latency table"),
                })
            }
            None if !fp.is_empty() => Err(SwsbError::UnknownCompletionClass {
                at,
                mnemonic: inst.mnemonic.clone(),
                reason: "instruction touches registers but has no completion class".into(),
            }),
            class => Ok(class),
        }
    }

    /// Finds the live dependency sets conflicting with `fp`, one entry per set and hazard kind.
    fn collect_hazards(&self, fp: &Footprint) -> Vec<Conflict> {
        fn note(found: &mut Vec<Conflict>, dep: DepId, bucket: BucketIdx, kind: HazardKind) {
            if !found.iter().any(|c| c.dep == dep && c.kind == kind) {
                found.push(Conflict { dep, bucket, kind });
            }
        }

        let mut found = Vec::new();
        for &b in &fp.reads {
            for &dep in self.buckets.bucket(b).deps() {
                if self.arena.get(dep).access == Access::Write {
                    note(&mut found, dep, b, HazardKind::Raw);
                }
            }
        }
        for &b in &fp.writes {
            for &dep in self.buckets.bucket(b).deps() {
                let kind = match self.arena.get(dep).access {
                    Access::Write => HazardKind::Waw,
                    Access::Read => HazardKind::War,
                };
                note(&mut found, dep, b, kind);
            }
        }
        found
    }

    /// Chooses how one conflict is satisfied and records the wait it needs.
    fn resolve_wait(
        &self,
        conflict: &Conflict,
        own_counter: Option<usize>,
        waits: &mut Waits,
    ) -> Resolution {
        let set = self.arena.get(conflict.dep);
        match set.class {
            CompletionClass::InOrder(_) => {
                let Some((counter, issue)) = set.issue else {
                    waits.drain = true;
                    return Resolution::Drain;
                };
                if conflict.kind == HazardKind::Waw && own_counter == Some(counter) {
                    return Resolution::Ordered;
                }
                let distance = self.counters.get(counter).wrapping_sub(issue);
                if self.target.encodes_distance() && distance <= self.target.max_distance {
                    waits.need_distance(counter, distance);
                    Resolution::Distance(distance)
                } else {
                    waits.drain = true;
                    Resolution::Drain
                }
            }
            CompletionClass::OutOfOrder(_) => match (set.token, conflict.kind) {
                (Some(t), HazardKind::War) => {
                    waits.need_token(t, false);
                    Resolution::Token(TokenField::Src(t))
                }
                (Some(t), _) => {
                    waits.need_token(t, true);
                    Resolution::Token(TokenField::Dst(t))
                }
                (None, HazardKind::War) => {
                    waits.all_rd = true;
                    Resolution::Drain
                }
                (None, _) => {
                    waits.drain = true;
                    Resolution::Drain
                }
            },
        }
    }

    /// Collapses per-counter distances into the single distance field.
    fn distance_field(&self, mins: &[Option<u32>]) -> Option<DistanceDep> {
        let mut hits = mins
            .iter()
            .enumerate()
            .filter_map(|(c, d)| d.map(|d| (c, d)));
        let (counter, first) = hits.next()?;
        let rest = hits.map(|(_, d)| d).min();
        Some(match (rest, self.target.distance_counters) {
            (None, DistanceCounters::PerPipe) => DistanceDep {
                pipe: DistPipe::Pipe(PipeId(counter as u8)),
                distance: first,
            },
            (rest, _) => DistanceDep {
                pipe: DistPipe::All,
                distance: rest.map_or(first, |r| r.min(first)),
            },
        })
    }

    /// Picks a token for an out-of-order producer, reclaiming the oldest one if the pool is exhausted.
    fn acquire_token(&mut self, at: InstLocation, pre: &mut Vec<SyncOp>) -> Option<TokenId> {
        if let Some(t) = self.tokens.find_free() {
            return Some(t);
        }
        let t = self.tokens.oldest_assigned()?;
        pre.push(SyncOp::Nop(Swsb::token(TokenField::Dst(t))));
        self.release_token(t);
        self.stats.token_reuse_stalls += 1;
        debug!(%at, token = %t, "token pool exhausted, reusing oldest token");
        Some(t)
    }

    /// Frees a token and clears its producer's footprints from the buckets.
    fn release_token(&mut self, token: TokenId) {
        if let Some((input, output)) = self.tokens.release(token) {
            for dep in [input, output].into_iter().flatten() {
                self.buckets.remove(&mut self.arena, dep);
            }
        }
    }

    /// Removes every out-of-order read set after a `sync.allrd`.
    fn clear_out_of_order_reads(&mut self) {
        let reads: Vec<DepId> = self
            .arena
            .live()
            .filter(|(_, s)| s.access == Access::Read && s.class.is_out_of_order())
            .map(|(id, _)| id)
            .collect();
        for dep in reads {
            self.buckets.remove(&mut self.arena, dep);
        }
        for t in 0..self.tokens.capacity() {
            let _ = self.tokens.clear_input(TokenId(t as u8));
        }
    }

    /// Records the footprint of an analyzed instruction.
    fn register(
        &mut self,
        index: usize,
        inst: &Instruction,
        class: CompletionClass,
        fp: Footprint,
        token: Option<TokenId>,
    ) {
        let exec = if inst.predicated {
            ExecTag::PredicatedMayNotExecute
        } else {
            ExecTag::Normal
        };
        if exec == ExecTag::Normal {
            for &b in &fp.writes {
                let _ = self.buckets.supersede(&mut self.arena, b, index);
            }
        }

        let Footprint { reads, writes } = fp;
        let output = (!writes.is_empty())
            .then(|| self.arena.alloc(DepSet::new(index, Access::Write, class, exec, writes)));
        let input = (class.is_out_of_order() && !reads.is_empty())
            .then(|| self.arena.alloc(DepSet::new(index, Access::Read, class, exec, reads)));

        if let Some(t) = token {
            for dep in [input, output].into_iter().flatten() {
                self.arena.get_mut(dep).token = Some(t);
            }
            self.tokens.assign(t, input, output);
            self.stats.token_assignments += 1;
        }

        let in_order = match class {
            CompletionClass::InOrder(pipe) => {
                let counter = self.target.counter_of(pipe);
                let issue = self.counters.advance(counter);
                if let Some(out) = output {
                    self.arena.get_mut(out).issue = Some((counter, issue));
                    self.tracker.push(counter, DistanceEntry { output: out, issue });
                }
                Some(counter)
            }
            CompletionClass::OutOfOrder(_) => None,
        };

        for dep in [input, output].into_iter().flatten() {
            self.buckets.insert(&mut self.arena, dep);
        }

        if let Some(counter) = in_order {
            let now = self.counters.get(counter);
            for entry in self.tracker.expire(counter, now, self.latencies[counter]) {
                self.buckets.remove(&mut self.arena, entry.output);
            }
        }
    }

    /// Waits for everything outstanding and resets all state.
    ///
    /// Returns `sync.allwr` if any write is live, `sync.allrd` if only
    /// out-of-order reads are live, or nothing.
    pub fn drain(&mut self, at: InstLocation) -> Option<SyncOp> {
        let mut live_write = false;
        let mut live_read = false;
        for (_, set) in self.arena.live() {
            match set.access {
                Access::Write => live_write = true,
                Access::Read => live_read = true,
            }
        }
        let op = if live_write {
            Some(SyncOp::AllWr)
        } else if live_read {
            Some(SyncOp::AllRd)
        } else {
            None
        };
        if let Some(op) = op {
            self.stats.drains += 1;
            debug!(%at, sync = %op, "drain");
        }
        self.reset();
        op
    }

    /// Clears the bucket table, token pool, distance tracker, arena and counters.
    pub fn reset(&mut self) {
        self.buckets.clear();
        self.arena.clear();
        self.tokens.reset();
        self.tracker.clear();
        self.counters.reset();
    }
}
