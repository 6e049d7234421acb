//! Hazard simulator: replays an annotated kernel and reports ordering violations.
//!
//! The simulator models the hardware contract the pass relies on:
//! 1. **Issue:** Instructions issue in program order, at least one time step apart,
//!    delayed by their distance, token, `sync.allrd` and `sync.allwr` waits.
//! 2. **In-order completion:** Sources are read at issue; results land `latency` steps
//!    after issue, where `latency` is the latency of the instruction's distance counter.
//! 3. **Out-of-order completion:** Sources are read and results written after delays
//!    chosen by a [`CompletionModel`].
//! 4. **Predication:** A predicated instruction may be skipped; a skipped instruction has
//!    no effects, enforces none of its waits and releases its token at issue. It still
//!    passes through its in-order pipe, so later distance waits count it.
//!
//! Every register access is logged per bucket and checked afterwards for RAW, WAR and
//! WAW ordering against program order.

use std::collections::VecDeque;
use std::fmt;

use crate::common::{BucketIdx, InstLocation, SwsbError, TokenId};
use crate::config::{MAX_TOKENS, TargetModel};
use crate::ir::{
    CompletionClass, DistPipe, DistanceDep, InstKind, Instruction, Kernel, SyncOp, TokenField,
};
use crate::pass::footprint::{self, BucketLayout};

/// Delays of one out-of-order instruction, in time steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OooDelays {
    /// From issue until sources have been read.
    pub read: u64,
    /// From the source read until results are written; at least 1.
    pub write: u64,
}

impl Default for OooDelays {
    fn default() -> Self {
        Self { read: 1, write: 4 }
    }
}

/// Chooses predicate outcomes and out-of-order delays.
pub trait CompletionModel {
    /// Whether a predicated instruction executes.
    fn executes(&mut self, at: InstLocation, inst: &Instruction) -> bool;

    /// Delays of an executed out-of-order instruction.
    fn delays(&mut self, at: InstLocation, inst: &Instruction) -> OooDelays;
}

/// Same delays and predicate outcome for every instruction.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedCompletion {
    delays: OooDelays,
    skip_predicated: bool,
}

impl FixedCompletion {
    /// Every out-of-order instruction reads after `read` and writes `write` steps later.
    pub const fn new(read: u64, write: u64) -> Self {
        Self {
            delays: OooDelays { read, write },
            skip_predicated: false,
        }
    }

    /// Skips every predicated instruction.
    #[must_use]
    pub const fn skipping_predicated(mut self) -> Self {
        self.skip_predicated = true;
        self
    }
}

impl CompletionModel for FixedCompletion {
    fn executes(&mut self, _at: InstLocation, _inst: &Instruction) -> bool {
        !self.skip_predicated
    }

    fn delays(&mut self, _at: InstLocation, _inst: &Instruction) -> OooDelays {
        self.delays
    }
}

/// Predicate outcomes and delays consumed in program order, then a fixed fallback.
#[derive(Clone, Debug, Default)]
pub struct ScriptedCompletion {
    outcomes: VecDeque<bool>,
    delays: VecDeque<OooDelays>,
    fallback: FixedCompletion,
}

impl ScriptedCompletion {
    /// Creates a script. `outcomes` is consumed by predicated instructions,
    /// `delays` by executed out-of-order instructions.
    pub fn new(
        outcomes: impl IntoIterator<Item = bool>,
        delays: impl IntoIterator<Item = OooDelays>,
    ) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            delays: delays.into_iter().collect(),
            fallback: FixedCompletion::default(),
        }
    }

    /// Model used once the script runs out.
    #[must_use]
    pub const fn with_fallback(mut self, fallback: FixedCompletion) -> Self {
        self.fallback = fallback;
        self
    }
}

impl CompletionModel for ScriptedCompletion {
    fn executes(&mut self, at: InstLocation, inst: &Instruction) -> bool {
        match self.outcomes.pop_front() {
            Some(taken) => taken,
            None => self.fallback.executes(at, inst),
        }
    }

    fn delays(&mut self, at: InstLocation, inst: &Instruction) -> OooDelays {
        match self.delays.pop_front() {
            Some(d) => d,
            None => self.fallback.delays(at, inst),
        }
    }
}

/// Kind of ordering violation observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// A read observed a value older than its program-order producer.
    Raw,
    /// A later write landed before an earlier read.
    War,
    /// Two writes landed out of program order.
    Waw,
    /// A token was set again while its previous producer was still running.
    TokenReusedWhileLive,
}

/// One observed violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Kind of violation.
    pub kind: ViolationKind,
    /// Earlier instruction in program order.
    pub first: InstLocation,
    /// Later instruction in program order.
    pub second: InstLocation,
    /// Bucket involved, for register hazards.
    pub bucket: Option<BucketIdx>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {} vs {}", self.kind, self.first, self.second)?;
        if let Some(b) = self.bucket {
            write!(f, " on {b}")?;
        }
        Ok(())
    }
}

/// Outcome of one simulated execution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimReport {
    /// Violations in the order they were found.
    pub violations: Vec<Violation>,
    /// Instructions issued, including skipped ones.
    pub issued: usize,
    /// Predicated instructions that were skipped.
    pub skipped: usize,
    /// Time at which the last result landed.
    pub makespan: u64,
}

impl SimReport {
    /// Whether the execution was hazard free.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
struct Issued {
    at: InstLocation,
    executed: bool,
    out_of_order: bool,
    read_time: u64,
    complete: u64,
}

#[derive(Clone, Copy, Debug)]
struct Access {
    seq: usize,
    time: u64,
    write: bool,
}

/// Replays annotated kernels against a target model.
#[derive(Debug)]
pub struct HazardSimulator<'t> {
    target: &'t TargetModel,
    layout: BucketLayout,
}

impl<'t> HazardSimulator<'t> {
    /// Creates a simulator for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SwsbError::InvalidTarget`] if the target model fails validation.
    pub fn new(target: &'t TargetModel) -> Result<Self, SwsbError> {
        target.validate()?;
        Ok(Self {
            target,
            layout: BucketLayout::new(&target.register_file),
        })
    }

    /// Executes `kernel` once under `model`.
    ///
    /// # Errors
    ///
    /// Returns [`SwsbError::UnresolvableOperand`] for operands outside the register file
    /// and [`SwsbError::UnknownCompletionClass`] for pipes missing from the latency table.
    pub fn run(
        &self,
        kernel: &Kernel,
        model: &mut dyn CompletionModel,
    ) -> Result<SimReport, SwsbError> {
        let mut report = SimReport::default();
        let mut issued: Vec<Issued> = Vec::with_capacity(kernel.len());
        let mut history: Vec<Vec<usize>> = vec![Vec::new(); self.target.counter_count()];
        let mut holders: Vec<Option<usize>> = vec![None; MAX_TOKENS as usize];
        let mut accesses: Vec<Vec<Access>> = vec![Vec::new(); self.layout.total() as usize];
        let mut last_issue: Option<u64> = None;

        for (b, block) in kernel.blocks.iter().enumerate() {
            for (i, inst) in block.insts.iter().enumerate() {
                let at = InstLocation { block: b, inst: i };
                let fp = footprint::footprint(&self.layout, inst, at)?;
                if let Some(CompletionClass::InOrder(pipe)) = inst.class {
                    if self.target.pipe(pipe).is_none() {
                        return Err(SwsbError::UnknownCompletionClass {
                            at,
                            mnemonic: inst.mnemonic.clone(),
                            reason: format!("{pipe} is not in the latency table"),
                        });
                    }
                }
                let executed = !inst.predicated || model.executes(at, inst);
                let mut t = last_issue.map_or(0, |l| l + 1);

                if executed {
                    if let Some(dep) = inst.swsb.distance {
                        t = t.max(self.distance_ready(dep, &history, &issued));
                    }
                    match inst.swsb.token {
                        Some(TokenField::Src(tk)) => {
                            t = t.max(holder(&holders, &issued, tk).map_or(0, |h| h.read_time));
                        }
                        Some(TokenField::Dst(tk)) => {
                            t = t.max(holder(&holders, &issued, tk).map_or(0, |h| h.complete));
                        }
                        Some(TokenField::Set(_)) | None => {}
                    }
                    match inst.kind {
                        InstKind::Sync(SyncOp::AllRd) => {
                            let ready = issued
                                .iter()
                                .filter(|p| p.out_of_order)
                                .map(|p| p.read_time)
                                .max();
                            t = t.max(ready.unwrap_or(0));
                        }
                        InstKind::Sync(SyncOp::AllWr) => {
                            t = t.max(issued.iter().map(|p| p.complete).max().unwrap_or(0));
                        }
                        _ => {}
                    }
                }
                last_issue = Some(t);

                let seq = issued.len();
                let (out_of_order, read_time, write_time, complete) = match inst.class {
                    Some(CompletionClass::InOrder(pipe)) => {
                        let counter = self.target.counter_of(pipe);
                        history[counter].push(seq);
                        let done = t + u64::from(self.target.counter_latency(counter));
                        (false, t, done, done)
                    }
                    Some(CompletionClass::OutOfOrder(_)) if executed => {
                        let d = model.delays(at, inst);
                        let read = t + d.read;
                        let write = read + d.write.max(1);
                        let done = if fp.writes.is_empty() { read } else { write };
                        (true, read, write, done)
                    }
                    Some(CompletionClass::OutOfOrder(_)) => (true, t, t, t),
                    None => (false, t, t, t),
                };

                if let Some(TokenField::Set(tk)) = inst.swsb.token {
                    if let Some(prev) = holder(&holders, &issued, tk) {
                        if prev.complete > t {
                            report.violations.push(Violation {
                                kind: ViolationKind::TokenReusedWhileLive,
                                first: prev.at,
                                second: at,
                                bucket: None,
                            });
                        }
                    }
                    if let Some(slot) = holders.get_mut(tk.index()) {
                        *slot = Some(seq);
                    }
                }

                if executed {
                    for &bkt in &fp.reads {
                        accesses[bkt.index()].push(Access { seq, time: read_time, write: false });
                    }
                    for &bkt in &fp.writes {
                        accesses[bkt.index()].push(Access { seq, time: write_time, write: true });
                    }
                } else {
                    report.skipped += 1;
                }

                report.makespan = report.makespan.max(complete);
                issued.push(Issued {
                    at,
                    executed,
                    out_of_order,
                    read_time,
                    complete,
                });
            }
        }

        report.issued = issued.len();
        for (bkt, log) in accesses.iter().enumerate() {
            check_bucket(BucketIdx(bkt as u32), log, &issued, &mut report.violations);
        }
        Ok(report)
    }

    /// Time at which a distance wait is satisfied.
    fn distance_ready(&self, dep: DistanceDep, history: &[Vec<usize>], issued: &[Issued]) -> u64 {
        let n = dep.distance as usize;
        if n == 0 {
            return 0;
        }
        let ready = |counter: usize| {
            let lane = &history[counter];
            lane.len()
                .checked_sub(n)
                .map_or(0, |idx| issued[lane[idx]].complete)
        };
        match dep.pipe {
            DistPipe::Pipe(p) => ready(self.target.counter_of(p)),
            DistPipe::All => (0..history.len()).map(ready).max().unwrap_or(0),
        }
    }
}

/// Current executed holder of a token; skipped holders released it at issue.
fn holder<'a>(
    holders: &[Option<usize>],
    issued: &'a [Issued],
    token: TokenId,
) -> Option<&'a Issued> {
    holders
        .get(token.index())
        .copied()
        .flatten()
        .map(|seq| &issued[seq])
        .filter(|h| h.executed)
}

fn check_bucket(bucket: BucketIdx, log: &[Access], issued: &[Issued], out: &mut Vec<Violation>) {
    let mut violation = |kind, first: usize, second: usize| {
        out.push(Violation {
            kind,
            first: issued[first].at,
            second: issued[second].at,
            bucket: Some(bucket),
        });
    };

    let writes: Vec<&Access> = log.iter().filter(|a| a.write).collect();
    for pair in writes.windows(2) {
        if pair[1].time <= pair[0].time {
            violation(ViolationKind::Waw, pair[0].seq, pair[1].seq);
        }
    }

    for read in log.iter().filter(|a| !a.write) {
        if let Some(producer) = writes.iter().rev().find(|w| w.seq < read.seq) {
            if producer.time > read.time {
                violation(ViolationKind::Raw, producer.seq, read.seq);
            }
        }
        if let Some(clobber) = writes
            .iter()
            .find(|w| w.seq > read.seq && w.time <= read.time)
        {
            violation(ViolationKind::War, read.seq, clobber.seq);
        }
    }
}
