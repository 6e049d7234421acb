//! Dependency sets and the arena that owns them.
//!
//! A dependency set may be referenced from many buckets at once and retired
//! from some of them before others, so buckets store [`DepId`]s into this
//! arena instead of references. Each set keeps a count of the buckets still
//! holding it; a set with no bucket reference is retired.

use crate::common::{BucketIdx, DepId, TokenId};
use crate::ir::CompletionClass;

/// Which half of an instruction's footprint a set describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    /// Source operands.
    Read,
    /// Destination operands.
    Write,
}

/// Whether the owning instruction is guaranteed to execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExecTag {
    /// Always executes.
    #[default]
    Normal,
    /// Guarded by a predicate; may be shot down.
    PredicatedMayNotExecute,
}

/// One instruction's footprint for one access kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepSet {
    /// Index of the owning instruction within its block.
    pub inst: usize,
    /// Read or write footprint.
    pub access: Access,
    /// Completion class of the owner.
    pub class: CompletionClass,
    /// Distance counter and issue id of an in-order owner.
    pub issue: Option<(usize, u32)>,
    /// Token of an out-of-order owner.
    pub token: Option<TokenId>,
    /// Predication tag of the owner.
    pub exec: ExecTag,
    /// Buckets touched, sorted.
    pub buckets: Vec<BucketIdx>,
    live_refs: u32,
}

impl DepSet {
    /// Creates a set that is not yet registered in any bucket.
    pub const fn new(
        inst: usize,
        access: Access,
        class: CompletionClass,
        exec: ExecTag,
        buckets: Vec<BucketIdx>,
    ) -> Self {
        Self {
            inst,
            access,
            class,
            issue: None,
            token: None,
            exec,
            buckets,
            live_refs: 0,
        }
    }

    /// Number of buckets currently holding this set.
    pub const fn live_refs(&self) -> u32 {
        self.live_refs
    }

    /// Whether any bucket still holds this set.
    pub const fn is_live(&self) -> bool {
        self.live_refs > 0
    }

    pub(crate) fn retain(&mut self) {
        self.live_refs += 1;
    }

    pub(crate) fn release(&mut self) {
        self.live_refs = self.live_refs.saturating_sub(1);
    }
}

/// Arena of dependency sets for the block being analyzed.
#[derive(Debug, Default)]
pub struct DepArena {
    sets: Vec<DepSet>,
}

impl DepArena {
    /// Creates an empty arena.
    pub const fn new() -> Self {
        Self { sets: Vec::new() }
    }

    /// Stores a set and returns its id.
    pub fn alloc(&mut self, set: DepSet) -> DepId {
        let id = DepId(self.sets.len() as u32);
        self.sets.push(set);
        id
    }

    /// Looks up a set.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated since the last [`DepArena::clear`].
    pub fn get(&self, id: DepId) -> &DepSet {
        &self.sets[id.index()]
    }

    /// Mutable lookup.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated since the last [`DepArena::clear`].
    pub fn get_mut(&mut self, id: DepId) -> &mut DepSet {
        &mut self.sets[id.index()]
    }

    /// Iterates over the sets still referenced by at least one bucket.
    pub fn live(&self) -> impl Iterator<Item = (DepId, &DepSet)> {
        self.sets
            .iter()
            .enumerate()
            .filter(|(_, set)| set.is_live())
            .map(|(i, set)| (DepId(i as u32), set))
    }

    /// Number of sets allocated since the last clear.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether nothing was allocated since the last clear.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Drops every set. Outstanding ids become invalid.
    pub fn clear(&mut self) {
        self.sets.clear();
    }
}
