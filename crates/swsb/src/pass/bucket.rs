//! Bucket table for register dependency tracking.
//!
//! Maps each register-file storage unit to the dependency sets that touched it
//! and are not yet proven complete. Lists stay short (one or two entries most
//! of the time) because an unpredicated write supersedes everything it
//! synchronized with.

use crate::common::{BucketIdx, DepId};
use crate::pass::deps::DepArena;

/// Live dependency sets of one storage unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bucket {
    deps: Vec<DepId>,
}

impl Bucket {
    fn new() -> Self {
        Self {
            deps: Vec::with_capacity(4),
        }
    }

    /// Live sets in registration order.
    pub fn deps(&self) -> &[DepId] {
        &self.deps
    }

    /// Whether no set is live in this bucket.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Number of live sets.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    fn add(&mut self, dep: DepId) -> bool {
        if self.deps.contains(&dep) {
            return false;
        }
        self.deps.push(dep);
        true
    }

    fn remove(&mut self, dep: DepId) -> bool {
        match self.deps.iter().position(|&d| d == dep) {
            Some(pos) => {
                let _ = self.deps.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// One bucket per storage unit of the target's register file.
#[derive(Clone, Debug)]
pub struct BucketTable {
    buckets: Vec<Bucket>,
}

impl BucketTable {
    /// Creates a table with `total` empty buckets.
    pub fn new(total: u32) -> Self {
        Self {
            buckets: (0..total).map(|_| Bucket::new()).collect(),
        }
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns one bucket.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is outside the table; footprints are validated against
    /// the same layout, so this indicates a layout mismatch.
    pub fn bucket(&self, idx: BucketIdx) -> &Bucket {
        &self.buckets[idx.index()]
    }

    /// Registers `dep` in every bucket of its footprint.
    pub fn insert(&mut self, arena: &mut DepArena, dep: DepId) {
        let mut added = 0;
        for &b in &arena.get(dep).buckets {
            if self.buckets[b.index()].add(dep) {
                added += 1;
            }
        }
        let set = arena.get_mut(dep);
        for _ in 0..added {
            set.retain();
        }
    }

    /// Removes `dep` from every bucket still holding it.
    pub fn remove(&mut self, arena: &mut DepArena, dep: DepId) {
        let mut removed = 0;
        for &b in &arena.get(dep).buckets {
            if self.buckets[b.index()].remove(dep) {
                removed += 1;
            }
        }
        let set = arena.get_mut(dep);
        for _ in 0..removed {
            set.release();
        }
    }

    /// Removes every set of another instruction from bucket `idx`.
    ///
    /// Called when instruction `owner` overwrites the unit after synchronizing
    /// with everything live in it: the unit's prior value is dead.
    pub fn supersede(&mut self, arena: &mut DepArena, idx: BucketIdx, owner: usize) -> usize {
        let bucket = &mut self.buckets[idx.index()];
        let before = bucket.deps.len();
        bucket.deps.retain(|&dep| {
            let set = arena.get_mut(dep);
            if set.inst == owner {
                true
            } else {
                set.release();
                false
            }
        });
        before - bucket.deps.len()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Bucket::is_empty)
    }

    /// Number of buckets holding at least one set.
    pub fn occupied(&self) -> usize {
        self.buckets.iter().filter(|b| !b.is_empty()).count()
    }

    /// Empties every bucket.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.deps.clear();
        }
    }
}
