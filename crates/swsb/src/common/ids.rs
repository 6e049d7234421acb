//! Strongly typed indices.
//!
//! Every table in the pass is indexed by a newtype so a bucket index can never be
//! passed where a token or dependency id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of an in-order pipe in the target model's latency table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipeId(pub u8);

impl PipeId {
    /// Returns the pipe as a table index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipe{}", self.0)
    }
}

/// Synchronization token (SBID) handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u8);

impl TokenId {
    /// Returns the token as a pool index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Index of a bucket in the flattened bucket table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketIdx(pub u32);

impl BucketIdx {
    /// Returns the bucket as a table index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BucketIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// Stable id of a dependency set in the analyzer's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepId(pub u32);

impl DepId {
    /// Returns the id as an arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
