//! Software scoreboard annotations carried by instructions.
//!
//! An instruction carries at most one distance field and one token field.
//! Standalone synchronization instructions (`sync.nop`, `sync.allrd`,
//! `sync.allwr`) carry the waits that do not fit on an existing instruction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{PipeId, TokenId};

/// Counter a distance is measured against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistPipe {
    /// The counter of one in-order pipe.
    Pipe(PipeId),
    /// Every counter at once (several pipes collapsed, or a shared counter).
    All,
}

/// Wait until the in-order instruction `distance` positions back on `pipe` has completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistanceDep {
    /// Counter the distance refers to.
    pub pipe: DistPipe,
    /// Number of in-order instructions back on that counter.
    pub distance: u32,
}

impl fmt::Display for DistanceDep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pipe {
            DistPipe::Pipe(p) => write!(f, "P{}@{}", p.0, self.distance),
            DistPipe::All => write!(f, "A@{}", self.distance),
        }
    }
}

/// Use of the token field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenField {
    /// The instruction is an out-of-order producer and signals this token.
    Set(TokenId),
    /// Wait until the token's producer has read its sources.
    Src(TokenId),
    /// Wait until the token's producer has completed.
    Dst(TokenId),
}

impl TokenField {
    /// The token referenced by the field.
    pub const fn token(self) -> TokenId {
        match self {
            Self::Set(t) | Self::Src(t) | Self::Dst(t) => t,
        }
    }

    /// Whether the field is a wait rather than a set.
    pub const fn is_wait(self) -> bool {
        !matches!(self, Self::Set(_))
    }
}

impl fmt::Display for TokenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(t) => write!(f, "{t}"),
            Self::Src(t) => write!(f, "{t}.src"),
            Self::Dst(t) => write!(f, "{t}.dst"),
        }
    }
}

/// SWSB annotation of one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Swsb {
    /// Distance field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<DistanceDep>,
    /// Token field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenField>,
}

impl Swsb {
    /// Annotation carrying only a distance.
    pub const fn distance(dep: DistanceDep) -> Self {
        Self {
            distance: Some(dep),
            token: None,
        }
    }

    /// Annotation carrying only a token field.
    pub const fn token(field: TokenField) -> Self {
        Self {
            distance: None,
            token: Some(field),
        }
    }

    /// Whether no field is set.
    pub const fn is_empty(&self) -> bool {
        self.distance.is_none() && self.token.is_none()
    }
}

impl fmt::Display for Swsb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.distance, self.token) {
            (None, None) => Ok(()),
            (Some(d), None) => write!(f, "{{{d}}}"),
            (None, Some(t)) => write!(f, "{{{t}}}"),
            (Some(d), Some(t)) => write!(f, "{{{d} {t}}}"),
        }
    }
}

/// A standalone synchronization instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOp {
    /// `sync.nop` carrying a distance or token wait.
    Nop(Swsb),
    /// Wait for every outstanding out-of-order source read.
    AllRd,
    /// Wait for every outstanding write, in-order and out-of-order.
    AllWr,
}

impl SyncOp {
    /// Mnemonic used in listings.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop(_) => "sync.nop",
            Self::AllRd => "sync.allrd",
            Self::AllWr => "sync.allwr",
        }
    }
}

impl fmt::Display for SyncOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nop(swsb) => write!(f, "sync.nop {swsb}"),
            Self::AllRd | Self::AllWr => f.write_str(self.mnemonic()),
        }
    }
}
