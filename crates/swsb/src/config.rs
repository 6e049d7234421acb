//! Target model descriptor for the SWSB pass.
//!
//! This module defines every hardware parameter the pass depends on. It provides:
//! 1. **Defaults:** Baseline constants (token pool size, distance range, pipe latencies, register file).
//! 2. **Structures:** The `TargetModel` root, the pipe latency table and the register-file layout.
//! 3. **Enums:** Encoding mode and distance counter layout.
//!
//! Target models are supplied as JSON by the driver, or use `TargetModel::default()`.

use serde::Deserialize;

use crate::common::{PipeId, SwsbError};

/// Default configuration constants for the target model.
///
/// These values describe the baseline target when a field is not
/// explicitly overridden in the JSON descriptor.
mod defaults {
    /// Number of synchronization tokens (SBIDs) available to out-of-order units.
    pub const TOKEN_COUNT: u32 = 16;

    /// Largest distance the SWSB field can encode.
    pub const MAX_DISTANCE: u32 = 7;

    /// Latency of every in-order pipe, in in-order instructions issued on that pipe.
    pub const IN_ORDER_LATENCY: u32 = 10;

    /// Number of general register file rows.
    pub const GRF_COUNT: u32 = 128;

    /// Size of one GRF row in bytes.
    pub const GRF_BYTES: u32 = 32;

    /// Number of accumulator rows (each one GRF row wide).
    pub const ACC_COUNT: u32 = 8;

    /// Number of flag registers.
    pub const FLAG_COUNT: u32 = 2;

    /// Size of one flag register in bytes.
    pub const FLAG_BYTES: u32 = 4;

    /// Number of address registers.
    pub const ADDR_COUNT: u32 = 1;

    /// Size of one address register in bytes.
    pub const ADDR_BYTES: u32 = 32;
}

/// Largest token pool the token field can address.
pub const MAX_TOKENS: u32 = 32;

/// Largest bucket table a register-file model may describe.
pub const MAX_BUCKETS: u32 = 1 << 16;

/// How synchronization can be encoded on an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EncodeMode {
    /// Only distances; out-of-order producers are synchronized with `sync.allrd`/`sync.allwr`.
    DistanceOnly,
    /// Only tokens; in-order hazards are resolved by draining.
    TokenOnly,
    /// Distances and tokens.
    #[default]
    Hybrid,
}

/// Layout of the in-order instruction counters that distances are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DistanceCounters {
    /// One counter per in-order pipe; each pipe completes in order independently.
    #[default]
    PerPipe,
    /// A single counter shared by every in-order pipe.
    #[serde(alias = "Single")]
    Shared,
}

/// One in-order pipe of the latency table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipeModel {
    /// Display name (`int`, `float`, ...).
    pub name: String,
    /// Number of in-order instructions on this pipe after which a result is guaranteed visible.
    #[serde(default = "PipeModel::default_latency")]
    pub latency: u32,
}

impl PipeModel {
    /// Returns the default in-order latency.
    fn default_latency() -> u32 {
        defaults::IN_ORDER_LATENCY
    }

    /// Creates a pipe with the given name and latency.
    pub fn new(name: &str, latency: u32) -> Self {
        Self {
            name: name.to_owned(),
            latency,
        }
    }
}

/// Register-file layout used to derive the bucket table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterFileModel {
    /// Number of GRF rows.
    #[serde(default = "RegisterFileModel::default_grf_count")]
    pub grf_count: u32,
    /// Bytes per GRF row (also the accumulator row size).
    #[serde(default = "RegisterFileModel::default_grf_bytes")]
    pub grf_bytes: u32,
    /// Number of accumulator rows.
    #[serde(default = "RegisterFileModel::default_acc_count")]
    pub acc_count: u32,
    /// Number of flag registers.
    #[serde(default = "RegisterFileModel::default_flag_count")]
    pub flag_count: u32,
    /// Bytes per flag register.
    #[serde(default = "RegisterFileModel::default_flag_bytes")]
    pub flag_bytes: u32,
    /// Number of address registers.
    #[serde(default = "RegisterFileModel::default_addr_count")]
    pub addr_count: u32,
    /// Bytes per address register.
    #[serde(default = "RegisterFileModel::default_addr_bytes")]
    pub addr_bytes: u32,
}

impl RegisterFileModel {
    fn default_grf_count() -> u32 {
        defaults::GRF_COUNT
    }

    fn default_grf_bytes() -> u32 {
        defaults::GRF_BYTES
    }

    fn default_acc_count() -> u32 {
        defaults::ACC_COUNT
    }

    fn default_flag_count() -> u32 {
        defaults::FLAG_COUNT
    }

    fn default_flag_bytes() -> u32 {
        defaults::FLAG_BYTES
    }

    fn default_addr_count() -> u32 {
        defaults::ADDR_COUNT
    }

    fn default_addr_bytes() -> u32 {
        defaults::ADDR_BYTES
    }

    /// Total number of buckets: one per GRF row, accumulator row, flag and address register.
    ///
    /// Saturates at `u32::MAX`; validation rejects anything above [`MAX_BUCKETS`].
    pub const fn total_buckets(&self) -> u32 {
        self.grf_count
            .saturating_add(self.acc_count)
            .saturating_add(self.flag_count)
            .saturating_add(self.addr_count)
    }
}

impl Default for RegisterFileModel {
    fn default() -> Self {
        Self {
            grf_count: defaults::GRF_COUNT,
            grf_bytes: defaults::GRF_BYTES,
            acc_count: defaults::ACC_COUNT,
            flag_count: defaults::FLAG_COUNT,
            flag_bytes: defaults::FLAG_BYTES,
            addr_count: defaults::ADDR_COUNT,
            addr_bytes: defaults::ADDR_BYTES,
        }
    }
}

/// Root target model consumed by the pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetModel {
    /// Which synchronization fields the encoding offers.
    #[serde(default)]
    pub encode_mode: EncodeMode,
    /// Distance counter layout.
    #[serde(default)]
    pub distance_counters: DistanceCounters,
    /// Size of the token pool.
    #[serde(default = "TargetModel::default_token_count")]
    pub token_count: u32,
    /// Largest encodable distance.
    #[serde(default = "TargetModel::default_max_distance")]
    pub max_distance: u32,
    /// Whether one instruction may carry both a distance and a token wait.
    #[serde(default)]
    pub allow_distance_with_token_wait: bool,
    /// In-order pipe latency table, indexed by [`PipeId`].
    #[serde(default = "TargetModel::default_pipes")]
    pub pipes: Vec<PipeModel>,
    /// Register-file layout.
    #[serde(default)]
    pub register_file: RegisterFileModel,
}

impl TargetModel {
    fn default_token_count() -> u32 {
        defaults::TOKEN_COUNT
    }

    fn default_max_distance() -> u32 {
        defaults::MAX_DISTANCE
    }

    fn default_pipes() -> Vec<PipeModel> {
        vec![
            PipeModel::new("int", defaults::IN_ORDER_LATENCY),
            PipeModel::new("float", defaults::IN_ORDER_LATENCY),
            PipeModel::new("long", defaults::IN_ORDER_LATENCY),
        ]
    }

    /// Checks the model for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SwsbError::InvalidTarget`] describing the first inconsistency found.
    pub fn validate(&self) -> Result<(), SwsbError> {
        if self.pipes.is_empty() {
            return Err(SwsbError::InvalidTarget("no in-order pipes defined".into()));
        }
        if self.pipes.len() > usize::from(u8::MAX) {
            return Err(SwsbError::InvalidTarget(format!(
                "{} pipes exceed the pipe id range",
                self.pipes.len()
            )));
        }
        if let Some(pipe) = self.pipes.iter().find(|p| p.latency == 0) {
            return Err(SwsbError::InvalidTarget(format!(
                "pipe '{}' has zero latency",
                pipe.name
            )));
        }
        if self.token_count > MAX_TOKENS {
            return Err(SwsbError::InvalidTarget(format!(
                "token count {} exceeds the maximum of {MAX_TOKENS}",
                self.token_count
            )));
        }
        if self.encode_mode == EncodeMode::TokenOnly && self.token_count == 0 {
            return Err(SwsbError::InvalidTarget(
                "token-only encoding needs at least one token".into(),
            ));
        }
        if self.encode_mode != EncodeMode::TokenOnly && self.max_distance == 0 {
            return Err(SwsbError::InvalidTarget(
                "distance encoding needs a max distance of at least 1".into(),
            ));
        }
        let rf = &self.register_file;
        if rf.grf_count == 0 || rf.grf_bytes == 0 {
            return Err(SwsbError::InvalidTarget("empty general register file".into()));
        }
        if rf.total_buckets() > MAX_BUCKETS {
            return Err(SwsbError::InvalidTarget(format!(
                "register file needs {} buckets, more than the maximum of {MAX_BUCKETS}",
                rf.total_buckets()
            )));
        }
        if (rf.flag_count > 0 && rf.flag_bytes == 0) || (rf.addr_count > 0 && rf.addr_bytes == 0) {
            return Err(SwsbError::InvalidTarget(
                "special register file with zero-sized registers".into(),
            ));
        }
        Ok(())
    }

    /// Whether instructions can carry a distance field.
    pub fn encodes_distance(&self) -> bool {
        self.encode_mode != EncodeMode::TokenOnly
    }

    /// Number of tokens the pass may hand out.
    pub fn effective_token_count(&self) -> u32 {
        match self.encode_mode {
            EncodeMode::DistanceOnly => 0,
            EncodeMode::TokenOnly | EncodeMode::Hybrid => self.token_count,
        }
    }

    /// Number of independent distance counters.
    pub fn counter_count(&self) -> usize {
        match self.distance_counters {
            DistanceCounters::PerPipe => self.pipes.len(),
            DistanceCounters::Shared => 1,
        }
    }

    /// Maps a pipe to the counter its instructions advance.
    pub fn counter_of(&self, pipe: PipeId) -> usize {
        match self.distance_counters {
            DistanceCounters::PerPipe => pipe.index(),
            DistanceCounters::Shared => 0,
        }
    }

    /// Latency associated with a counter.
    ///
    /// A shared counter completes in order only at the pace of its slowest pipe.
    pub fn counter_latency(&self, counter: usize) -> u32 {
        match self.distance_counters {
            DistanceCounters::PerPipe => self.pipes.get(counter).map_or(0, |p| p.latency),
            DistanceCounters::Shared => self.pipes.iter().map(|p| p.latency).max().unwrap_or(0),
        }
    }

    /// Looks up a pipe of the latency table.
    pub fn pipe(&self, pipe: PipeId) -> Option<&PipeModel> {
        self.pipes.get(pipe.index())
    }

    /// Total number of buckets in the bucket table.
    pub fn total_buckets(&self) -> u32 {
        self.register_file.total_buckets()
    }
}

impl Default for TargetModel {
    fn default() -> Self {
        Self {
            encode_mode: EncodeMode::default(),
            distance_counters: DistanceCounters::default(),
            token_count: defaults::TOKEN_COUNT,
            max_distance: defaults::MAX_DISTANCE,
            allow_distance_with_token_wait: false,
            pipes: Self::default_pipes(),
            register_file: RegisterFileModel::default(),
        }
    }
}
