//! Common types shared across the pass.
//!
//! This module provides:
//! 1. **Identifiers:** Typed indices for pipes, tokens, buckets and dependency sets.
//! 2. **Errors:** The pass's fatal error type and the loader error type.

/// Pass and loader error definitions.
pub mod error;
/// Typed indices.
pub mod ids;

pub use error::{InstLocation, LoadError, SwsbError};
pub use ids::{BucketIdx, DepId, PipeId, TokenId};
