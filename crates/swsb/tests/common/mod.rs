//! Shared builders and harness.

pub mod builder;
