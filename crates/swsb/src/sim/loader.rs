//! Kernel and target-model loading.
//!
//! Both are plain JSON documents: a [`Kernel`] serialized with serde, and a
//! [`TargetModel`] whose every field is optional. Target models are validated
//! on load so a bad descriptor is reported before any pass runs.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::common::LoadError;
use crate::config::TargetModel;
use crate::ir::Kernel;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Loads a kernel from a JSON file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read and [`LoadError::Json`] if it
/// does not describe a kernel.
pub fn load_kernel(path: impl AsRef<Path>) -> Result<Kernel, LoadError> {
    read_json(path.as_ref())
}

/// Loads and validates a target model from a JSON file.
///
/// # Errors
///
/// Returns [`LoadError::Io`], [`LoadError::Json`], or [`LoadError::Target`] if the
/// model fails validation.
pub fn load_target(path: impl AsRef<Path>) -> Result<TargetModel, LoadError> {
    let target: TargetModel = read_json(path.as_ref())?;
    target.validate()?;
    Ok(target)
}

/// Parses a kernel from a JSON string.
///
/// # Errors
///
/// Returns [`LoadError::Json`] if the text does not describe a kernel.
pub fn parse_kernel(text: &str) -> Result<Kernel, LoadError> {
    Ok(serde_json::from_str(text)?)
}
