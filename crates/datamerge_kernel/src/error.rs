//! Merge errors
//!
//! Only problems that stop a merge before any copy is made are errors.
//! Failed property edits are collected in the outcome instead.

use datamerge_scene::SceneError;
use thiserror::Error;

/// A merge that could not run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    #[error("Invalid selection: {reason}")]
    InvalidSelection { reason: String },

    #[error("Document error: {0}")]
    Scene(#[from] SceneError),
}

impl MergeError {
    pub fn invalid_selection(reason: impl Into<String>) -> Self {
        Self::InvalidSelection { reason: reason.into() }
    }
}

pub type MergeResult<T> = Result<T, MergeError>;
