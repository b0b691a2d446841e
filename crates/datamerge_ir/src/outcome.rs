//! Per-edit failures and the merge result

use crate::update::PropertyUpdate;
use datamerge_scene::NodeId;
use thiserror::Error;

/// Why a single property edit failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureReason {
    #[error("unknown property \"{0}\"")]
    UnknownProperty(String),

    #[error("image fetch failed: {0}")]
    ImageFetch(String),

    #[error("not a supported image: {0}")]
    InvalidImage(String),

    #[error("font load failed: {0}")]
    FontLoad(String),

    #[error("element is gone")]
    ElementGone,

    #[error("{0}")]
    Host(String),
}

/// Outcome of one property edit
pub type UpdateResult = Result<(), FailureReason>;

/// A reported failure for one element and property
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{element_name}.{property}: {reason}")]
pub struct UpdateFailure {
    pub element_name: String,
    pub property: String,
    pub reason: FailureReason,
}

impl UpdateFailure {
    pub fn new(update: &PropertyUpdate, reason: FailureReason) -> Self {
        Self {
            element_name: update.element_name.clone(),
            property: update.property.name().to_string(),
            reason,
        }
    }
}

/// Copies produced by a merge plus every reported edit failure
///
/// Failures are in processing order: root, then record, then matched
/// element, then property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub copies: Vec<NodeId>,
    pub failures: Vec<UpdateFailure>,
}

impl MergeOutcome {
    /// Fold edit results into an outcome, keeping only the failures
    pub fn fold<I>(copies: Vec<NodeId>, results: I) -> Self
    where
        I: IntoIterator<Item = (PropertyUpdate, UpdateResult)>,
    {
        let failures = results
            .into_iter()
            .filter_map(|(update, result)| result.err().map(|reason| UpdateFailure::new(&update, reason)))
            .collect();
        Self { copies, failures }
    }

    /// Whether every edit went through
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable failure messages
    pub fn messages(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }
}
