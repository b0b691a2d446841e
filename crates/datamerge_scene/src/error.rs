//! Error types for tree operations

use crate::id::NodeId;
use thiserror::Error;

/// Errors raised by a [`SceneHost`](crate::SceneHost)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),

    #[error("Appending {child} to {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("The document root cannot be {0}")]
    RootOperation(&'static str),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

pub type SceneResult<T> = Result<T, SceneError>;
