//! Error types for the scene graph

use crate::ids::NodeId;
use thiserror::Error;

/// Result type alias using the scene Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, encoding or storing a scene
#[derive(Error, Debug)]
pub enum Error {
    /// Persisted data could not be parsed or had an unexpected shape
    #[error("Malformed scene data: {0}")]
    Json(#[from] serde_json::Error),

    /// Durable storage failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Editor text did not parse as a finite number
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The requested parent is not in the tree
    #[error("Parent {0} not found")]
    ParentNotFound(NodeId),

    /// The requested parent exists but cannot hold children
    #[error("Shape {0} is not a combinator")]
    NotACombinator(NodeId),

    /// The child is not a direct child of the given parent
    #[error("Shape {child} is not a child of {parent}")]
    ChildNotFound {
        /// Combinator that was searched
        parent: NodeId,
        /// Id that was missing
        child: NodeId,
    },

    /// A persisted id is too large to allocate past
    #[error("Shape id {0} is out of range")]
    IdOutOfRange(NodeId),

    /// Inserting would put the same id in the tree twice
    #[error("Shape {0} is already in the tree")]
    DuplicateId(NodeId),
}
