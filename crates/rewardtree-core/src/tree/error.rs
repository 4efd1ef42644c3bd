use thiserror::Error;

use crate::tree::ids::NodeId;

/// Error type for reward tree construction and search operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Attempted to access a node id that does not exist in the arena.
    #[error("missing node with id {}", node_id.index())]
    MissingNode { node_id: NodeId },
    /// Requested depth cannot produce a tree.
    #[error("invalid tree depth {depth}: must be between 1 and {max}")]
    InvalidDepth { depth: u32, max: u32 },
    /// Explicit leaf layout is not a complete binary level.
    #[error("leaf count {count} must be a power of two and at least 2")]
    InvalidLeafCount { count: usize },
    /// Best-leaf extraction ran before any iteration reached the root.
    #[error("no best leaf: the tree has not been searched")]
    Unsearched,
}
