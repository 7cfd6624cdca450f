//! Core error types

use thiserror::Error;

use crate::node::NodeId;

/// Scene graph and core runtime errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The node id does not refer to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Reparenting would make a node its own ancestor
    #[error("Reparenting {child:?} under {parent:?} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },

    /// An anchor operation targeted a node that cannot hold an anchor
    #[error("Node {0:?} is not an anchor node")]
    NotAnchorNode(NodeId),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
