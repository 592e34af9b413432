//! Error types for tree editing and parsing.

use crate::tree::NodeId;
use breeze_common::Position;

/// Errors produced by [`CssTree`](crate::CssTree) operations and the parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
    /// The id does not belong to this tree.
    #[error("node {0:?} does not belong to this tree")]
    UnknownNode(NodeId),

    /// The node was removed from the tree earlier.
    #[error("node {0:?} has been removed from the tree")]
    Detached(NodeId),

    /// The operation needs a parent but the node is the tree root.
    #[error("node {0:?} has no parent")]
    NoParent(NodeId),

    /// The node kind cannot hold children.
    #[error("node {0:?} cannot contain child nodes")]
    NotAContainer(NodeId),

    /// The input is not CSS the parser understands.
    #[error("parse error at {position}: {message}")]
    Parse {
        /// Where the problem was found.
        position: Position,
        /// What went wrong.
        message: String,
    },
}
