// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types.
//!
//! Unresolved bindings and output type mismatches are not errors: they
//! read as the zero value of the requested type and are only logged.

use crate::node::NodeId;
use crate::value::ValueType;

/// Error returned by graph operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Tick or query before a successful `init()`
    #[error("Graph is not initialized")]
    NotInitialized,

    /// The links form a cycle
    #[error("Graph contains a cycle, unordered nodes: {nodes:?}")]
    CyclicGraph {
        /// Nodes that could not be ordered, in graph order
        nodes: Vec<NodeId>,
    },

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Slot not found on a node
    #[error("Slot '{slot}' not found on node {node}")]
    SlotNotFound {
        /// Node that was searched
        node: NodeId,
        /// Requested slot name
        slot: String,
    },

    /// Linked or written value has the wrong type
    #[error("Incompatible types: expected {expected}, found {found:?}")]
    IncompatibleTypes {
        /// Type required by the slot or node
        expected: ValueType,
        /// Type offered, `None` if the source has no output
        found: Option<ValueType>,
    },

    /// A node with this ID already exists
    #[error("Duplicate node ID: {0}")]
    DuplicateNodeId(NodeId),

    /// The node does not accept external values
    #[error("Node {0} is not an input node")]
    NotAnInputNode(NodeId),
}

/// Error while loading or saving a graph layout
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Node type not present in the registry
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Slot linked to a node that does not exist (strict mode)
    #[error("Slot '{slot}' of node {node} links to missing node {missing}")]
    DanglingLink {
        /// Node owning the slot
        node: NodeId,
        /// Slot name
        slot: String,
        /// Missing source node
        missing: NodeId,
    },

    /// Graph construction failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// RON parse error
    #[error("Failed to parse layout: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Failed to serialize layout: {0}")]
    Serialize(#[from] ron::Error),

    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
