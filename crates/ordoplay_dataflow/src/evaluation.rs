// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pull evaluation of node outputs.

use crate::node::{Node, NodeId};
use crate::value::{GraphValue, Value};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};

pub(crate) type NodeCells = IndexMap<NodeId, RefCell<Box<dyn Node>>>;

/// Read access to the outputs of every node in a graph.
///
/// Passed to [`Node::output`] and [`Node::update`] so slots can resolve
/// their links. Resolution is recursive; nesting deeper than the graph has
/// nodes can only come from a cycle and reads as the zero value.
pub struct EvaluationContext<'a> {
    nodes: &'a NodeCells,
    depth: Cell<usize>,
    max_depth: usize,
}

impl<'a> EvaluationContext<'a> {
    pub(crate) fn new(nodes: &'a NodeCells, max_depth: usize) -> Self {
        Self {
            nodes,
            depth: Cell::new(0),
            max_depth,
        }
    }

    /// Output of `node` converted to `T`, or the zero value if the node is
    /// missing, has no output, produces another type, or is currently
    /// being updated.
    pub fn value<T: GraphValue>(&self, node: NodeId) -> T {
        self.output(node)
            .and_then(|value| T::from_value(&value))
            .unwrap_or_default()
    }

    /// Raw output of `node`
    pub fn output(&self, node: NodeId) -> Option<Value> {
        let cell = self.nodes.get(&node)?;
        let Ok(node_ref) = cell.try_borrow() else {
            tracing::trace!("Node {node} read during its own update");
            return None;
        };

        let depth = self.depth.get();
        if depth >= self.max_depth {
            tracing::warn!("Resolution depth limit {} reached at node {node}", self.max_depth);
            return None;
        }

        self.depth.set(depth + 1);
        let output = node_ref.output(self);
        self.depth.set(depth);
        output
    }
}
