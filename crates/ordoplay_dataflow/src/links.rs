// SPDX-License-Identifier: MIT OR Apache-2.0
//! Links (implicit edges) between nodes.
//!
//! Nodes never store edges. An edge `A -> B` exists whenever an input slot
//! of `B` is linked to `A`. [`Links`] is the adjacency derived from that
//! slot state; the graph computes it once after fixup and drops it whenever
//! the node set or a slot link changes.

use crate::node::NodeId;
use indexmap::{IndexMap, IndexSet};

/// A slot link whose source node does not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingLink {
    /// Node owning the slot
    pub node: NodeId,
    /// Slot name
    pub slot: &'static str,
    /// Missing source node
    pub source: NodeId,
}

/// Adjacency derived from input slot links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    /// Nodes feeding each node, in slot declaration order
    upstream: IndexMap<NodeId, Vec<NodeId>>,
    /// Nodes consuming each node, in node order
    downstream: IndexMap<NodeId, Vec<NodeId>>,
    dangling: Vec<DanglingLink>,
}

impl Links {
    /// Build from each node's linked slots, given as `(slot, source)` pairs
    /// in declaration order.
    ///
    /// A node reading the same source through several slots gets one edge
    /// per slot.
    pub fn build<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, Vec<(&'static str, NodeId)>)>,
    {
        let nodes: Vec<_> = nodes.into_iter().collect();
        let ids: IndexSet<NodeId> = nodes.iter().map(|(id, _)| *id).collect();

        let mut upstream = IndexMap::with_capacity(nodes.len());
        let mut dangling = Vec::new();
        for (id, linked) in &nodes {
            let mut sources = Vec::with_capacity(linked.len());
            for &(slot, source) in linked {
                if ids.contains(&source) {
                    sources.push(source);
                } else {
                    dangling.push(DanglingLink {
                        node: *id,
                        slot,
                        source,
                    });
                }
            }
            upstream.insert(*id, sources);
        }

        let mut downstream: IndexMap<NodeId, Vec<NodeId>> =
            ids.iter().map(|id| (*id, Vec::new())).collect();
        for (id, sources) in &upstream {
            for source in sources {
                if let Some(consumers) = downstream.get_mut(source) {
                    consumers.push(*id);
                }
            }
        }

        Self {
            upstream,
            downstream,
            dangling,
        }
    }

    /// Nodes feeding `node`
    pub fn upstream(&self, node: NodeId) -> &[NodeId] {
        self.upstream.get(&node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Nodes consuming the output of `node`
    pub fn downstream(&self, node: NodeId) -> &[NodeId] {
        self.downstream.get(&node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether any slot of `node` is linked to a live node
    pub fn has_incoming(&self, node: NodeId) -> bool {
        !self.upstream(node).is_empty()
    }

    /// All nodes, in graph order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.upstream.keys().copied()
    }

    /// Links to nodes that do not exist
    pub fn dangling(&self) -> &[DanglingLink] {
        &self.dangling
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.upstream.len()
    }

    /// Whether there are no nodes
    pub fn is_empty(&self) -> bool {
        self.upstream.is_empty()
    }

    /// Number of live edges
    pub fn edge_count(&self) -> usize {
        self.upstream.values().map(Vec::len).sum()
    }
}
