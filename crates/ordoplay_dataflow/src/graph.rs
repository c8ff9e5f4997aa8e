// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph: owns nodes, discovers links, ticks and answers queries.

use crate::error::GraphError;
use crate::evaluation::{EvaluationContext, NodeCells};
use crate::links::Links;
use crate::node::{Node, NodeId};
use crate::objects::ObjectTable;
use crate::order;
use crate::settings::GraphSettings;
use crate::slot::InputField;
use crate::source::SourceMode;
use crate::value::GraphValue;
use std::cell::{Ref, RefCell};
use std::fmt;

const FIRST_ID: u32 = 1;

/// Outcome of a fixup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Dynamic values whose reference resolved
    pub bound: usize,
    /// Dynamic values that will read as zero
    pub unresolved: usize,
}

impl BindReport {
    /// Whether every reference resolved
    pub fn is_complete(&self) -> bool {
        self.unresolved == 0
    }
}

/// A dataflow graph.
///
/// Lifecycle: build or load the nodes, run [`NodeGraph::fixup`] against the
/// host objects, call [`NodeGraph::init`], then call [`NodeGraph::update`]
/// once per tick. Any change to the node set or to a slot link drops the
/// cached tick order, and `init` has to run again before the next tick.
///
/// A graph is single threaded. Separate graphs share no state and can be
/// driven from different threads.
pub struct NodeGraph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: NodeCells,
    /// Node whose output answers [`NodeGraph::get_value`]
    output: Option<NodeId>,
    settings: GraphSettings,
    /// Cached adjacency, dropped on structural changes
    links: Option<Links>,
    /// Set by a successful `init`
    tick_order: Option<Vec<NodeId>>,
    next_id: u32,
}

impl NodeGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: NodeCells::new(),
            output: None,
            settings: GraphSettings::default(),
            links: None,
            tick_order: None,
            next_id: FIRST_ID,
        }
    }

    /// Replace the settings
    pub fn with_settings(mut self, settings: GraphSettings) -> Self {
        self.set_settings(settings);
        self
    }

    /// Current settings
    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Replace the settings; the graph has to be initialized again
    pub fn set_settings(&mut self, settings: GraphSettings) {
        self.settings = settings;
        self.tick_order = None;
    }

    /// Add a node under a fresh ID
    pub fn add_node(&mut self, node: impl Node) -> NodeId {
        self.add_boxed_node(Box::new(node))
    }

    /// Add a boxed node under a fresh ID.
    ///
    /// IDs count up from the highest one seen; past `u32::MAX` the search
    /// wraps around to the lowest free ID.
    pub fn add_boxed_node(&mut self, node: Box<dyn Node>) -> NodeId {
        let mut candidate = self.next_id;
        while self.nodes.contains_key(&NodeId(candidate)) {
            candidate = candidate.checked_add(1).unwrap_or(FIRST_ID);
        }
        let id = NodeId(candidate);
        self.next_id = candidate.checked_add(1).unwrap_or(FIRST_ID);
        self.nodes.insert(id, RefCell::new(node));
        self.invalidate();
        id
    }

    /// Add a node under a given ID
    pub fn insert_node(&mut self, id: NodeId, node: Box<dyn Node>) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }
        self.nodes.insert(id, RefCell::new(node));
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        self.invalidate();
        Ok(())
    }

    /// Remove a node, unlinking every slot that read from it
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Box<dyn Node>> {
        let removed = self.nodes.shift_remove(&node_id)?.into_inner();

        for cell in self.nodes.values_mut() {
            for (_, slot) in cell.get_mut().slots_mut() {
                if slot.source() == Some(node_id) {
                    slot.set_source(None);
                }
            }
        }
        if self.output == Some(node_id) {
            self.output = None;
        }

        self.invalidate();
        Some(removed)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<Ref<'_, dyn Node + 'static>> {
        self.nodes
            .get(&node_id)
            .map(|cell| Ref::map(cell.borrow(), |node| &**node))
    }

    /// Get a node by ID as its concrete type
    pub fn node_as<N: Node>(&self, node_id: NodeId) -> Option<Ref<'_, N>> {
        let cell = self.nodes.get(&node_id)?;
        Ref::filter_map(cell.borrow(), |node| node.as_any().downcast_ref::<N>()).ok()
    }

    /// Get a mutable node by ID.
    ///
    /// Relinking slots through this reference bypasses invalidation; use
    /// [`NodeGraph::link`] and [`NodeGraph::unlink`] instead.
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut (dyn Node + 'static)> {
        self.nodes
            .get_mut(&node_id)
            .map(|cell| cell.get_mut().as_mut())
    }

    /// Whether a node exists
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Get all node IDs, in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Link the input slot `slot` of `target` to the output of `source`
    pub fn link(&mut self, target: NodeId, slot: &str, source: NodeId) -> Result<(), GraphError> {
        let produced = self
            .nodes
            .get(&source)
            .ok_or(GraphError::NodeNotFound(source))?
            .borrow()
            .output_type();

        self.with_slot(target, slot, |field| {
            if produced != Some(field.value_type()) {
                return Err(GraphError::IncompatibleTypes {
                    expected: field.value_type(),
                    found: produced,
                });
            }
            field.set_source(Some(source));
            Ok(())
        })??;

        tracing::debug!("Linked {source} -> {target}.{slot}");
        self.invalidate();
        Ok(())
    }

    /// Unlink an input slot, returning the previous source
    pub fn unlink(&mut self, target: NodeId, slot: &str) -> Result<Option<NodeId>, GraphError> {
        let previous = self.with_slot(target, slot, |field| {
            let previous = field.source();
            field.set_source(None);
            previous
        })?;

        if previous.is_some() {
            tracing::debug!("Unlinked {target}.{slot}");
            self.invalidate();
        }
        Ok(previous)
    }

    fn with_slot<R>(
        &mut self,
        node_id: NodeId,
        slot: &str,
        f: impl FnOnce(&mut dyn InputField) -> R,
    ) -> Result<R, GraphError> {
        let node = self
            .node_mut(node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let mut slots = node.slots_mut();
        match slots.iter_mut().find(|(name, _)| *name == slot) {
            Some((_, field)) => Ok(f(&mut **field)),
            None => Err(GraphError::SlotNotFound {
                node: node_id,
                slot: slot.to_string(),
            }),
        }
    }

    /// Designate the node answering [`NodeGraph::get_value`]
    pub fn set_output(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }
        self.output = Some(node_id);
        Ok(())
    }

    /// The designated output node
    pub fn output_node(&self) -> Option<NodeId> {
        self.output
    }

    /// Links between nodes, computed on first use after a change
    pub fn links(&mut self) -> &Links {
        if self.links.is_none() {
            let links = self.build_links();
            self.links = Some(links);
        }
        self.links.get_or_insert_with(Links::default)
    }

    fn build_links(&self) -> Links {
        Links::build(self.nodes.iter().map(|(id, cell)| {
            let node = cell.borrow();
            let linked: Vec<(&'static str, NodeId)> = node
                .slots()
                .into_iter()
                .filter_map(|(name, slot)| slot.source().map(|source| (name, source)))
                .collect();
            (*id, linked)
        }))
    }

    fn invalidate(&mut self) {
        self.links = None;
        self.tick_order = None;
    }

    /// Fixup pass: bind every node's dynamic values against the host
    /// objects and rebuild the links.
    ///
    /// Run after loading and again whenever the host objects change. If the
    /// rebuilt links differ from the cached ones the tick order is dropped
    /// and `init` has to run again.
    pub fn fixup(&mut self, objects: &ObjectTable) -> BindReport {
        let mut report = BindReport::default();
        for (id, cell) in &mut self.nodes {
            for (name, value) in cell.get_mut().values_mut() {
                if value.mode() == SourceMode::Static {
                    continue;
                }
                if value.bind(objects) {
                    report.bound += 1;
                } else {
                    report.unresolved += 1;
                    tracing::warn!("Node {id} value '{name}' is unbound and reads as zero");
                }
            }
        }

        let links = self.build_links();
        for dangling in links.dangling() {
            tracing::warn!(
                "Node {} slot '{}' links to missing node {}",
                dangling.node,
                dangling.slot,
                dangling.source
            );
        }
        if self.links.as_ref() != Some(&links) && self.tick_order.take().is_some() {
            tracing::debug!("Links of graph '{}' changed, tick order dropped", self.name);
        }
        self.links = Some(links);

        tracing::debug!(
            "Fixup of graph '{}': {} bound, {} unresolved",
            self.name,
            report.bound,
            report.unresolved
        );
        report
    }

    /// Reset node state and compute the tick order.
    ///
    /// Fails with [`GraphError::CyclicGraph`] if the links form a cycle;
    /// the graph then stays uninitialized.
    pub fn init(&mut self) -> Result<(), GraphError> {
        self.tick_order = None;
        let strategy = self.settings.ordering;

        let links = self.links();
        let edge_count = links.edge_count();
        let order = order::tick_order(links, strategy).inspect_err(|e| {
            tracing::warn!("Cannot initialize graph: {e}");
        })?;

        for cell in self.nodes.values_mut() {
            cell.get_mut().init();
        }

        tracing::info!(
            "Initialized graph '{}': {} nodes, {} links, {:?} ordering",
            self.name,
            order.len(),
            edge_count,
            strategy
        );
        tracing::debug!("Tick order: {order:?}");
        self.tick_order = Some(order);
        Ok(())
    }

    /// Whether `init` succeeded since the last structural change
    pub fn is_initialized(&self) -> bool {
        self.tick_order.is_some()
    }

    /// The cached tick order
    pub fn tick_order(&self) -> Option<&[NodeId]> {
        self.tick_order.as_deref()
    }

    /// Advance every node once, in tick order
    pub fn update(&mut self, delta_time: f32) -> Result<(), GraphError> {
        let order = self
            .tick_order
            .as_deref()
            .ok_or(GraphError::NotInitialized)?;
        let ctx = EvaluationContext::new(&self.nodes, self.max_resolve_depth());

        for id in order {
            if let Some(cell) = self.nodes.get(id) {
                cell.borrow_mut().update(delta_time, &ctx);
            }
        }
        Ok(())
    }

    /// Output of the designated output node.
    ///
    /// Returns the zero value of `T` when there is no output node or it
    /// produces a type other than `T`.
    ///
    /// Resolution recurses once per link along the output's dependency
    /// chain and stops at `max_resolve_depth` (the node count by default),
    /// where it reads zero. Chains of many thousands of links can exhaust
    /// the thread's stack before the default limit is reached; lower
    /// `max_resolve_depth` for such graphs.
    pub fn get_value<T: GraphValue>(&self) -> Result<T, GraphError> {
        self.ensure_initialized()?;
        match self.output {
            Some(id) => Ok(self.resolve(id)),
            None => {
                tracing::debug!("Graph '{}' has no output node", self.name);
                Ok(T::default())
            }
        }
    }

    /// Output of any node, with the same fallbacks as [`NodeGraph::get_value`]
    pub fn value_of<T: GraphValue>(&self, node_id: NodeId) -> Result<T, GraphError> {
        self.ensure_initialized()?;
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }
        Ok(self.resolve(node_id))
    }

    fn resolve<T: GraphValue>(&self, node_id: NodeId) -> T {
        let produced = self
            .nodes
            .get(&node_id)
            .and_then(|cell| cell.borrow().output_type());
        if produced != Some(T::VALUE_TYPE) {
            tracing::debug!(
                "Node {node_id} produces {produced:?}, requested {}",
                T::VALUE_TYPE
            );
            return T::default();
        }

        EvaluationContext::new(&self.nodes, self.max_resolve_depth()).value(node_id)
    }

    fn ensure_initialized(&self) -> Result<(), GraphError> {
        if self.tick_order.is_none() {
            return Err(GraphError::NotInitialized);
        }
        Ok(())
    }

    fn max_resolve_depth(&self) -> usize {
        self.settings
            .max_resolve_depth
            .unwrap_or(self.nodes.len())
            .max(1)
    }

    /// Input nodes, where hosts push external values before a tick
    pub fn input_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, cell)| cell.borrow().is_input())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Overwrite the value of an input node with a literal.
    ///
    /// Replaces any host object binding the node had.
    pub fn set_input<T: GraphValue>(&mut self, node_id: NodeId, value: T) -> Result<(), GraphError> {
        let node = self
            .node_mut(node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let field = node
            .input_value_mut()
            .ok_or(GraphError::NotAnInputNode(node_id))?;
        if field.value_type() != T::VALUE_TYPE {
            return Err(GraphError::IncompatibleTypes {
                expected: field.value_type(),
                found: Some(T::VALUE_TYPE),
            });
        }
        field.set_static_value(&value.into_value());
        Ok(())
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl fmt::Debug for NodeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeGraph")
            .field("name", &self.name)
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("output", &self.output)
            .field("tick_order", &self.tick_order)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{FloatAddNode, FloatMaxNode, InputNode, SquareWaveNode};
    use crate::objects::{ObjectRecord, SharedValue};
    use crate::slot::InputSlot;
    use crate::source::DynamicValue;
    use crate::value::{Color, ValueType};
    use std::sync::Arc;

    fn position(order: &[NodeId], id: NodeId) -> usize {
        order.iter().position(|n| *n == id).unwrap()
    }

    #[test]
    fn test_single_node_output() {
        let mut graph = NodeGraph::new("add");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        graph.set_output(add).unwrap();
        graph.init().unwrap();
        assert_eq!(graph.get_value::<f32>(), Ok(5.0));
    }

    #[test]
    fn test_linked_nodes() {
        let mut graph = NodeGraph::new("max into add");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        let max = graph.add_node(FloatMaxNode::new(1.0, 4.0));
        graph.link(add, "a", max).unwrap();
        graph.set_output(add).unwrap();

        graph.init().unwrap();
        assert_eq!(graph.tick_order(), Some(&[max, add][..]));
        assert_eq!(graph.get_value::<f32>(), Ok(7.0));
        assert_eq!(graph.value_of::<f32>(max), Ok(4.0));
        assert_eq!(
            graph.value_of::<f32>(NodeId(99)),
            Err(GraphError::NodeNotFound(NodeId(99)))
        );
    }

    #[test]
    fn test_type_mismatch_reads_zero() {
        let mut graph = NodeGraph::new("mismatch");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        graph.set_output(add).unwrap();
        graph.init().unwrap();
        assert_eq!(graph.get_value::<i32>(), Ok(0));
        assert_eq!(graph.get_value::<Color>(), Ok(Color::default()));
    }

    #[test]
    fn test_no_output_node_reads_zero() {
        let mut graph = NodeGraph::new("no output");
        graph.add_node(FloatAddNode::new(2.0, 3.0));
        graph.init().unwrap();
        assert_eq!(graph.get_value::<f32>(), Ok(0.0));
    }

    #[test]
    fn test_not_initialized() {
        let mut graph = NodeGraph::new("fresh");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        graph.set_output(add).unwrap();

        assert!(!graph.is_initialized());
        assert_eq!(graph.update(0.1), Err(GraphError::NotInitialized));
        assert_eq!(graph.get_value::<f32>(), Err(GraphError::NotInitialized));
    }

    #[test]
    fn test_empty_graph() {
        let mut graph = NodeGraph::default();
        graph.init().unwrap();
        assert_eq!(graph.tick_order(), Some(&[][..]));
        assert_eq!(graph.update(1.0), Ok(()));
        assert_eq!(graph.get_value::<f32>(), Ok(0.0));
    }

    #[test]
    fn test_self_link_rejected_at_init() {
        let mut graph = NodeGraph::new("self link");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        graph.link(add, "a", add).unwrap();

        assert_eq!(graph.init(), Err(GraphError::CyclicGraph { nodes: vec![add] }));
        assert!(!graph.is_initialized());
        assert_eq!(graph.update(0.1), Err(GraphError::NotInitialized));
    }

    #[test]
    fn test_structural_changes_require_init() {
        let mut graph = NodeGraph::new("invalidate");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        let max = graph.add_node(FloatMaxNode::new(1.0, 4.0));
        graph.init().unwrap();

        graph.link(add, "a", max).unwrap();
        assert!(!graph.is_initialized());
        graph.init().unwrap();

        assert_eq!(graph.unlink(add, "a"), Ok(Some(max)));
        assert!(!graph.is_initialized());
        graph.init().unwrap();

        graph.add_node(FloatMaxNode::default());
        assert!(!graph.is_initialized());
        graph.init().unwrap();

        graph.set_settings(GraphSettings::legacy());
        assert!(!graph.is_initialized());
    }

    #[test]
    fn test_link_errors() {
        let mut graph = NodeGraph::new("errors");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        let count = graph.add_node(InputNode::new(4i32));

        assert_eq!(
            graph.link(add, "a", NodeId(99)),
            Err(GraphError::NodeNotFound(NodeId(99)))
        );
        assert_eq!(
            graph.link(NodeId(99), "a", add),
            Err(GraphError::NodeNotFound(NodeId(99)))
        );
        assert_eq!(
            graph.link(add, "c", add),
            Err(GraphError::SlotNotFound {
                node: add,
                slot: "c".to_string()
            })
        );
        assert_eq!(
            graph.link(add, "a", count),
            Err(GraphError::IncompatibleTypes {
                expected: ValueType::Float,
                found: Some(ValueType::Int)
            })
        );
        assert_eq!(graph.unlink(add, "b"), Ok(None));
        assert_eq!(graph.set_output(NodeId(99)), Err(GraphError::NodeNotFound(NodeId(99))));
    }

    #[test]
    fn test_static_slots_constant_across_ticks() {
        let mut graph = NodeGraph::new("constant");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        graph.set_output(add).unwrap();
        graph.init().unwrap();

        for _ in 0..5 {
            graph.update(0.25).unwrap();
            assert_eq!(graph.get_value::<f32>(), Ok(5.0));
        }
    }

    #[test]
    fn test_square_wave() {
        let mut graph = NodeGraph::new("square");
        let wave = graph.add_node(SquareWaveNode::default());
        graph.set_output(wave).unwrap();
        graph.init().unwrap();

        let mut outputs = Vec::new();
        for _ in 0..4 {
            graph.update(1.0).unwrap();
            outputs.push(graph.get_value::<f32>().unwrap());
        }
        assert_eq!(outputs, vec![0.0, 0.0, 1.0, 0.0]);

        graph.init().unwrap();
        assert_eq!(graph.node_as::<SquareWaveNode>(wave).map(|n| n.phase()), Some(0.0));
        assert_eq!(graph.get_value::<f32>(), Ok(0.0));
    }

    #[test]
    fn test_square_wave_linked_frequency() {
        let mut graph = NodeGraph::new("square linked");
        let wave = graph.add_node(SquareWaveNode::default());
        let frequency = graph.add_node(InputNode::new(2.0f32));
        graph.link(wave, "frequency", frequency).unwrap();
        graph.set_output(wave).unwrap();

        graph.init().unwrap();
        assert_eq!(graph.tick_order(), Some(&[frequency, wave][..]));
        graph.update(0.75).unwrap();
        assert_eq!(graph.get_value::<f32>(), Ok(1.0));
    }

    #[test]
    fn test_queries_do_not_advance_state() {
        let mut graph = NodeGraph::new("queries");
        let wave = graph.add_node(SquareWaveNode::new(1.0));
        graph.set_output(wave).unwrap();
        graph.init().unwrap();
        graph.update(1.5).unwrap();

        let first = graph.get_value::<f32>();
        let second = graph.get_value::<f32>();
        assert_eq!(first, Ok(1.0));
        assert_eq!(first, second);
        assert_eq!(graph.node_as::<SquareWaveNode>(wave).map(|n| n.phase()), Some(1.5));
    }

    #[test]
    fn test_diamond_ticks_after_both_branches() {
        let mut graph = NodeGraph::new("diamond");
        let d = graph.add_node(FloatAddNode::default());
        let c = graph.add_node(FloatMaxNode::new(0.0, 1.0));
        let b = graph.add_node(FloatAddNode::new(0.0, 1.0));
        let a = graph.add_node(InputNode::new(2.0f32));
        graph.link(b, "a", a).unwrap();
        graph.link(c, "a", a).unwrap();
        graph.link(d, "a", b).unwrap();
        graph.link(d, "b", c).unwrap();
        graph.set_output(d).unwrap();

        graph.init().unwrap();
        let order = graph.tick_order().unwrap().to_vec();
        assert_eq!(order[0], a);
        assert!(position(&order, d) > position(&order, b));
        assert!(position(&order, d) > position(&order, c));
        assert_eq!(graph.get_value::<f32>(), Ok(5.0));
        assert_eq!(graph.links().edge_count(), 4);
    }

    #[test]
    fn test_legacy_ordering() {
        let mut graph = NodeGraph::new("legacy").with_settings(GraphSettings::legacy());
        let a = graph.add_node(InputNode::new(1.0f32));
        let b = graph.add_node(FloatAddNode::default());
        let c = graph.add_node(FloatAddNode::default());
        let d = graph.add_node(FloatAddNode::default());
        graph.link(b, "a", a).unwrap();
        graph.link(c, "a", b).unwrap();
        graph.link(d, "a", c).unwrap();
        graph.link(d, "b", a).unwrap();
        graph.set_output(d).unwrap();

        graph.init().unwrap();
        assert_eq!(graph.tick_order(), Some(&[b, d, a, c][..]));
        assert_eq!(graph.get_value::<f32>(), Ok(2.0));

        graph.set_settings(GraphSettings::default());
        graph.init().unwrap();
        assert_eq!(graph.tick_order(), Some(&[a, b, c, d][..]));
    }

    #[test]
    fn test_input_nodes() {
        let mut graph = NodeGraph::new("inputs");
        let speed = graph.add_node(InputNode::new(1.0f32));
        let add = graph.add_node(FloatAddNode::new(0.0, 3.0));
        let label = graph.add_node(InputNode::new(String::from("idle")));
        graph.link(add, "a", speed).unwrap();
        graph.set_output(add).unwrap();
        graph.init().unwrap();

        assert_eq!(graph.input_nodes(), vec![speed, label]);
        assert_eq!(graph.get_value::<f32>(), Ok(4.0));

        graph.set_input(speed, 5.0f32).unwrap();
        assert_eq!(graph.get_value::<f32>(), Ok(8.0));
        graph.set_input(label, String::from("running")).unwrap();
        assert_eq!(graph.value_of::<String>(label), Ok(String::from("running")));

        assert_eq!(graph.set_input(add, 1.0f32), Err(GraphError::NotAnInputNode(add)));
        assert_eq!(
            graph.set_input(speed, 1i32),
            Err(GraphError::IncompatibleTypes {
                expected: ValueType::Float,
                found: Some(ValueType::Int)
            })
        );
        assert_eq!(
            graph.set_input(NodeId(99), 1.0f32),
            Err(GraphError::NodeNotFound(NodeId(99)))
        );
    }

    #[test]
    fn test_remove_node_clears_links() {
        let mut graph = NodeGraph::new("remove");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        let max = graph.add_node(FloatMaxNode::new(1.0, 4.0));
        graph.link(add, "a", max).unwrap();
        graph.set_output(max).unwrap();

        assert!(graph.remove_node(max).is_some());
        assert!(graph.remove_node(max).is_none());
        assert_eq!(graph.output_node(), None);
        assert_eq!(graph.node_as::<FloatAddNode>(add).and_then(|n| n.a.source()), None);

        graph.set_output(add).unwrap();
        graph.init().unwrap();
        assert_eq!(graph.get_value::<f32>(), Ok(5.0));
    }

    #[test]
    fn test_dangling_link_reads_zero() {
        let mut graph = NodeGraph::new("dangling");
        let add = graph.add_node(FloatAddNode {
            a: InputSlot::linked(2.0, NodeId(99)),
            b: InputSlot::new(3.0),
        });
        graph.set_output(add).unwrap();

        assert_eq!(graph.links().dangling().len(), 1);
        graph.init().unwrap();
        assert_eq!(graph.get_value::<f32>(), Ok(3.0));
    }

    #[test]
    fn test_insert_node_ids() {
        let mut graph = NodeGraph::new("ids");
        graph.insert_node(NodeId(5), Box::new(FloatAddNode::default())).unwrap();
        assert_eq!(
            graph.insert_node(NodeId(5), Box::new(FloatAddNode::default())),
            Err(GraphError::DuplicateNodeId(NodeId(5)))
        );
        assert_eq!(graph.add_node(FloatAddNode::default()), NodeId(6));
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec![NodeId(5), NodeId(6)]);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_fixup_binds_host_values() {
        let speed = SharedValue::new(1.5f32);
        let host = ObjectRecord::new().with_member::<f32>("speed", Arc::new(speed.clone()));
        let mut objects = ObjectTable::new();
        objects.insert("player", host.clone());

        let mut graph = NodeGraph::new("fixup");
        let input = graph.add_node(InputNode::bound(DynamicValue::<f32>::member("player", "speed")));
        let add = graph.add_node(FloatAddNode::new(0.0, 3.0));
        graph.link(add, "a", input).unwrap();
        graph.set_output(add).unwrap();

        assert_eq!(graph.fixup(&objects), BindReport { bound: 1, unresolved: 0 });
        graph.init().unwrap();
        assert_eq!(graph.get_value::<f32>(), Ok(4.5));
        speed.set(2.0);
        assert_eq!(graph.get_value::<f32>(), Ok(5.0));

        let mut renamed = host;
        renamed.rename_member("speed", "velocity");
        objects.insert("player", renamed);
        let report = graph.fixup(&objects);
        assert!(!report.is_complete());
        assert_eq!(graph.get_value::<f32>(), Ok(3.0));
    }

    #[test]
    fn test_resolution_depth_guard() {
        let mut graph = NodeGraph::new("guard");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        graph.set_output(add).unwrap();
        graph.init().unwrap();

        // Relink behind the graph's back so init does not see the cycle.
        {
            let node = graph.node_mut(add).unwrap();
            let mut slots = node.slots_mut();
            slots[0].1.set_source(Some(add));
        }
        assert!(graph.is_initialized());
        assert_eq!(graph.get_value::<f32>(), Ok(3.0));
        graph.update(0.1).unwrap();
    }

    fn add_chain(graph: &mut NodeGraph, length: usize) -> NodeId {
        // input(1.0) -> add(+1) -> add(+1) -> ...
        let mut last = graph.add_node(InputNode::new(1.0f32));
        for _ in 0..length {
            let add = graph.add_node(FloatAddNode::new(0.0, 1.0));
            graph.link(add, "a", last).unwrap();
            last = add;
        }
        last
    }

    #[test]
    fn test_add_node_after_max_id() {
        let mut graph = NodeGraph::new("ids");
        graph
            .insert_node(NodeId(u32::MAX), Box::new(FloatAddNode::default()))
            .unwrap();

        let first = graph.add_node(FloatAddNode::default());
        let second = graph.add_node(FloatAddNode::default());
        assert_eq!(first, NodeId(1));
        assert_eq!(second, NodeId(2));
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_add_node_wraps_to_lowest_free_id() {
        let mut graph = NodeGraph::new("ids");
        graph.insert_node(NodeId(1), Box::new(FloatAddNode::default())).unwrap();
        graph
            .insert_node(NodeId(u32::MAX - 1), Box::new(FloatAddNode::default()))
            .unwrap();

        assert_eq!(graph.add_node(FloatAddNode::default()), NodeId(u32::MAX));
        assert_eq!(graph.add_node(FloatAddNode::default()), NodeId(2));
    }

    #[test]
    fn test_default_resolve_depth_covers_full_chain() {
        let mut graph = NodeGraph::new("chain");
        let last = add_chain(&mut graph, 9);
        graph.set_output(last).unwrap();
        graph.init().unwrap();

        assert_eq!(graph.node_count(), 10);
        assert_eq!(graph.get_value::<f32>(), Ok(10.0));
    }

    #[test]
    fn test_max_resolve_depth_limits_chain() {
        let settings = GraphSettings {
            max_resolve_depth: Some(2),
            ..GraphSettings::default()
        };
        let mut graph = NodeGraph::new("shallow").with_settings(settings);
        let last = add_chain(&mut graph, 3);
        graph.set_output(last).unwrap();
        graph.init().unwrap();

        // The output and its direct source resolve, everything further
        // upstream reads zero.
        assert_eq!(graph.get_value::<f32>(), Ok(2.0));

        graph.set_settings(GraphSettings::default());
        graph.init().unwrap();
        assert_eq!(graph.get_value::<f32>(), Ok(4.0));
    }

    #[test]
    fn test_fixup_drops_stale_tick_order() {
        let mut graph = NodeGraph::new("relink");
        let add = graph.add_node(FloatAddNode::new(2.0, 3.0));
        let max = graph.add_node(FloatMaxNode::new(1.0, 4.0));
        graph.set_output(add).unwrap();
        graph.init().unwrap();

        graph.fixup(&ObjectTable::new());
        assert!(graph.is_initialized());

        {
            let node = graph.node_mut(add).unwrap();
            let mut slots = node.slots_mut();
            slots[0].1.set_source(Some(max));
        }
        graph.fixup(&ObjectTable::new());
        assert!(!graph.is_initialized());
        assert_eq!(graph.get_value::<f32>(), Err(GraphError::NotInitialized));

        graph.init().unwrap();
        assert_eq!(graph.tick_order(), Some(&[max, add][..]));
        assert_eq!(graph.get_value::<f32>(), Ok(7.0));
    }
}
