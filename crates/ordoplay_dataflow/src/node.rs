// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions and the node type registry.

use crate::evaluation::EvaluationContext;
use crate::slot::{SlotMut, SlotRef};
use crate::source::DynamicField;
use crate::value::{Value, ValueType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Identifier of a node, unique within one graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit of computation in a [`NodeGraph`](crate::NodeGraph).
///
/// Node types declare their input slots and dynamic values explicitly
/// through [`Node::slots`] and [`Node::values`]; the graph discovers links
/// and performs fixup only through these lists. Both lists must return the
/// same names in the same order on every call.
pub trait Node: Send + 'static {
    /// Registry type tag
    fn node_type(&self) -> &'static str;

    /// Input slots in declaration order
    fn slots(&self) -> Vec<SlotRef<'_>> {
        Vec::new()
    }

    /// Mutable input slots, same order as [`Node::slots`]
    fn slots_mut(&mut self) -> Vec<SlotMut<'_>> {
        Vec::new()
    }

    /// Dynamic values that bind to host objects during fixup
    fn values(&self) -> Vec<(&'static str, &dyn DynamicField)> {
        Vec::new()
    }

    /// Mutable dynamic values, same order as [`Node::values`]
    fn values_mut(&mut self) -> Vec<(&'static str, &mut dyn DynamicField)> {
        Vec::new()
    }

    /// Type produced by [`Node::output`], `None` for nodes without output
    fn output_type(&self) -> Option<ValueType> {
        None
    }

    /// Compute the output from the current slots and state.
    ///
    /// Must not advance any state; the graph may call it any number of
    /// times per tick.
    fn output(&self, _ctx: &EvaluationContext<'_>) -> Option<Value> {
        None
    }

    /// Reset internal state, called once before the first tick
    fn init(&mut self) {}

    /// Advance internal state by one tick
    fn update(&mut self, _delta_time: f32, _ctx: &EvaluationContext<'_>) {}

    /// Whether hosts push external data into this node
    fn is_input(&self) -> bool {
        false
    }

    /// The value hosts overwrite on input nodes
    fn input_value_mut(&mut self) -> Option<&mut dyn DynamicField> {
        None
    }

    /// Downcasting support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcasting support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Constructor for a registered node type
pub type NodeConstructor = fn() -> Box<dyn Node>;

/// Node type definition
#[derive(Clone)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Output type exposed by nodes of this type
    pub output: Option<ValueType>,
    /// Creates a node with default slots
    pub constructor: NodeConstructor,
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// Registry of available node types
pub struct NodeRegistry {
    /// Registered node types by ID
    types: IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Register a node type, replacing any type with the same ID
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Register a `Default`-constructible node type
    pub fn register_default<N: Node + Default>(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) {
        let output = N::default().output_type();
        self.register(NodeType {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            output,
            constructor: || -> Box<dyn Node> { Box::new(N::default()) },
        });
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Whether a type ID is registered
    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types whose output has the given type
    pub fn types_with_output(&self, output: ValueType) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.output == Some(output))
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Box<dyn Node>> {
        self.get(type_id).map(|t| (t.constructor)())
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.types.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Marker;

    impl Node for Marker {
        fn node_type(&self) -> &'static str {
            "marker"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_registry_creates_nodes() {
        let mut registry = NodeRegistry::new();
        registry.register_default::<Marker>("marker", "Marker", "Does nothing");

        assert!(registry.contains("marker"));
        assert_eq!(registry.get("marker").and_then(|t| t.output), None);
        let node = registry.create_node("marker");
        assert_eq!(node.map(|n| n.node_type()), Some("marker"));
        assert!(registry.create_node("missing").is_none());
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(12).to_string(), "#12");
    }
}
