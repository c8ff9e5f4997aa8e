// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input slots on nodes.

use crate::evaluation::EvaluationContext;
use crate::node::NodeId;
use crate::value::{GraphValue, Value, ValueType};

/// A typed node input: a literal default plus an optional link to the
/// output of another node.
///
/// The link is held as a [`NodeId`] only, so slots never own or borrow the
/// node they read from.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSlot<T> {
    default: T,
    source: Option<NodeId>,
}

impl<T: GraphValue> InputSlot<T> {
    /// Create an unlinked slot
    pub fn new(default: T) -> Self {
        Self {
            default,
            source: None,
        }
    }

    /// Create a slot linked to `source`
    pub fn linked(default: T, source: NodeId) -> Self {
        Self {
            default,
            source: Some(source),
        }
    }

    /// Literal used while unlinked
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Replace the literal
    pub fn set_default(&mut self, value: T) {
        self.default = value;
    }

    /// Linked node, if any
    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    /// Read the slot: the linked node's output, or the literal if unlinked.
    ///
    /// A link to a missing node or to an output of another type reads as
    /// the zero value.
    pub fn value(&self, ctx: &EvaluationContext<'_>) -> T {
        match self.source {
            Some(source) => ctx.value(source),
            None => self.default.clone(),
        }
    }
}

impl<T: GraphValue> Default for InputSlot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: GraphValue> From<T> for InputSlot<T> {
    fn from(default: T) -> Self {
        Self::new(default)
    }
}

/// Object-safe view of an [`InputSlot`], used by the graph for link
/// discovery and persistence.
pub trait InputField: Send {
    /// Type accepted by the slot
    fn value_type(&self) -> ValueType;

    /// Linked node, if any
    fn source(&self) -> Option<NodeId>;

    /// Change the link. Prefer [`NodeGraph::link`](crate::NodeGraph::link),
    /// which also invalidates the cached tick order.
    fn set_source(&mut self, source: Option<NodeId>);

    /// Literal default as a [`Value`]
    fn default_value(&self) -> Value;

    /// Replace the literal, returning `false` on a type mismatch
    fn set_default_value(&mut self, value: &Value) -> bool;
}

impl<T: GraphValue> InputField for InputSlot<T> {
    fn value_type(&self) -> ValueType {
        T::VALUE_TYPE
    }

    fn source(&self) -> Option<NodeId> {
        self.source
    }

    fn set_source(&mut self, source: Option<NodeId>) {
        self.source = source;
    }

    fn default_value(&self) -> Value {
        self.default.clone().into_value()
    }

    fn set_default_value(&mut self, value: &Value) -> bool {
        match T::from_value(value) {
            Some(v) => {
                self.default = v;
                true
            }
            None => false,
        }
    }
}

/// Named slot as declared by a node
pub type SlotRef<'a> = (&'static str, &'a dyn InputField);

/// Named mutable slot as declared by a node
pub type SlotMut<'a> = (&'static str, &'a mut dyn InputField);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_defaults() {
        let mut slot = InputSlot::new(2.0f32);
        assert_eq!(*slot.default_value(), 2.0);
        assert_eq!(slot.source(), None);
        slot.set_default(3.0);
        assert_eq!(InputField::default_value(&slot), Value::Float(3.0));
    }

    #[test]
    fn test_input_field_rejects_other_types() {
        let mut slot = InputSlot::new(1i32);
        let field: &mut dyn InputField = &mut slot;
        assert_eq!(field.value_type(), ValueType::Int);
        assert!(!field.set_default_value(&Value::Float(1.0)));
        assert!(field.set_default_value(&Value::Int(9)));
        field.set_source(Some(NodeId(4)));
        assert_eq!(slot, InputSlot::linked(9, NodeId(4)));
    }
}
