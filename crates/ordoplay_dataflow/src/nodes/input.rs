// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input nodes: entry points for externally supplied values.

use crate::evaluation::EvaluationContext;
use crate::node::Node;
use crate::source::{DynamicField, DynamicValue, ValueSource};
use crate::value::{GraphValue, Value, ValueType};
use std::any::Any;

/// Type tag of the input node producing `value_type`
pub fn input_type_tag(value_type: ValueType) -> &'static str {
    match value_type {
        ValueType::Bool => "bool_input",
        ValueType::Int => "int_input",
        ValueType::Float => "float_input",
        ValueType::Vector2 => "vector2_input",
        ValueType::Vector3 => "vector3_input",
        ValueType::Vector4 => "vector4_input",
        ValueType::Color => "color_input",
        ValueType::String => "string_input",
    }
}

/// Outputs a value pushed by the host or bound to a host object
#[derive(Debug, Default)]
pub struct InputNode<T: GraphValue> {
    /// The supplied value
    pub value: DynamicValue<T>,
}

impl<T: GraphValue> InputNode<T> {
    /// Create with a literal value
    pub fn new(value: T) -> Self {
        Self {
            value: DynamicValue::constant(value),
        }
    }

    /// Create reading from a host object reference, bound during fixup
    pub fn bound(value: DynamicValue<T>) -> Self {
        Self { value }
    }
}

impl<T: GraphValue> Node for InputNode<T> {
    fn node_type(&self) -> &'static str {
        input_type_tag(T::VALUE_TYPE)
    }

    fn values(&self) -> Vec<(&'static str, &dyn DynamicField)> {
        vec![("value", &self.value as &dyn DynamicField)]
    }

    fn values_mut(&mut self) -> Vec<(&'static str, &mut dyn DynamicField)> {
        vec![("value", &mut self.value as &mut dyn DynamicField)]
    }

    fn output_type(&self) -> Option<ValueType> {
        Some(T::VALUE_TYPE)
    }

    fn output(&self, _ctx: &EvaluationContext<'_>) -> Option<Value> {
        Some(self.value.value().into_value())
    }

    fn is_input(&self) -> bool {
        true
    }

    fn input_value_mut(&mut self) -> Option<&mut dyn DynamicField> {
        Some(&mut self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
