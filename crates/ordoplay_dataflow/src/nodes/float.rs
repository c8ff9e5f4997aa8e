// SPDX-License-Identifier: MIT OR Apache-2.0
//! Float math nodes.

use crate::evaluation::EvaluationContext;
use crate::node::Node;
use crate::slot::{InputField, InputSlot, SlotMut, SlotRef};
use crate::value::{Value, ValueType};
use std::any::Any;

/// Outputs `a + b`
#[derive(Debug, Clone, Default)]
pub struct FloatAddNode {
    /// First operand
    pub a: InputSlot<f32>,
    /// Second operand
    pub b: InputSlot<f32>,
}

impl FloatAddNode {
    /// Create with literal operands
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            a: InputSlot::new(a),
            b: InputSlot::new(b),
        }
    }
}

impl Node for FloatAddNode {
    fn node_type(&self) -> &'static str {
        super::FLOAT_ADD
    }

    fn slots(&self) -> Vec<SlotRef<'_>> {
        vec![
            ("a", &self.a as &dyn InputField),
            ("b", &self.b as &dyn InputField),
        ]
    }

    fn slots_mut(&mut self) -> Vec<SlotMut<'_>> {
        vec![
            ("a", &mut self.a as &mut dyn InputField),
            ("b", &mut self.b as &mut dyn InputField),
        ]
    }

    fn output_type(&self) -> Option<ValueType> {
        Some(ValueType::Float)
    }

    fn output(&self, ctx: &EvaluationContext<'_>) -> Option<Value> {
        Some(Value::Float(self.a.value(ctx) + self.b.value(ctx)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Outputs the larger of `a` and `b`
#[derive(Debug, Clone, Default)]
pub struct FloatMaxNode {
    /// First operand
    pub a: InputSlot<f32>,
    /// Second operand
    pub b: InputSlot<f32>,
}

impl FloatMaxNode {
    /// Create with literal operands
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            a: InputSlot::new(a),
            b: InputSlot::new(b),
        }
    }
}

impl Node for FloatMaxNode {
    fn node_type(&self) -> &'static str {
        super::FLOAT_MAX
    }

    fn slots(&self) -> Vec<SlotRef<'_>> {
        vec![
            ("a", &self.a as &dyn InputField),
            ("b", &self.b as &dyn InputField),
        ]
    }

    fn slots_mut(&mut self) -> Vec<SlotMut<'_>> {
        vec![
            ("a", &mut self.a as &mut dyn InputField),
            ("b", &mut self.b as &mut dyn InputField),
        ]
    }

    fn output_type(&self) -> Option<ValueType> {
        Some(ValueType::Float)
    }

    fn output(&self, ctx: &EvaluationContext<'_>) -> Option<Value> {
        Some(Value::Float(self.a.value(ctx).max(self.b.value(ctx))))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Square wave alternating between 0 and 1.
///
/// Phase advances by `delta_time * frequency` per tick; the output is 1
/// while the phase modulo 2 is above 1.
#[derive(Debug, Clone)]
pub struct SquareWaveNode {
    /// Phase advanced per unit of delta time; one full period is 2
    pub frequency: InputSlot<f32>,
    time: f32,
    value: f32,
}

impl SquareWaveNode {
    /// Create with a literal frequency
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency: InputSlot::new(frequency),
            time: 0.0,
            value: 0.0,
        }
    }

    /// Accumulated phase
    pub fn phase(&self) -> f32 {
        self.time
    }
}

impl Default for SquareWaveNode {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Node for SquareWaveNode {
    fn node_type(&self) -> &'static str {
        super::SQUARE_WAVE
    }

    fn slots(&self) -> Vec<SlotRef<'_>> {
        vec![("frequency", &self.frequency as &dyn InputField)]
    }

    fn slots_mut(&mut self) -> Vec<SlotMut<'_>> {
        vec![("frequency", &mut self.frequency as &mut dyn InputField)]
    }

    fn output_type(&self) -> Option<ValueType> {
        Some(ValueType::Float)
    }

    fn output(&self, _ctx: &EvaluationContext<'_>) -> Option<Value> {
        Some(Value::Float(self.value))
    }

    fn init(&mut self) {
        self.time = 0.0;
        self.value = 0.0;
    }

    fn update(&mut self, delta_time: f32, ctx: &EvaluationContext<'_>) {
        self.time += delta_time * self.frequency.value(ctx);
        self.value = if self.time % 2.0 > 1.0 { 1.0 } else { 0.0 };
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
