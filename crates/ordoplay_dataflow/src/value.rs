// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime values that flow between nodes.
//!
//! Nodes are stored type-erased, so node outputs travel as [`Value`] and are
//! converted back into concrete Rust types through [`GraphValue`] at the
//! reading end.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type produced by a node output or accepted by an input slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// 4D vector
    Vector4,
    /// Color (RGBA)
    Color,
    /// String value
    String,
}

impl ValueType {
    /// Zero value for this type
    pub fn zero(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::Vector2 => Value::Vector2([0.0; 2]),
            Self::Vector3 => Value::Vector3([0.0; 3]),
            Self::Vector4 => Value::Vector4([0.0; 4]),
            Self::Color => Value::Color(Color::default()),
            Self::String => Value::String(String::new()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vector2 => "vector2",
            Self::Vector3 => "vector3",
            Self::Vector4 => "vector4",
            Self::Color => "color",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Create a color from its components
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// 4D vector
    Vector4([f32; 4]),
    /// Color
    Color(Color),
    /// String
    String(String),
}

impl Value {
    /// Get the type tag of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Vector2(_) => ValueType::Vector2,
            Self::Vector3(_) => ValueType::Vector3,
            Self::Vector4(_) => ValueType::Vector4,
            Self::Color(_) => ValueType::Color,
            Self::String(_) => ValueType::String,
        }
    }

    /// Convert into a concrete type, `None` if the types differ
    pub fn get<T: GraphValue>(&self) -> Option<T> {
        T::from_value(self)
    }
}

/// Rust types that can travel through a graph as a [`Value`].
///
/// Conversions are exact: a `Value::Int` never converts to `f32`. The
/// `Default` impl doubles as the zero value returned whenever a binding
/// cannot be resolved.
pub trait GraphValue: Clone + Default + Send + Sync + 'static {
    /// Type tag of this Rust type
    const VALUE_TYPE: ValueType;

    /// Wrap into a [`Value`]
    fn into_value(self) -> Value;

    /// Unwrap from a [`Value`] of the matching type
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_graph_value {
    ($ty:ty, $variant:ident) => {
        impl GraphValue for $ty {
            const VALUE_TYPE: ValueType = ValueType::$variant;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }
    };
}

impl_graph_value!(bool, Bool);
impl_graph_value!(i32, Int);
impl_graph_value!(f32, Float);
impl_graph_value!([f32; 2], Vector2);
impl_graph_value!([f32; 3], Vector3);
impl_graph_value!([f32; 4], Vector4);
impl_graph_value!(Color, Color);
impl_graph_value!(String, String);
