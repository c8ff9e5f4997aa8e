// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node types.

pub mod float;
pub mod input;

pub use float::{FloatAddNode, FloatMaxNode, SquareWaveNode};
pub use input::{input_type_tag, InputNode};

use crate::node::NodeRegistry;
use crate::value::{Color, ValueType};

/// Type tag of [`FloatAddNode`]
pub const FLOAT_ADD: &str = "float_add";
/// Type tag of [`FloatMaxNode`]
pub const FLOAT_MAX: &str = "float_max";
/// Type tag of [`SquareWaveNode`]
pub const SQUARE_WAVE: &str = "square_wave";

/// Create a registry holding every built-in node type
pub fn create_builtin_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // Float math
    registry.register_default::<FloatAddNode>(FLOAT_ADD, "Add", "Sum of two floats");
    registry.register_default::<FloatMaxNode>(FLOAT_MAX, "Max", "Larger of two floats");
    registry.register_default::<SquareWaveNode>(
        SQUARE_WAVE,
        "Square Wave",
        "Alternates between 0 and 1 at the given frequency",
    );

    // Input nodes
    registry.register_default::<InputNode<bool>>(
        input_type_tag(ValueType::Bool),
        "Bool Input",
        "Externally supplied bool",
    );
    registry.register_default::<InputNode<i32>>(
        input_type_tag(ValueType::Int),
        "Int Input",
        "Externally supplied integer",
    );
    registry.register_default::<InputNode<f32>>(
        input_type_tag(ValueType::Float),
        "Float Input",
        "Externally supplied float",
    );
    registry.register_default::<InputNode<[f32; 2]>>(
        input_type_tag(ValueType::Vector2),
        "Vector2 Input",
        "Externally supplied 2D vector",
    );
    registry.register_default::<InputNode<[f32; 3]>>(
        input_type_tag(ValueType::Vector3),
        "Vector3 Input",
        "Externally supplied 3D vector",
    );
    registry.register_default::<InputNode<[f32; 4]>>(
        input_type_tag(ValueType::Vector4),
        "Vector4 Input",
        "Externally supplied 4D vector",
    );
    registry.register_default::<InputNode<Color>>(
        input_type_tag(ValueType::Color),
        "Color Input",
        "Externally supplied color",
    );
    registry.register_default::<InputNode<String>>(
        input_type_tag(ValueType::String),
        "String Input",
        "Externally supplied string",
    );

    registry
}
