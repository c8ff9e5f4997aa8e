// SPDX-License-Identifier: MIT OR Apache-2.0
//! OrdoPlay Dataflow - Node graph runtime
//!
//! This crate evaluates dataflow graphs authored in the editor:
//! - Nodes with typed input slots that hold a literal or link to another node
//! - Dynamic values bound to host objects by name during a fixup pass
//! - Tick ordering derived from the links, with cycle rejection
//! - Pull evaluation of the graph's output node
//! - RON layouts and settings

pub mod error;
pub mod evaluation;
pub mod graph;
pub mod layout;
pub mod links;
pub mod node;
pub mod nodes;
pub mod objects;
pub mod order;
pub mod settings;
pub mod slot;
pub mod source;
pub mod value;

pub use error::{GraphError, LayoutError};
pub use evaluation::EvaluationContext;
pub use graph::{BindReport, NodeGraph};
pub use layout::{GraphLayout, NodeRecord, SlotRecord};
pub use links::{DanglingLink, Links};
pub use node::{Node, NodeId, NodeRegistry, NodeType};
pub use objects::{ObjectRecord, ObjectTable, SharedValue, SourceList, SourceObject};
pub use order::OrderStrategy;
pub use settings::GraphSettings;
pub use slot::{InputField, InputSlot};
pub use source::{DynamicField, DynamicValue, SourceMode, SourceRef, ValueRecord, ValueSource, ValueSourceContainer};
pub use value::{Color, GraphValue, Value, ValueType};
