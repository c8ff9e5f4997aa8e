// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted graph layout.
//!
//! A layout stores nodes by stable ID and type tag, each slot's literal and
//! optional source ID, each dynamic value's record, and the output node.
//! Loading goes through a [`NodeRegistry`] and must be followed by a fixup
//! pass before `init`; [`NodeGraph::from_layout`] does both.

use crate::error::LayoutError;
use crate::graph::{BindReport, NodeGraph};
use crate::node::{Node, NodeId, NodeRegistry};
use crate::objects::ObjectTable;
use crate::settings::GraphSettings;
use crate::source::ValueRecord;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Persisted input slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRecord {
    /// Literal used while unlinked
    pub default: Value,
    /// Linked node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<NodeId>,
}

/// Persisted node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Stable node ID
    pub id: NodeId,
    /// Registry type tag
    pub node_type: String,
    /// Input slots by name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub slots: IndexMap<String, SlotRecord>,
    /// Dynamic values by name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: IndexMap<String, ValueRecord>,
}

/// Persisted graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLayout {
    /// Graph name
    pub name: String,
    /// Nodes
    pub nodes: Vec<NodeRecord>,
    /// Output node
    #[serde(default)]
    pub output: Option<NodeId>,
}

impl GraphLayout {
    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Load a layout from a RON file
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_ron(&content)?)
    }

    /// Save the layout to a RON file
    pub fn save(&self, path: &Path) -> Result<(), LayoutError> {
        let ron_str = self.to_ron()?;
        std::fs::write(path, ron_str)?;
        Ok(())
    }

    /// Construct the nodes through `registry`, without binding host
    /// objects.
    ///
    /// Slots or values the node type does not declare, and literals of the
    /// wrong type, are skipped with a warning.
    pub fn build(
        &self,
        registry: &NodeRegistry,
        settings: GraphSettings,
    ) -> Result<NodeGraph, LayoutError> {
        let strict = settings.strict_links;
        let mut graph = NodeGraph::new(self.name.clone()).with_settings(settings);

        for record in &self.nodes {
            let mut node = registry
                .create_node(&record.node_type)
                .ok_or_else(|| LayoutError::UnknownNodeType(record.node_type.clone()))?;
            apply_record(record, node.as_mut());
            graph.insert_node(record.id, node)?;
        }

        if let Some(output) = self.output {
            graph.set_output(output)?;
        }

        if strict {
            if let Some(dangling) = graph.links().dangling().first() {
                return Err(LayoutError::DanglingLink {
                    node: dangling.node,
                    slot: dangling.slot.to_string(),
                    missing: dangling.source,
                });
            }
        }

        Ok(graph)
    }
}

fn apply_record(record: &NodeRecord, node: &mut dyn Node) {
    {
        let mut slots = node.slots_mut();
        for (name, slot_record) in &record.slots {
            let Some((_, slot)) = slots.iter_mut().find(|(n, _)| *n == name.as_str()) else {
                tracing::warn!(
                    "Node {} ({}) has no slot '{}'",
                    record.id,
                    record.node_type,
                    name
                );
                continue;
            };
            if !slot.set_default_value(&slot_record.default) {
                tracing::warn!(
                    "Node {} slot '{}' expects {}, layout has {}",
                    record.id,
                    name,
                    slot.value_type(),
                    slot_record.default.value_type()
                );
            }
            slot.set_source(slot_record.source);
        }
    }

    let mut values = node.values_mut();
    for (name, value_record) in &record.values {
        let Some((_, value)) = values.iter_mut().find(|(n, _)| *n == name.as_str()) else {
            tracing::warn!(
                "Node {} ({}) has no value '{}'",
                record.id,
                record.node_type,
                name
            );
            continue;
        };
        if !value.load(value_record) {
            tracing::warn!(
                "Node {} value '{}' expects {}, layout has {}",
                record.id,
                name,
                value.value_type(),
                value_record.value.value_type()
            );
        }
    }
}

impl NodeGraph {
    /// Load a graph from a layout and run the fixup pass against `objects`
    pub fn from_layout(
        layout: &GraphLayout,
        registry: &NodeRegistry,
        objects: &ObjectTable,
        settings: GraphSettings,
    ) -> Result<(Self, BindReport), LayoutError> {
        let mut graph = layout.build(registry, settings)?;
        let report = graph.fixup(objects);
        Ok((graph, report))
    }

    /// Persisted form of this graph
    pub fn to_layout(&self) -> GraphLayout {
        let nodes = self
            .node_ids()
            .filter_map(|id| {
                let node = self.node(id)?;
                let slots = node
                    .slots()
                    .into_iter()
                    .map(|(name, slot)| {
                        let record = SlotRecord {
                            default: slot.default_value(),
                            source: slot.source(),
                        };
                        (name.to_string(), record)
                    })
                    .collect();
                let values = node
                    .values()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.record()))
                    .collect();
                Some(NodeRecord {
                    id,
                    node_type: node.node_type().to_string(),
                    slots,
                    values,
                })
            })
            .collect();

        GraphLayout {
            name: self.name.clone(),
            nodes,
            output: self.output_node(),
        }
    }
}
