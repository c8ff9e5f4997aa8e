// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph runtime settings.

use crate::order::OrderStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings applied to a [`NodeGraph`](crate::NodeGraph)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Tick order strategy
    pub ordering: OrderStrategy,
    /// Fail layout loading on links to missing nodes instead of reading zero
    pub strict_links: bool,
    /// Limit on nested output resolution, defaults to the node count
    pub max_resolve_depth: Option<usize>,
}

impl GraphSettings {
    /// Settings using the legacy rank walk ordering
    pub fn legacy() -> Self {
        Self {
            ordering: OrderStrategy::LegacyRankWalk,
            ..Self::default()
        }
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let ron_str = self
            .to_ron()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, ron_str)
    }
}
