//! Serializable views of the history tree, for inspection and debugging.

use crate::actions::ActionCategory;
use crate::error::Result;
use crate::types::HistoryNodeId;
use serde::{Deserialize, Serialize};

use super::graph::HistoryNode;

/// Summary of a single history node (state payload omitted).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryNodeSummary {
    pub id: HistoryNodeId,
    pub parent: Option<HistoryNodeId>,
    pub children: Vec<HistoryNodeId>,
    pub label: String,
    pub category: Option<ActionCategory>,
    pub depth: usize,
    /// Whether the node stores a full snapshot rather than a delta.
    pub full_state: bool,
    pub created: i64,
}

impl HistoryNodeSummary {
    pub fn from_node(node: &HistoryNode) -> Self {
        Self {
            id: node.id(),
            parent: node.parent(),
            children: node.children().to_vec(),
            label: node.label().to_string(),
            category: node.category().cloned(),
            depth: node.depth(),
            full_state: node.is_full(),
            created: node.created().0,
        }
    }
}

/// Summary of the whole tree plus the cursor position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub current: HistoryNodeId,
    pub nodes: Vec<HistoryNodeSummary>,
}

impl HistorySummary {
    /// Nodes with more than one child.
    pub fn branch_points(&self) -> impl Iterator<Item = &HistoryNodeSummary> {
        self.nodes.iter().filter(|n| n.children.len() > 1)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &HistoryNodeSummary> {
        self.nodes.iter().filter(|n| n.children.is_empty())
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
