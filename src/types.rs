//! Core types shared across the engine.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a node in the history tree.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HistoryNodeId(pub u64);

impl HistoryNodeId {
    /// The root node of every history tree.
    pub const ROOT: HistoryNodeId = HistoryNodeId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Debug for HistoryNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HistoryNodeId({})", self.0)
    }
}

impl fmt::Display for HistoryNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Microseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time. A clock set before the epoch reads as zero.
    pub fn now() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(0);
        Timestamp(micros)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// A node row as delivered by the data service.
///
/// Any column other than the document id and key lands in `attributes`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_key", default)]
    pub key: String,

    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl NodeRow {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let key = id.rsplit('/').next().unwrap_or(id.as_str()).to_string();
        Self {
            id,
            key,
            attributes: serde_json::Map::new(),
        }
    }
}

/// An edge row as delivered by the data service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkRow {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_from")]
    pub from: String,

    #[serde(rename = "_to")]
    pub to: String,

    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl LinkRow {
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            attributes: serde_json::Map::new(),
        }
    }
}

/// A loaded multi-net graph: node rows from every node table plus the edge table.
///
/// Rows are fixed once constructed. Node lookups go through an id index that
/// is built on first use.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Network {
    nodes: Vec<NodeRow>,
    edges: Vec<LinkRow>,

    #[serde(skip)]
    index: OnceLock<HashMap<String, usize>>,
}

impl PartialEq for Network {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}

impl Network {
    pub fn new(nodes: Vec<NodeRow>, edges: Vec<LinkRow>) -> Self {
        Self {
            nodes,
            edges,
            index: OnceLock::new(),
        }
    }

    pub fn nodes(&self) -> &[NodeRow] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LinkRow] {
        &self.edges
    }

    fn index(&self) -> &HashMap<String, usize> {
        self.index.get_or_init(|| {
            self.nodes
                .iter()
                .enumerate()
                .map(|(pos, n)| (n.id.clone(), pos))
                .collect()
        })
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index().contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&NodeRow> {
        self.index().get(id).map(|&pos| &self.nodes[pos])
    }

    /// Set of all node ids.
    pub fn node_ids(&self) -> HashSet<&str> {
        self.index().keys().map(String::as_str).collect()
    }

    /// Build a [`NodeRef`] for `id` with its neighbours taken from the edge table.
    ///
    /// Returns `None` if the node is not part of this network.
    pub fn node_ref(&self, id: &str) -> Option<NodeRef> {
        if !self.contains_node(id) {
            return None;
        }

        let neighbors = self
            .edges
            .iter()
            .filter_map(|e| {
                if e.from == id {
                    Some(e.to.clone())
                } else if e.to == id {
                    Some(e.from.clone())
                } else {
                    None
                }
            })
            .collect();

        Some(NodeRef {
            id: id.to_string(),
            neighbors,
        })
    }
}

/// A node reference handed over by the rendering side, with its neighbour
/// set already computed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: String,
    pub neighbors: BTreeSet<String>,
}

impl NodeRef {
    pub fn new<I, S>(id: impl Into<String>, neighbors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            neighbors: neighbors.into_iter().map(Into::into).collect(),
        }
    }
}
