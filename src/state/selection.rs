//! Selection model: selected node ids mapped to their cached neighbour sets.
//!
//! A key being present means the node is selected. The neighbour set is
//! cached at selection time so highlight propagation never has to walk the
//! edge table again.

use crate::types::{LinkRow, Network, NodeRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use super::snapshot::StateSnapshot;

/// Selected node ids with their neighbour sets.
///
/// Membership is a hash lookup. Anything that needs a stable order
/// ([`Selection::ids`], [`Selection::highlighted_nodes`]) sorts on the way out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(HashMap<String, BTreeSet<String>>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, node_id: &str) -> bool {
        self.0.contains_key(node_id)
    }

    /// Cached neighbours of a selected node.
    pub fn neighbors_of(&self, node_id: &str) -> Option<&BTreeSet<String>> {
        self.0.get(node_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selected node ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        let mut ids: Vec<&str> = self.0.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids.into_iter()
    }

    /// Selected nodes with their neighbours, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Select `node`, replacing any previously cached neighbours.
    pub fn insert(&mut self, node: &NodeRef) {
        self.0.insert(node.id.clone(), node.neighbors.clone());
    }

    /// Deselect a node. Returns true if it was selected.
    pub fn remove(&mut self, node_id: &str) -> bool {
        self.0.remove(node_id).is_some()
    }

    /// Flip membership of `node`. Returns true if the node is selected afterwards.
    pub fn toggle(&mut self, node: &NodeRef) -> bool {
        if self.remove(&node.id) {
            false
        } else {
            self.insert(node);
            true
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Drop every selected id not present in `node_ids`.
    pub fn retain_nodes(&mut self, node_ids: &HashSet<&str>) {
        self.0.retain(|id, _| node_ids.contains(id.as_str()));
    }

    /// Selected nodes plus all of their cached neighbours.
    pub fn highlighted_nodes(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        for (id, neighbors) in &self.0 {
            out.insert(id.as_str());
            out.extend(neighbors.iter().map(String::as_str));
        }
        out
    }

    /// Edges with at least one selected endpoint.
    pub fn highlighted_links<'a>(&self, network: &'a Network) -> Vec<&'a LinkRow> {
        network
            .edges()
            .iter()
            .filter(|e| self.is_selected(&e.from) || self.is_selected(&e.to))
            .collect()
    }
}

impl FromIterator<NodeRef> for Selection {
    fn from_iter<T: IntoIterator<Item = NodeRef>>(iter: T) -> Self {
        Self(iter.into_iter().map(|n| (n.id, n.neighbors)).collect())
    }
}

/// Check whether `node` is selected in `snapshot`.
pub fn is_selected(node: &NodeRef, snapshot: &StateSnapshot) -> bool {
    snapshot.selected.is_selected(&node.id)
}
