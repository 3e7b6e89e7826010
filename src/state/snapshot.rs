//! Immutable visualization state and field-level deltas between states.

use crate::error::Result;
use crate::types::Network;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::path::StatePath;
use super::selection::Selection;

/// Event label of the root snapshot.
pub const STARTED_PROVENANCE: &str = "startedProvenance";

/// Default node marker length and height.
pub const DEFAULT_MARKER_SIZE: f64 = 50.0;

/// Top-level fields of a [`StateSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateField {
    Network,
    Order,
    UserSelectedEdges,
    Selected,
    HardSelected,
    Search,
    Event,
    NodeMarkerLength,
    NodeMarkerHeight,
}

impl StateField {
    pub const ALL: [StateField; 9] = [
        StateField::Network,
        StateField::Order,
        StateField::UserSelectedEdges,
        StateField::Selected,
        StateField::HardSelected,
        StateField::Search,
        StateField::Event,
        StateField::NodeMarkerLength,
        StateField::NodeMarkerHeight,
    ];

    /// Key used in paths and in the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            StateField::Network => "network",
            StateField::Order => "order",
            StateField::UserSelectedEdges => "userSelectedEdges",
            StateField::Selected => "selected",
            StateField::HardSelected => "hardSelected",
            StateField::Search => "search",
            StateField::Event => "event",
            StateField::NodeMarkerLength => "nodeMarkerLength",
            StateField::NodeMarkerHeight => "nodeMarkerHeight",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// The full visualization state at one point in history.
///
/// Snapshots are never mutated once recorded; actions clone the current
/// snapshot, change the clone, and hand it back. The network is shared
/// behind an `Arc`, so cloning a snapshot does not copy the graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub network: Arc<Network>,
    pub order: Vec<String>,
    pub user_selected_edges: Vec<String>,
    pub selected: Selection,
    pub hard_selected: Vec<String>,
    pub search: Vec<String>,
    pub event: String,
    pub node_marker_length: f64,
    pub node_marker_height: f64,
}

impl StateSnapshot {
    /// Initial state for a freshly loaded network.
    pub fn new(network: impl Into<Arc<Network>>) -> Self {
        Self {
            network: network.into(),
            order: Vec::new(),
            user_selected_edges: Vec::new(),
            selected: Selection::new(),
            hard_selected: Vec::new(),
            search: Vec::new(),
            event: STARTED_PROVENANCE.to_string(),
            node_marker_length: DEFAULT_MARKER_SIZE,
            node_marker_height: DEFAULT_MARKER_SIZE,
        }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }

    pub fn with_marker_size(mut self, length: f64, height: f64) -> Self {
        self.node_marker_length = length;
        self.node_marker_height = height;
        self
    }

    /// Compare a single field. The network compares by pointer first.
    pub fn field_eq(&self, other: &StateSnapshot, field: StateField) -> bool {
        match field {
            StateField::Network => {
                Arc::ptr_eq(&self.network, &other.network) || self.network == other.network
            }
            StateField::Order => self.order == other.order,
            StateField::UserSelectedEdges => self.user_selected_edges == other.user_selected_edges,
            StateField::Selected => self.selected == other.selected,
            StateField::HardSelected => self.hard_selected == other.hard_selected,
            StateField::Search => self.search == other.search,
            StateField::Event => self.event == other.event,
            StateField::NodeMarkerLength => self.node_marker_length == other.node_marker_length,
            StateField::NodeMarkerHeight => self.node_marker_height == other.node_marker_height,
        }
    }

    /// Fields whose values differ between `self` and `other`.
    pub fn changed_fields(&self, other: &StateSnapshot) -> Vec<StateField> {
        StateField::ALL
            .into_iter()
            .filter(|f| !self.field_eq(other, *f))
            .collect()
    }

    /// JSON form of one field.
    pub fn field_value(&self, field: StateField) -> Result<serde_json::Value> {
        let value = match field {
            StateField::Network => serde_json::to_value(&*self.network)?,
            StateField::Order => serde_json::to_value(&self.order)?,
            StateField::UserSelectedEdges => serde_json::to_value(&self.user_selected_edges)?,
            StateField::Selected => serde_json::to_value(&self.selected)?,
            StateField::HardSelected => serde_json::to_value(&self.hard_selected)?,
            StateField::Search => serde_json::to_value(&self.search)?,
            StateField::Event => serde_json::to_value(&self.event)?,
            StateField::NodeMarkerLength => serde_json::to_value(self.node_marker_length)?,
            StateField::NodeMarkerHeight => serde_json::to_value(self.node_marker_height)?,
        };
        Ok(value)
    }

    /// Resolve `path` to a JSON value. Returns `None` when a segment below
    /// the field does not exist.
    pub fn value_at(&self, path: &StatePath) -> Result<Option<serde_json::Value>> {
        let Some(field) = path.head() else {
            return Ok(Some(serde_json::to_value(self)?));
        };

        let mut value = self.field_value(field)?;
        for segment in path.tail() {
            let next = match value {
                serde_json::Value::Object(mut map) => map.remove(segment),
                serde_json::Value::Array(mut arr) => match segment.parse::<usize>() {
                    Ok(i) if i < arr.len() => Some(arr.swap_remove(i)),
                    _ => None,
                },
                _ => None,
            };
            match next {
                Some(v) => value = v,
                None => return Ok(None),
            }
        }

        Ok(Some(value))
    }

    /// Whether the value at `path` differs between `self` and `other`.
    ///
    /// Whole fields are compared structurally; deeper paths are only
    /// resolved when the containing field changed.
    pub fn path_changed(&self, other: &StateSnapshot, path: &StatePath) -> Result<bool> {
        let Some(field) = path.head() else {
            return Ok(StateField::ALL.into_iter().any(|f| !self.field_eq(other, f)));
        };

        if self.field_eq(other, field) {
            return Ok(false);
        }
        if path.tail().is_empty() {
            return Ok(true);
        }

        Ok(self.value_at(path)? != other.value_at(path)?)
    }

    /// Field-level delta that turns `self` into `next`.
    pub fn diff(&self, next: &StateSnapshot) -> SnapshotDelta {
        let mut delta = SnapshotDelta::default();
        for field in self.changed_fields(next) {
            match field {
                StateField::Network => delta.network = Some(Arc::clone(&next.network)),
                StateField::Order => delta.order = Some(next.order.clone()),
                StateField::UserSelectedEdges => {
                    delta.user_selected_edges = Some(next.user_selected_edges.clone())
                }
                StateField::Selected => delta.selected = Some(next.selected.clone()),
                StateField::HardSelected => delta.hard_selected = Some(next.hard_selected.clone()),
                StateField::Search => delta.search = Some(next.search.clone()),
                StateField::Event => delta.event = Some(next.event.clone()),
                StateField::NodeMarkerLength => {
                    delta.node_marker_length = Some(next.node_marker_length)
                }
                StateField::NodeMarkerHeight => {
                    delta.node_marker_height = Some(next.node_marker_height)
                }
            }
        }
        delta
    }

    /// New snapshot with `delta` applied on top of `self`.
    pub fn apply_delta(&self, delta: &SnapshotDelta) -> StateSnapshot {
        let mut next = self.clone();
        if let Some(network) = &delta.network {
            next.network = Arc::clone(network);
        }
        if let Some(order) = &delta.order {
            next.order = order.clone();
        }
        if let Some(edges) = &delta.user_selected_edges {
            next.user_selected_edges = edges.clone();
        }
        if let Some(selected) = &delta.selected {
            next.selected = selected.clone();
        }
        if let Some(hard) = &delta.hard_selected {
            next.hard_selected = hard.clone();
        }
        if let Some(search) = &delta.search {
            next.search = search.clone();
        }
        if let Some(event) = &delta.event {
            next.event = event.clone();
        }
        if let Some(length) = delta.node_marker_length {
            next.node_marker_length = length;
        }
        if let Some(height) = delta.node_marker_height {
            next.node_marker_height = height;
        }
        next
    }
}

/// Fields that changed between a history node and its parent.
///
/// `None` means "same as parent".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapshotDelta {
    pub network: Option<Arc<Network>>,
    pub order: Option<Vec<String>>,
    pub user_selected_edges: Option<Vec<String>>,
    pub selected: Option<Selection>,
    pub hard_selected: Option<Vec<String>>,
    pub search: Option<Vec<String>>,
    pub event: Option<String>,
    pub node_marker_length: Option<f64>,
    pub node_marker_height: Option<f64>,
}

impl SnapshotDelta {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    pub fn changed_fields(&self) -> Vec<StateField> {
        let mut fields = Vec::new();
        if self.network.is_some() {
            fields.push(StateField::Network);
        }
        if self.order.is_some() {
            fields.push(StateField::Order);
        }
        if self.user_selected_edges.is_some() {
            fields.push(StateField::UserSelectedEdges);
        }
        if self.selected.is_some() {
            fields.push(StateField::Selected);
        }
        if self.hard_selected.is_some() {
            fields.push(StateField::HardSelected);
        }
        if self.search.is_some() {
            fields.push(StateField::Search);
        }
        if self.event.is_some() {
            fields.push(StateField::Event);
        }
        if self.node_marker_length.is_some() {
            fields.push(StateField::NodeMarkerLength);
        }
        if self.node_marker_height.is_some() {
            fields.push(StateField::NodeMarkerHeight);
        }
        fields
    }
}
