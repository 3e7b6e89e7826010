//! Built-in actions for the node-link view.

use crate::types::{Network, NodeRef};
use std::collections::HashSet;
use std::sync::Arc;

use super::action::{Action, ActionCategory};

pub const SELECT_NODE: &str = "select node";
pub const CLEAR_SELECTION: &str = "clear selection";
pub const SELECT_EDGE: &str = "select edge";
pub const LOAD_NETWORK: &str = "load network";
pub const SET_MARKER_SIZE: &str = "set marker size";
pub const SEARCH: &str = "search";
pub const REORDER: &str = "reorder";

/// Toggle selection of `node`.
///
/// Deselects if the node is already selected, otherwise selects it and caches
/// its neighbour set for highlighting.
pub fn select_node(node: NodeRef) -> Action {
    Action::new(SELECT_NODE, move |mut state| {
        state.selected.toggle(&node);
        state
    })
    .event_type(ActionCategory::Selection)
    .always_store_state(true)
}

pub fn clear_selection() -> Action {
    Action::new(CLEAR_SELECTION, |mut state| {
        state.selected.clear();
        state.hard_selected.clear();
        state
    })
    .event_type(ActionCategory::Selection)
    .always_store_state(true)
}

/// Toggle membership of an edge id in the user-selected edges.
pub fn toggle_edge_selection(edge_id: impl Into<String>) -> Action {
    let edge_id = edge_id.into();
    Action::new(SELECT_EDGE, move |mut state| {
        if let Some(pos) = state.user_selected_edges.iter().position(|e| *e == edge_id) {
            state.user_selected_edges.remove(pos);
        } else {
            state.user_selected_edges.push(edge_id);
        }
        state
    })
    .event_type(ActionCategory::Selection)
    .always_store_state(true)
}

/// Swap in a freshly loaded network.
///
/// Selection state refers to node and edge ids of the old network, so the
/// node selection, hard selection and edge selection are cleared. Ordering
/// keeps only ids that still exist.
pub fn replace_network(network: impl Into<Arc<Network>>) -> Action {
    let network = network.into();
    Action::new(LOAD_NETWORK, move |mut state| {
        {
            let ids: HashSet<&str> = network.node_ids();
            state.order.retain(|id| ids.contains(id.as_str()));
        }
        state.selected.clear();
        state.hard_selected.clear();
        state.user_selected_edges.clear();
        state.network = network;
        state
    })
    .event_type(ActionCategory::Network)
    .always_store_state(true)
}

pub fn set_marker_size(length: f64, height: f64) -> Action {
    Action::new(SET_MARKER_SIZE, move |state| state.with_marker_size(length, height))
        .event_type(ActionCategory::Display)
}

pub fn set_search(terms: Vec<String>) -> Action {
    Action::new(SEARCH, move |mut state| {
        state.search = terms;
        state
    })
    .event_type(ActionCategory::Search)
}

pub fn set_order(order: Vec<String>) -> Action {
    Action::new(REORDER, move |mut state| {
        state.order = order;
        state
    })
    .event_type(ActionCategory::Display)
}
