//! Session object tying history, actions, and observers together.

use crate::actions::{catalog, Action};
use crate::error::{ProvenanceError, Result};
use crate::history::{HistoryGraph, HistorySummary, Navigation};
use crate::observers::{ObserverId, ObserverRegistry, SubscriptionHandle};
use crate::state::{StatePath, StateSnapshot, DEFAULT_MARKER_SIZE, STARTED_PROVENANCE};
use crate::types::{HistoryNodeId, Network, NodeRef};
use std::sync::Arc;
use tracing::debug;

/// Provenance configuration.
#[derive(Clone, Debug)]
pub struct ProvenanceConfig {
    /// Force a full snapshot once a node would be this many deltas away
    /// from its nearest full ancestor.
    pub snapshot_every: u64,

    /// Rebuilt delta states kept in memory (number of states).
    pub state_cache_size: usize,

    /// Marker length and height of the initial state.
    pub default_marker_size: f64,

    /// Event label of the root snapshot.
    pub initial_event: String,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            snapshot_every: 16,
            state_cache_size: 64,
            default_marker_size: DEFAULT_MARKER_SIZE,
            initial_event: STARTED_PROVENANCE.to_string(),
        }
    }
}

impl ProvenanceConfig {
    /// Root snapshot for `network` under this configuration.
    pub fn initial_state(&self, network: impl Into<Arc<Network>>) -> StateSnapshot {
        StateSnapshot::new(network)
            .with_event(self.initial_event.clone())
            .with_marker_size(self.default_marker_size, self.default_marker_size)
    }
}

/// One visualization session's interaction history.
///
/// Provides a single entry point for:
/// - Applying named actions to the current state
/// - Undo, redo, and explicit branch selection
/// - Subscribing renderers to state changes
///
/// Each session owns its own history; nothing is global.
pub struct Provenance {
    config: ProvenanceConfig,
    history: HistoryGraph,
    observers: ObserverRegistry,
}

impl Provenance {
    /// Start a session for a freshly loaded network.
    pub fn new(network: impl Into<Arc<Network>>) -> Result<Self> {
        Self::with_config(network, ProvenanceConfig::default())
    }

    pub fn with_config(network: impl Into<Arc<Network>>, config: ProvenanceConfig) -> Result<Self> {
        let initial = config.initial_state(network);
        Self::from_snapshot(initial, config)
    }

    /// Start a session from an explicit root snapshot.
    pub fn from_snapshot(initial: StateSnapshot, config: ProvenanceConfig) -> Result<Self> {
        let history = HistoryGraph::with_config(initial, &config)?;
        debug!(
            nodes = history.current_state().network.nodes().len(),
            edges = history.current_state().network.edges().len(),
            "Started provenance"
        );

        Ok(Self {
            config,
            history,
            observers: ObserverRegistry::new(),
        })
    }

    // --- Actions ---

    /// Apply `action` to a copy of the current state, record the result as a
    /// new child of the cursor, and notify observers.
    ///
    /// The resulting snapshot's `event` is set to the action label.
    pub fn apply(&mut self, action: Action) -> Result<HistoryNodeId> {
        if action.label().trim().is_empty() {
            return Err(ProvenanceError::EmptyActionLabel);
        }

        let (meta, transform) = action.into_parts();
        let previous = Arc::clone(self.history.current_state());

        let mut next = transform(StateSnapshot::clone(&previous));
        next.event = meta.label.clone();

        let label = meta.label.clone();
        let id = self.history.record(next, meta)?;
        debug!(node = %id, action = %label, depth = self.history.depth(), "Applied action");

        let current = Arc::clone(self.history.current_state());
        self.observers.dispatch(Some(previous.as_ref()), Some(&current))?;
        Ok(id)
    }

    /// Toggle selection of `node`.
    ///
    /// Selecting a node that is not part of the current network fails with
    /// [`ProvenanceError::UnknownNode`]; deselecting always succeeds.
    pub fn select_node(&mut self, node: NodeRef) -> Result<HistoryNodeId> {
        let state = self.history.current_state();
        if !state.selected.is_selected(&node.id) && !state.network.contains_node(&node.id) {
            return Err(ProvenanceError::UnknownNode(node.id));
        }
        self.apply(catalog::select_node(node))
    }

    /// Toggle selection of a node by id, taking neighbours from the network.
    ///
    /// An already selected id is deselected even if the current network no
    /// longer has it.
    pub fn select_node_by_id(&mut self, id: &str) -> Result<HistoryNodeId> {
        let state = self.history.current_state();
        let node = match state.selected.neighbors_of(id) {
            Some(neighbors) => NodeRef::new(id, neighbors.iter().cloned()),
            None => state
                .network
                .node_ref(id)
                .ok_or_else(|| ProvenanceError::UnknownNode(id.to_string()))?,
        };
        self.apply(catalog::select_node(node))
    }

    pub fn clear_selection(&mut self) -> Result<HistoryNodeId> {
        self.apply(catalog::clear_selection())
    }

    pub fn toggle_edge_selection(&mut self, edge_id: impl Into<String>) -> Result<HistoryNodeId> {
        self.apply(catalog::toggle_edge_selection(edge_id))
    }

    /// Swap in a new network. Selection state is cleared.
    pub fn replace_network(&mut self, network: impl Into<Arc<Network>>) -> Result<HistoryNodeId> {
        self.apply(catalog::replace_network(network))
    }

    pub fn set_marker_size(&mut self, length: f64, height: f64) -> Result<HistoryNodeId> {
        self.apply(catalog::set_marker_size(length, height))
    }

    pub fn set_search(&mut self, terms: Vec<String>) -> Result<HistoryNodeId> {
        self.apply(catalog::set_search(terms))
    }

    pub fn set_order(&mut self, order: Vec<String>) -> Result<HistoryNodeId> {
        self.apply(catalog::set_order(order))
    }

    // --- Navigation ---

    /// Step back to the parent state. A no-op at the root.
    pub fn undo(&mut self) -> Result<Navigation> {
        let previous = Arc::clone(self.history.current_state());
        let nav = self.history.undo();
        self.after_navigation("undo", &previous, nav)
    }

    /// Step forward to the most recent child state. A no-op at a leaf.
    pub fn redo(&mut self) -> Result<Navigation> {
        let previous = Arc::clone(self.history.current_state());
        let nav = self.history.redo();
        self.after_navigation("redo", &previous, nav)
    }

    /// Step forward into a specific child branch.
    pub fn redo_to(&mut self, child: HistoryNodeId) -> Result<Navigation> {
        let previous = Arc::clone(self.history.current_state());
        let nav = self.history.redo_to(child)?;
        self.after_navigation("redo_to", &previous, nav)
    }

    fn after_navigation(
        &mut self,
        op: &str,
        previous: &Arc<StateSnapshot>,
        nav: Navigation,
    ) -> Result<Navigation> {
        match nav {
            Navigation::Moved { from, to } => {
                debug!(op = op, from = %from, to = %to, "Moved history cursor");
                let current = Arc::clone(self.history.current_state());
                self.observers.dispatch(Some(previous.as_ref()), Some(&current))?;
            }
            Navigation::AtBoundary => {
                debug!(op = op, node = %self.history.current_id(), "History boundary, skipping");
            }
        }
        Ok(nav)
    }

    // --- Observers ---

    pub fn subscribe<F>(&mut self, path: &str, callback: F) -> Result<ObserverId>
    where
        F: FnMut(&Arc<StateSnapshot>) + 'static,
    {
        self.observers.subscribe(path, callback)
    }

    pub fn subscribe_path<F>(&mut self, path: StatePath, callback: F) -> ObserverId
    where
        F: FnMut(&Arc<StateSnapshot>) + 'static,
    {
        self.observers.subscribe_path(path, callback)
    }

    pub fn subscribe_channel(&mut self, path: &str, buffer_size: usize) -> Result<SubscriptionHandle> {
        self.observers.subscribe_channel(path, buffer_size)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Deliver the current state to every observer, e.g. for the first paint.
    pub fn notify_current(&mut self) -> Result<usize> {
        let current = Arc::clone(self.history.current_state());
        self.observers.dispatch(None, Some(&current))
    }

    // --- Queries ---

    pub fn current_state(&self) -> &Arc<StateSnapshot> {
        self.history.current_state()
    }

    pub fn is_selected(&self, node: &NodeRef) -> bool {
        crate::state::is_selected(node, self.history.current_state())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryGraph {
        &self.history
    }

    pub fn summary(&self) -> HistorySummary {
        self.history.summary()
    }

    pub fn config(&self) -> &ProvenanceConfig {
        &self.config
    }
}
