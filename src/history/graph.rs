//! History tree implementation.

use crate::actions::{ActionCategory, ActionMeta};
use crate::error::{ProvenanceError, Result};
use crate::provenance::ProvenanceConfig;
use crate::state::{SnapshotDelta, StateSnapshot, STARTED_PROVENANCE};
use crate::types::{HistoryNodeId, Timestamp};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::trace;

use super::summary::{HistoryNodeSummary, HistorySummary};

/// How a history node keeps its state.
#[derive(Clone, Debug)]
pub enum StoredState {
    /// Complete snapshot.
    Full(Arc<StateSnapshot>),

    /// Changes relative to the parent node's state.
    Delta {
        parent: HistoryNodeId,
        delta: SnapshotDelta,
    },
}

/// Result of an undo/redo request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// The cursor moved.
    Moved {
        from: HistoryNodeId,
        to: HistoryNodeId,
    },
    /// Already at the root (undo) or at a leaf (redo); nothing happened.
    AtBoundary,
}

impl Navigation {
    pub fn moved(self) -> bool {
        matches!(self, Navigation::Moved { .. })
    }
}

/// One entry in the history tree.
#[derive(Clone, Debug)]
pub struct HistoryNode {
    id: HistoryNodeId,
    parent: Option<HistoryNodeId>,
    children: Vec<HistoryNodeId>,
    action: Option<ActionMeta>,
    created: Timestamp,
    depth: usize,
    /// Deltas between this node and its nearest fully stored ancestor.
    delta_chain: u64,
    stored: StoredState,
}

impl HistoryNode {
    pub fn id(&self) -> HistoryNodeId {
        self.id
    }

    /// Parent node; `None` only for the root.
    pub fn parent(&self) -> Option<HistoryNodeId> {
        self.parent
    }

    /// Children in creation order.
    pub fn children(&self) -> &[HistoryNodeId] {
        &self.children
    }

    /// The action that produced this node (`None` for the root).
    pub fn action(&self) -> Option<&ActionMeta> {
        self.action.as_ref()
    }

    pub fn label(&self) -> &str {
        self.action
            .as_ref()
            .map(|a| a.label.as_str())
            .unwrap_or(STARTED_PROVENANCE)
    }

    pub fn category(&self) -> Option<&ActionCategory> {
        self.action.as_ref().map(|a| &a.category)
    }

    pub fn created(&self) -> Timestamp {
        self.created
    }

    /// Distance from the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn stored(&self) -> &StoredState {
        &self.stored
    }

    pub fn is_full(&self) -> bool {
        matches!(self.stored, StoredState::Full(_))
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Append-only tree of history nodes with a single cursor.
///
/// Nodes are never removed. Applying an action after an undo adds a sibling
/// branch next to the old one. Redo follows the most recently created child;
/// [`HistoryGraph::redo_to`] picks a specific one.
pub struct HistoryGraph {
    /// All nodes, indexed by id.
    nodes: Vec<HistoryNode>,

    /// Cursor.
    current: HistoryNodeId,

    /// Materialized state of the cursor node.
    current_state: Arc<StateSnapshot>,

    /// Max delta chain length before a full snapshot is forced.
    snapshot_every: u64,

    /// Rebuilt states of delta nodes.
    cache: LruCache<HistoryNodeId, Arc<StateSnapshot>>,
}

impl HistoryGraph {
    /// Create a tree whose root holds `initial`.
    pub fn initialize(initial: StateSnapshot) -> Result<Self> {
        Self::with_config(initial, &ProvenanceConfig::default())
    }

    pub fn with_config(initial: StateSnapshot, config: &ProvenanceConfig) -> Result<Self> {
        if initial.event.trim().is_empty() {
            return Err(ProvenanceError::InvalidInitialState(
                "event discriminant is empty".to_string(),
            ));
        }

        let state = Arc::new(initial);
        let root = HistoryNode {
            id: HistoryNodeId::ROOT,
            parent: None,
            children: Vec::new(),
            action: None,
            created: Timestamp::now(),
            depth: 0,
            delta_chain: 0,
            stored: StoredState::Full(Arc::clone(&state)),
        };

        let cache_size = NonZeroUsize::new(config.state_cache_size).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            nodes: vec![root],
            current: HistoryNodeId::ROOT,
            current_state: state,
            snapshot_every: config.snapshot_every.max(1),
            cache: LruCache::new(cache_size),
        })
    }

    // --- Cursor ---

    pub fn current(&self) -> &HistoryNode {
        self.node_at(self.current)
    }

    pub fn current_id(&self) -> HistoryNodeId {
        self.current
    }

    pub fn current_state(&self) -> &Arc<StateSnapshot> {
        &self.current_state
    }

    /// Depth of the cursor (0 at the root).
    pub fn depth(&self) -> usize {
        self.current().depth
    }

    pub fn can_undo(&self) -> bool {
        !self.current().is_root()
    }

    pub fn can_redo(&self) -> bool {
        !self.current().is_leaf()
    }

    /// Move the cursor to its parent. No-op at the root.
    pub fn undo(&mut self) -> Navigation {
        match self.current().parent {
            Some(parent) => self.move_to(parent),
            None => Navigation::AtBoundary,
        }
    }

    /// Move the cursor to its most recently created child. No-op at a leaf.
    pub fn redo(&mut self) -> Navigation {
        match self.current().children.last().copied() {
            Some(child) => self.move_to(child),
            None => Navigation::AtBoundary,
        }
    }

    /// Move the cursor to a specific child of the current node.
    pub fn redo_to(&mut self, child: HistoryNodeId) -> Result<Navigation> {
        if self.node(child).is_none() {
            return Err(ProvenanceError::HistoryNodeNotFound(child));
        }
        if !self.current().children.contains(&child) {
            return Err(ProvenanceError::NotAChild {
                parent: self.current,
                child,
            });
        }
        Ok(self.move_to(child))
    }

    /// Append `next` as a new child of the cursor and move the cursor to it.
    ///
    /// Fails with [`ProvenanceError::EmptyActionLabel`] if the action label or
    /// the snapshot's `event` is blank; nothing is recorded in that case.
    pub fn record(&mut self, next: StateSnapshot, meta: ActionMeta) -> Result<HistoryNodeId> {
        if meta.label.trim().is_empty() || next.event.trim().is_empty() {
            return Err(ProvenanceError::EmptyActionLabel);
        }

        let id = HistoryNodeId(self.nodes.len() as u64);
        let parent = self.current();
        let parent_id = parent.id;
        let depth = parent.depth + 1;
        let chain = parent.delta_chain + 1;

        let next = Arc::new(next);
        let (stored, delta_chain) = if meta.always_store_state || chain >= self.snapshot_every {
            (StoredState::Full(Arc::clone(&next)), 0)
        } else {
            let delta = self.current_state.diff(&next);
            (
                StoredState::Delta {
                    parent: parent_id,
                    delta,
                },
                chain,
            )
        };

        self.nodes.push(HistoryNode {
            id,
            parent: Some(parent_id),
            children: Vec::new(),
            action: Some(meta),
            created: Timestamp::now(),
            depth,
            delta_chain,
            stored,
        });
        self.node_at_mut(parent_id).children.push(id);

        if delta_chain > 0 {
            self.cache.put(id, Arc::clone(&next));
        }
        self.current = id;
        self.current_state = next;

        Ok(id)
    }

    // --- Direct addressing ---

    pub fn root(&self) -> &HistoryNode {
        self.node_at(HistoryNodeId::ROOT)
    }

    pub fn node(&self, id: HistoryNodeId) -> Option<&HistoryNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn children(&self, id: HistoryNodeId) -> Result<&[HistoryNodeId]> {
        self.node(id)
            .map(HistoryNode::children)
            .ok_or(ProvenanceError::HistoryNodeNotFound(id))
    }

    /// Ids from `id` up to and including the root.
    pub fn path_to_root(&self, id: HistoryNodeId) -> Result<Vec<HistoryNodeId>> {
        let mut node = self
            .node(id)
            .ok_or(ProvenanceError::HistoryNodeNotFound(id))?;
        let mut path = vec![node.id];
        while let Some(parent) = node.parent {
            path.push(parent);
            node = self.node_at(parent);
        }
        Ok(path)
    }

    /// State recorded at `id`, rebuilding it from deltas if needed.
    pub fn state_of(&self, id: HistoryNodeId) -> Result<Arc<StateSnapshot>> {
        if self.node(id).is_none() {
            return Err(ProvenanceError::HistoryNodeNotFound(id));
        }
        if id == self.current {
            return Ok(Arc::clone(&self.current_state));
        }
        if let Some(cached) = self.cache.peek(&id) {
            return Ok(Arc::clone(cached));
        }
        Ok(self.reconstruct(id))
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryNode> {
        self.nodes.iter()
    }

    /// Serializable view of the whole tree.
    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            current: self.current,
            nodes: self.nodes.iter().map(HistoryNodeSummary::from_node).collect(),
        }
    }

    // --- Internals ---

    fn node_at(&self, id: HistoryNodeId) -> &HistoryNode {
        &self.nodes[id.0 as usize]
    }

    fn node_at_mut(&mut self, id: HistoryNodeId) -> &mut HistoryNode {
        &mut self.nodes[id.0 as usize]
    }

    fn move_to(&mut self, to: HistoryNodeId) -> Navigation {
        let from = self.current;
        self.current_state = self.materialize(to);
        self.current = to;
        Navigation::Moved { from, to }
    }

    fn materialize(&mut self, id: HistoryNodeId) -> Arc<StateSnapshot> {
        if let StoredState::Full(state) = &self.node_at(id).stored {
            return Arc::clone(state);
        }
        if let Some(cached) = self.cache.get(&id) {
            return Arc::clone(cached);
        }
        let state = self.reconstruct(id);
        self.cache.put(id, Arc::clone(&state));
        state
    }

    /// Walk to the nearest full ancestor and replay deltas forward.
    fn reconstruct(&self, id: HistoryNodeId) -> Arc<StateSnapshot> {
        let mut deltas = Vec::new();
        let mut cursor = id;
        let base = loop {
            match &self.node_at(cursor).stored {
                StoredState::Full(state) => break Arc::clone(state),
                StoredState::Delta { parent, delta } => {
                    deltas.push(delta);
                    cursor = *parent;
                }
            }
        };

        trace!(node = %id, base = %cursor, deltas = deltas.len(), "Reconstructing history state");

        if deltas.is_empty() {
            return base;
        }

        let mut state = StateSnapshot::clone(&base);
        for delta in deltas.into_iter().rev() {
            state = state.apply_delta(delta);
        }
        Arc::new(state)
    }
}
