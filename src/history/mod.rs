//! Branching history of visualization states.
//!
//! The history is a tree rooted at the initial snapshot. Every applied
//! action appends one child under the cursor and moves the cursor there;
//! undo and redo only move the cursor. Old branches are never deleted.
//!
//! Nodes store either a full snapshot or a field-level delta against their
//! parent. Delta chains are capped by `ProvenanceConfig::snapshot_every`, and
//! rebuilt states are kept in a small LRU cache.

mod graph;
mod summary;

pub use graph::{HistoryGraph, HistoryNode, Navigation, StoredState};
pub use summary::{HistoryNodeSummary, HistorySummary};
