//! # Node-link Provenance
//!
//! Interaction history and selection state for a node-link view of
//! multi-layer network data.
//!
//! ## Core Concepts
//!
//! - **Snapshots**: Immutable values holding the whole view state
//! - **Actions**: Named, pure transforms from one snapshot to the next
//! - **History**: A branching tree of snapshots with an undo/redo cursor
//! - **Observers**: Key-path subscriptions notified after each commit
//! - **Selection**: Selected node ids with cached neighbour sets
//!
//! ## Example
//!
//! ```ignore
//! use nodelink_provenance::{Network, NodeRef, Provenance};
//!
//! let mut provenance = Provenance::new(network)?;
//!
//! provenance.subscribe("selected", |state| {
//!     paint(state.selected.highlighted_nodes());
//! })?;
//!
//! provenance.select_node(NodeRef::new("people/A", ["people/B", "people/C"]))?;
//! provenance.undo()?;
//! provenance.redo()?;
//! ```

pub mod actions;
pub mod error;
pub mod history;
pub mod observers;
pub mod provenance;
pub mod state;
pub mod types;

// Re-exports
pub use actions::{catalog, Action, ActionCategory, ActionMeta};
pub use error::{ProvenanceError, Result};
pub use history::{
    HistoryGraph, HistoryNode, HistoryNodeSummary, HistorySummary, Navigation, StoredState,
};
pub use observers::{DropReason, ObserverEvent, ObserverId, ObserverRegistry, SubscriptionHandle};
pub use provenance::{Provenance, ProvenanceConfig};
pub use state::{
    is_selected, Selection, SnapshotDelta, StateField, StatePath, StateSnapshot,
    DEFAULT_MARKER_SIZE, STARTED_PROVENANCE,
};
pub use types::*;
