//! Visualization state: snapshots, key paths, and the selection model.
//!
//! Each history node holds (or can rebuild) one [`StateSnapshot`]. Snapshots
//! are copy-on-write values: an action receives a clone of the current
//! snapshot and returns the next one, leaving recorded history untouched.

mod path;
mod selection;
mod snapshot;

pub use path::StatePath;
pub use selection::{is_selected, Selection};
pub use snapshot::{
    SnapshotDelta, StateField, StateSnapshot, DEFAULT_MARKER_SIZE, STARTED_PROVENANCE,
};
