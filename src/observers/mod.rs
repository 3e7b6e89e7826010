//! Observers for committed state changes.
//!
//! Subscribers watch a key path into the snapshot (`"selected"`,
//! `"selected.people/A"`, or `""` for everything) and are called
//! synchronously, in subscription order, after the history cursor has moved.
//!
//! Two delivery modes:
//! - Callbacks, invoked inline with the committed snapshot
//! - Bounded channels, for consumers on another thread; slow or
//!   disconnected receivers are dropped
//!
//! # Example
//!
//! ```ignore
//! let mut registry = ObserverRegistry::new();
//!
//! registry.subscribe("selected", |state| {
//!     repaint_highlights(state.selected.highlighted_nodes());
//! })?;
//!
//! let handle = registry.subscribe_channel("network", 16)?;
//! while let Ok(ObserverEvent::State(state)) = handle.recv() {
//!     relayout(&state.network);
//! }
//! ```

mod registry;
mod types;

pub use registry::ObserverRegistry;
pub use types::{DropReason, ObserverEvent, ObserverId, SubscriptionHandle};
