//! Observer types.

use crate::state::StateSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Unique identifier for an observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Events delivered to channel subscribers.
#[derive(Clone, Debug)]
pub enum ObserverEvent {
    /// A committed state whose watched path changed.
    State(Arc<StateSnapshot>),

    /// The subscription was dropped.
    Dropped { reason: DropReason },
}

/// Why a channel subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Receiver went away.
    Disconnected,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Handle to a channel subscription.
pub struct SubscriptionHandle {
    pub id: ObserverId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<ObserverEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<ObserverEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<ObserverEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<ObserverEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain every pending state event, keeping only the newest.
    pub fn latest(&self) -> Option<Arc<StateSnapshot>> {
        self.receiver
            .try_iter()
            .filter_map(|event| match event {
                ObserverEvent::State(state) => Some(state),
                ObserverEvent::Dropped { .. } => None,
            })
            .last()
    }
}
