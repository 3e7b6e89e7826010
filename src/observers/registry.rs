//! Observer registry: key-path subscriptions notified after each commit.

use crate::error::{ProvenanceError, Result};
use crate::state::{StatePath, StateSnapshot};
use crossbeam_channel::{bounded, Sender, TrySendError};
use std::sync::Arc;
use tracing::{error, trace, warn};

use super::types::{DropReason, ObserverEvent, ObserverId, SubscriptionHandle};

type Callback = Box<dyn FnMut(&Arc<StateSnapshot>)>;

enum Sink {
    Callback(Callback),
    /// The channel holds `capacity` states plus one reserved slot for the
    /// final `Dropped` event.
    Channel {
        sender: Sender<ObserverEvent>,
        capacity: usize,
    },
}

struct Subscription {
    id: ObserverId,
    path: StatePath,
    sink: Sink,
}

impl Subscription {
    /// Deliver a state. Returns the drop reason if a channel subscriber
    /// can no longer receive.
    fn deliver(&mut self, state: &Arc<StateSnapshot>) -> Option<DropReason> {
        match &mut self.sink {
            Sink::Callback(callback) => {
                callback(state);
                None
            }
            Sink::Channel { sender, capacity } => {
                if sender.len() >= *capacity {
                    return Some(DropReason::BufferOverflow);
                }
                match sender.try_send(ObserverEvent::State(Arc::clone(state))) {
                    Ok(()) => None,
                    Err(TrySendError::Full(_)) => Some(DropReason::BufferOverflow),
                    Err(TrySendError::Disconnected(_)) => Some(DropReason::Disconnected),
                }
            }
        }
    }
}

/// Subscriptions keyed by state path, dispatched in subscription order.
///
/// Dispatch is synchronous. Callbacks only ever see committed states and
/// cannot reach back into the session that owns the registry.
#[derive(Default)]
pub struct ObserverRegistry {
    /// Active subscriptions in subscription order.
    subscriptions: Vec<Subscription>,
    /// Counter for generating observer IDs.
    next_id: u64,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` whenever the value at `path` changes.
    pub fn subscribe<F>(&mut self, path: &str, callback: F) -> Result<ObserverId>
    where
        F: FnMut(&Arc<StateSnapshot>) + 'static,
    {
        let path = StatePath::parse(path)?;
        Ok(self.subscribe_path(path, callback))
    }

    pub fn subscribe_path<F>(&mut self, path: StatePath, callback: F) -> ObserverId
    where
        F: FnMut(&Arc<StateSnapshot>) + 'static,
    {
        self.insert(path, Sink::Callback(Box::new(callback)))
    }

    /// Deliver changes at `path` over a bounded channel.
    ///
    /// A subscriber whose buffer fills up, or whose receiver is dropped, is
    /// removed on the next dispatch. An overflowing subscriber still receives
    /// a final [`ObserverEvent::Dropped`] after its buffered states.
    pub fn subscribe_channel(&mut self, path: &str, buffer_size: usize) -> Result<SubscriptionHandle> {
        let path = StatePath::parse(path)?;
        let capacity = buffer_size.max(1);
        let (sender, receiver) = bounded(capacity + 1);
        let id = self.insert(path, Sink::Channel { sender, capacity });
        Ok(SubscriptionHandle { id, receiver })
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let Some(pos) = self.subscriptions.iter().position(|s| s.id == id) else {
            return false;
        };
        let sub = self.subscriptions.remove(pos);
        if let Sink::Channel { sender, .. } = sub.sink {
            // Best effort; the receiver may already be gone.
            let _ = sender.try_send(ObserverEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
        true
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Notify subscribers whose path differs between `previous` and `next`.
    ///
    /// With no `previous`, every subscriber is notified. A missing `next`
    /// is a wiring bug and fails with
    /// [`ProvenanceError::ObserverPreconditionViolation`].
    ///
    /// Returns the number of subscribers the state was delivered to. A channel
    /// subscriber dropped during this dispatch is not counted.
    pub fn dispatch(
        &mut self,
        previous: Option<&StateSnapshot>,
        next: Option<&Arc<StateSnapshot>>,
    ) -> Result<usize> {
        let Some(next) = next else {
            let path = self
                .subscriptions
                .first()
                .map(|s| s.path.to_string())
                .unwrap_or_default();
            error!(path = %path, "Observer dispatch without a state");
            return Err(ProvenanceError::ObserverPreconditionViolation { path });
        };

        let mut notified = 0;
        let mut dropped = Vec::new();

        for sub in self.subscriptions.iter_mut() {
            let changed = match previous {
                Some(prev) => prev.path_changed(next, &sub.path)?,
                None => true,
            };
            if !changed {
                continue;
            }

            trace!(observer = sub.id.0, path = %sub.path, event = %next.event, "Notifying observer");
            match sub.deliver(next) {
                None => notified += 1,
                Some(reason) => dropped.push((sub.id, reason)),
            }
        }

        for (id, reason) in dropped {
            warn!(observer = id.0, ?reason, "Dropping channel observer");
            if let Some(pos) = self.subscriptions.iter().position(|s| s.id == id) {
                let sub = self.subscriptions.remove(pos);
                if let Sink::Channel { sender, .. } = sub.sink {
                    let _ = sender.try_send(ObserverEvent::Dropped { reason });
                }
            }
        }

        Ok(notified)
    }

    fn insert(&mut self, path: StatePath, sink: Sink) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.subscriptions.push(Subscription { id, path, sink });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Network, NodeRef};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn states() -> (StateSnapshot, Arc<StateSnapshot>) {
        let prev = StateSnapshot::new(Network::default());
        let mut next = prev.clone().with_event("select node");
        next.selected.insert(&NodeRef::new("A", ["B"]));
        (prev, Arc::new(next))
    }

    #[test]
    fn test_subscribe_unsubscribe() {
        let mut registry = ObserverRegistry::new();
        let id = registry.subscribe("selected", |_| {}).unwrap();
        assert_eq!(registry.subscription_count(), 1);

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        assert_eq!(registry.subscription_count(), 0);
    }

    #[test]
    fn test_invalid_path() {
        let mut registry = ObserverRegistry::new();
        let result = registry.subscribe("selection", |_| {});
        assert!(matches!(result, Err(ProvenanceError::InvalidPath(_))));
    }

    #[test]
    fn test_dispatch_in_subscription_order() {
        let mut registry = ObserverRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            registry
                .subscribe("selected", move |_| log.borrow_mut().push(name))
                .unwrap();
        }

        let (prev, next) = states();
        let notified = registry.dispatch(Some(&prev), Some(&next)).unwrap();
        assert_eq!(notified, 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unchanged_path_not_notified() {
        let mut registry = ObserverRegistry::new();
        let hits = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&hits);
        registry
            .subscribe("search", move |_| *counter.borrow_mut() += 1)
            .unwrap();

        let (prev, next) = states();
        assert_eq!(registry.dispatch(Some(&prev), Some(&next)).unwrap(), 0);
        assert_eq!(*hits.borrow(), 0);

        // Without a previous state everyone hears about it.
        assert_eq!(registry.dispatch(None, Some(&next)).unwrap(), 1);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_missing_state_is_fatal() {
        let mut registry = ObserverRegistry::new();
        registry.subscribe("selected", |_| {}).unwrap();

        let (prev, _) = states();
        let result = registry.dispatch(Some(&prev), None);
        match result {
            Err(ProvenanceError::ObserverPreconditionViolation { path }) => {
                assert_eq!(path, "selected")
            }
            other => panic!("Expected precondition violation, got {:?}", other),
        }
    }

    #[test]
    fn test_channel_delivery() {
        let mut registry = ObserverRegistry::new();
        let handle = registry.subscribe_channel("selected", 8).unwrap();

        let (prev, next) = states();
        registry.dispatch(Some(&prev), Some(&next)).unwrap();

        match handle.try_recv().unwrap() {
            ObserverEvent::State(state) => assert!(Arc::ptr_eq(&state, &next)),
            other => panic!("Expected State event, got {:?}", other),
        }
    }

    #[test]
    fn test_drop_slow_channel_subscriber() {
        let mut registry = ObserverRegistry::new();
        let handle = registry.subscribe_channel("", 2).unwrap();

        let (prev, next) = states();
        let delivered: Vec<usize> = (0..4)
            .map(|_| registry.dispatch(Some(&prev), Some(&next)).unwrap())
            .collect();
        assert_eq!(delivered, vec![1, 1, 0, 0]);
        assert_eq!(registry.subscription_count(), 0);

        let events: Vec<ObserverEvent> = handle.receiver.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], ObserverEvent::State(_)));
        assert!(matches!(events[1], ObserverEvent::State(_)));
        assert!(matches!(
            events[2],
            ObserverEvent::Dropped {
                reason: DropReason::BufferOverflow
            }
        ));
    }

    #[test]
    fn test_drop_disconnected_channel_subscriber() {
        let mut registry = ObserverRegistry::new();
        let handle = registry.subscribe_channel("selected", 4).unwrap();
        drop(handle);

        let (prev, next) = states();
        assert_eq!(registry.dispatch(Some(&prev), Some(&next)).unwrap(), 0);
        assert_eq!(registry.subscription_count(), 0);
    }
}
