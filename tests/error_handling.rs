//! Error handling and edge case tests.

use nodelink_provenance::{
    Action, HistoryGraph, HistoryNodeId, Network, NodeRef, NodeRow, ObserverRegistry, Provenance,
    ProvenanceConfig, ProvenanceError, StatePath, StateSnapshot,
};
use std::sync::Arc;

fn network() -> Network {
    Network::new(vec![NodeRow::new("A"), NodeRow::new("B")], vec![])
}

// --- Initialization ---

#[test]
fn test_empty_discriminant_rejected() {
    let result = HistoryGraph::initialize(StateSnapshot::new(network()).with_event(""));
    assert!(matches!(result, Err(ProvenanceError::InvalidInitialState(_))));

    let result = Provenance::from_snapshot(
        StateSnapshot::new(network()).with_event("   "),
        ProvenanceConfig::default(),
    );
    assert!(matches!(result, Err(ProvenanceError::InvalidInitialState(_))));
}

#[test]
fn test_zero_sized_config_still_works() {
    let config = ProvenanceConfig {
        snapshot_every: 0,
        state_cache_size: 0,
        ..Default::default()
    };
    let mut prov = Provenance::with_config(network(), config).unwrap();
    prov.set_marker_size(1.0, 1.0).unwrap();
    prov.set_marker_size(2.0, 2.0).unwrap();

    // snapshot_every = 0 behaves like 1: every node is stored full
    assert!(prov.history().iter().all(|n| n.is_full()));

    prov.undo().unwrap();
    assert_eq!(prov.current_state().node_marker_length, 1.0);
}

// --- Observers ---

#[test]
fn test_dispatch_without_state_is_fatal() {
    let mut registry = ObserverRegistry::new();
    registry.subscribe("selected", |_| {}).unwrap();

    let result = registry.dispatch(None, None);
    assert!(matches!(
        result,
        Err(ProvenanceError::ObserverPreconditionViolation { .. })
    ));
}

#[test]
fn test_dispatch_without_state_fails_even_with_no_subscribers() {
    let mut registry = ObserverRegistry::new();
    let result = registry.dispatch(None, None);
    assert!(matches!(
        result,
        Err(ProvenanceError::ObserverPreconditionViolation { .. })
    ));
}

#[test]
fn test_subscribe_invalid_paths() {
    let mut prov = Provenance::new(network()).unwrap();
    assert!(matches!(
        prov.subscribe("colour", |_| {}),
        Err(ProvenanceError::InvalidPath(_))
    ));
    assert!(matches!(
        prov.subscribe("selected.", |_| {}),
        Err(ProvenanceError::InvalidPath(_))
    ));
    assert!(matches!(
        prov.subscribe_channel("network..nodes", 4),
        Err(ProvenanceError::InvalidPath(_))
    ));
}

#[test]
fn test_observer_path_into_missing_index() {
    let mut prov = Provenance::new(network()).unwrap();
    let path = StatePath::parse("search.5").unwrap();
    let hits = std::rc::Rc::new(std::cell::Cell::new(0));

    let counter = hits.clone();
    prov.subscribe_path(path, move |_| counter.set(counter.get() + 1));

    // Index 5 exists in neither state
    prov.set_search(vec!["a".into()]).unwrap();
    assert_eq!(hits.get(), 0);

    prov.set_search((0..6).map(|i| i.to_string()).collect()).unwrap();
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_unsubscribed_observer_not_called() {
    let mut prov = Provenance::new(network()).unwrap();
    let hits = std::rc::Rc::new(std::cell::Cell::new(0));

    let counter = hits.clone();
    let id = prov
        .subscribe("", move |_| counter.set(counter.get() + 1))
        .unwrap();
    assert!(prov.unsubscribe(id));

    prov.select_node_by_id("A").unwrap();
    assert_eq!(hits.get(), 0);
}

// --- Actions ---

#[test]
fn test_failed_validation_leaves_history_untouched() {
    let mut prov = Provenance::new(network()).unwrap();
    prov.select_node_by_id("A").unwrap();
    let before = Arc::clone(prov.current_state());
    let len = prov.history().len();

    assert!(matches!(
        prov.select_node(NodeRef::new("ghost", ["A"])),
        Err(ProvenanceError::UnknownNode(_))
    ));
    assert!(matches!(
        prov.apply(Action::new(" ", |s| s)),
        Err(ProvenanceError::EmptyActionLabel)
    ));

    assert_eq!(prov.history().len(), len);
    assert!(Arc::ptr_eq(&before, prov.current_state()));
}

#[test]
fn test_deselect_node_missing_from_network() {
    // A snapshot seeded with a selection outside the network can still be cleaned up
    let mut initial = StateSnapshot::new(network());
    initial.selected.insert(&NodeRef::new("stale", Vec::<String>::new()));
    let mut prov = Provenance::from_snapshot(initial, ProvenanceConfig::default()).unwrap();

    prov.select_node(NodeRef::new("stale", Vec::<String>::new()))
        .unwrap();
    assert!(prov.current_state().selected.is_empty());
}

#[test]
fn test_deselect_by_id_missing_from_network() {
    let mut prov = Provenance::new(network()).unwrap();
    prov.apply(Action::new("inject selection", |mut state: StateSnapshot| {
        state.selected.insert(&NodeRef::new("Z", ["A"]));
        state
    }))
    .unwrap();

    prov.select_node_by_id("Z").unwrap();
    assert!(prov.current_state().selected.is_empty());
    assert_eq!(prov.history().depth(), 2);

    // Selecting it again still requires the node to exist
    assert!(matches!(
        prov.select_node_by_id("Z"),
        Err(ProvenanceError::UnknownNode(id)) if id == "Z"
    ));
}

#[test]
fn test_panicking_transform_records_nothing() {
    let mut prov = Provenance::new(network()).unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = prov.apply(Action::new("broken", |_: StateSnapshot| -> StateSnapshot {
            panic!("transform bug")
        }));
    }));
    assert!(result.is_err());
    assert_eq!(prov.history().len(), 1);
    assert_eq!(prov.history().current_id(), HistoryNodeId::ROOT);
}

// --- Navigation ---

#[test]
fn test_redo_to_unknown_and_non_child() {
    let mut prov = Provenance::new(network()).unwrap();
    let a = prov.select_node_by_id("A").unwrap();
    let b = prov.select_node_by_id("B").unwrap();
    prov.undo().unwrap();
    prov.undo().unwrap();

    assert!(matches!(
        prov.redo_to(HistoryNodeId(100)),
        Err(ProvenanceError::HistoryNodeNotFound(HistoryNodeId(100)))
    ));
    match prov.redo_to(b) {
        Err(ProvenanceError::NotAChild { parent, child }) => {
            assert_eq!(parent, HistoryNodeId::ROOT);
            assert_eq!(child, b);
        }
        other => panic!("Expected NotAChild, got {:?}", other),
    }

    prov.redo_to(a).unwrap();
    prov.redo_to(b).unwrap();
    assert_eq!(prov.history().depth(), 2);
}

#[test]
fn test_direct_addressing_misses() {
    let prov = Provenance::new(network()).unwrap();
    let missing = HistoryNodeId(7);

    assert!(prov.history().node(missing).is_none());
    assert!(matches!(
        prov.history().state_of(missing),
        Err(ProvenanceError::HistoryNodeNotFound(_))
    ));
    assert!(matches!(
        prov.history().children(missing),
        Err(ProvenanceError::HistoryNodeNotFound(_))
    ));
}

#[test]
fn test_repeated_boundary_calls_are_idempotent() {
    let mut prov = Provenance::new(network()).unwrap();
    for _ in 0..5 {
        assert!(!prov.undo().unwrap().moved());
        assert!(!prov.redo().unwrap().moved());
    }
    assert_eq!(prov.history().len(), 1);
}
