//! Named, pure state transforms.

use crate::state::StateSnapshot;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad kind of an action, used for grouping in history views.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Selection,
    Network,
    Display,
    Search,
    Other(String),
}

impl ActionCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ActionCategory::Selection => "selection",
            ActionCategory::Network => "network",
            ActionCategory::Display => "display",
            ActionCategory::Search => "search",
            ActionCategory::Other(name) => name,
        }
    }
}

impl Default for ActionCategory {
    fn default() -> Self {
        ActionCategory::Other("action".to_string())
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata recorded on the history edge an action creates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionMeta {
    pub label: String,
    pub category: ActionCategory,
    /// Store a full snapshot for this node instead of a delta.
    pub always_store_state: bool,
    pub timestamp: Timestamp,
}

type Transform = Box<dyn FnOnce(StateSnapshot) -> StateSnapshot>;

/// A named transform from one snapshot to the next.
///
/// The transform receives its own copy of the current snapshot and must be
/// total: it cannot fail, and it sees nothing but the snapshot it is handed.
///
/// ```ignore
/// let action = Action::new("set marker size", |mut state| {
///     state.node_marker_length = 80.0;
///     state
/// })
/// .event_type(ActionCategory::Display);
/// provenance.apply(action)?;
/// ```
pub struct Action {
    label: String,
    category: ActionCategory,
    always_store_state: bool,
    transform: Transform,
}

impl Action {
    pub fn new<F>(label: impl Into<String>, transform: F) -> Self
    where
        F: FnOnce(StateSnapshot) -> StateSnapshot + 'static,
    {
        Self {
            label: label.into(),
            category: ActionCategory::default(),
            always_store_state: false,
            transform: Box::new(transform),
        }
    }

    /// Tag the action with a category.
    pub fn event_type(mut self, category: ActionCategory) -> Self {
        self.category = category;
        self
    }

    /// Always materialize a full snapshot for this action's history node.
    pub fn always_store_state(mut self, always: bool) -> Self {
        self.always_store_state = always;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn category(&self) -> &ActionCategory {
        &self.category
    }

    pub fn stores_full_state(&self) -> bool {
        self.always_store_state
    }

    /// Split into recorded metadata and the transform itself.
    pub(crate) fn into_parts(self) -> (ActionMeta, Transform) {
        let meta = ActionMeta {
            label: self.label,
            category: self.category,
            always_store_state: self.always_store_state,
            timestamp: Timestamp::now(),
        };
        (meta, self.transform)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("label", &self.label)
            .field("category", &self.category)
            .field("always_store_state", &self.always_store_state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Network;

    #[test]
    fn test_builder() {
        let action = Action::new("zoom", |state| state)
            .event_type(ActionCategory::Display)
            .always_store_state(true);

        assert_eq!(action.label(), "zoom");
        assert_eq!(action.category(), &ActionCategory::Display);
        assert!(action.stores_full_state());
    }

    #[test]
    fn test_into_parts_runs_transform() {
        let action = Action::new("grow", |state: StateSnapshot| state.with_marker_size(70.0, 60.0));
        let (meta, transform) = action.into_parts();
        assert_eq!(meta.label, "grow");
        assert!(!meta.always_store_state);

        let next = transform(StateSnapshot::new(Network::default()));
        assert_eq!(next.node_marker_length, 70.0);
        assert_eq!(next.node_marker_height, 60.0);
    }

    #[test]
    fn test_category_serialization() {
        let value = serde_json::to_value(ActionCategory::Selection).unwrap();
        assert_eq!(value, serde_json::json!("selection"));
        assert_eq!(ActionCategory::Other("lasso".into()).to_string(), "lasso");
    }
}
