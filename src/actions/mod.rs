//! Actions: named, pure transforms recorded as edges of the history tree.
//!
//! An [`Action`] pairs a label with a `StateSnapshot -> StateSnapshot`
//! closure, a category, and a store policy. The [`catalog`] module holds the
//! actions the node-link view issues.

mod action;
pub mod catalog;

pub use action::{Action, ActionCategory, ActionMeta};
