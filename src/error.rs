//! Error types for the provenance engine.

use crate::types::HistoryNodeId;
use thiserror::Error;

/// Main error type for provenance operations.
#[derive(Debug, Error)]
pub enum ProvenanceError {
    #[error("Invalid initial state: {0}")]
    InvalidInitialState(String),

    #[error("Observer on path '{path}' received an undefined state")]
    ObserverPreconditionViolation { path: String },

    #[error("History node not found: {0}")]
    HistoryNodeNotFound(HistoryNodeId),

    #[error("History node {child} is not a child of {parent}")]
    NotAChild {
        parent: HistoryNodeId,
        child: HistoryNodeId,
    },

    #[error("Action label must not be empty")]
    EmptyActionLabel,

    #[error("Node not in current network: {0}")]
    UnknownNode(String),

    #[error("Invalid state path: {0:?}")]
    InvalidPath(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ProvenanceError {
    fn from(e: serde_json::Error) -> Self {
        ProvenanceError::Serialization(e.to_string())
    }
}

/// Result type for provenance operations.
pub type Result<T> = std::result::Result<T, ProvenanceError>;
