//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent violations of the forest invariants.
///
/// Rejected moves are not errors; see [`crate::domain::MoveOutcome`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("node id must not be empty (label: {label:?})")]
    EmptyId { label: String },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("attach target not found: {0}")]
    ParentNotFound(NodeId),

    #[error("cycle detected: {node} cannot become a child of {parent}")]
    CycleDetected { node: NodeId, parent: NodeId },

    #[error("invalid seed data: {0}")]
    InvalidSeed(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
