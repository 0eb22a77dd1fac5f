//! Domain-level errors (no external dependencies)

use generational_arena::Index;
use thiserror::Error;

/// Domain errors represent violations of the tree topology contract.
///
/// A release of an untracked item is deliberately not an error here: the
/// store recovers from it on its own (see [`crate::domain::Release::Untracked`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0:?}")]
    NodeNotFound(Index),

    #[error("cycle detected: {node:?} cannot be appended below {parent:?}")]
    CycleDetected { node: Index, parent: Index },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
