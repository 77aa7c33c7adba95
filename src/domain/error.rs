//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent precondition violations against the scene tree.
/// Data-path degradation (absent nodes, unknown band keys) is not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("operation on non-tree node: {operation} reached a pending placeholder at index {index}")]
    PendingNode {
        operation: &'static str,
        index: usize,
    },

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("cannot append {child} to {parent}: {reason}")]
    InvalidHierarchy {
        parent: String,
        child: String,
        reason: String,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
