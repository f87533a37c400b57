//! Error types for parsing user-facing task vocabulary.

use thiserror::Error;

/// Errors raised when a token does not name a known priority, status, filter or sort key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Token is not one of `urgent`, `normal`, `not urgent`.
    #[error("unknown priority: {0}")]
    Priority(String),

    /// Token is not one of `Pending`, `Completed`, `Overdue`.
    #[error("unknown status: {0}")]
    Status(String),

    /// Token names neither a status nor a priority.
    #[error("unknown filter: {0}")]
    Filter(String),

    /// Token is not one of `time`, `priority`, `status`.
    #[error("unknown sort key: {0}")]
    SortKey(String),
}
