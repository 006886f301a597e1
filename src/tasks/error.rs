//! Task store error types.
//!
//! These only describe rejected input. The session controller treats every
//! one of them as a silent no-op.

use thiserror::Error;

/// Reasons a task submission is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task text is empty or whitespace only.
    #[error("Task text must not be blank")]
    BlankText,

    /// Estimate is not a positive whole number of minutes.
    #[error("Estimated time must be a positive number of minutes (got '{0}')")]
    InvalidEstimate(String),

    /// No task matches the given id or prefix.
    #[error("No task matches '{0}'")]
    NotFound(String),

    /// More than one task matches the given prefix.
    #[error("'{0}' matches more than one task")]
    Ambiguous(String),
}
