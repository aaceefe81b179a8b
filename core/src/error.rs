//! Error types for unscramble-core.
//!
//! The model is a pure, deterministic computation: every failure here is a
//! precondition violation on the caller's side, never a transient fault.
//! I/O failures in the snapshot and database backends surface through their
//! own result types instead (`anyhow` for loaders, `redb::Error` for the
//! persistent store).

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, UnscrambleError>;

/// Error type for the probability model and the reconstruction paths.
#[derive(Error, Debug, Clone)]
pub enum UnscrambleError {
    /// A caller-supplied sequence or candidate list violated a precondition
    /// (empty where content is required, or longer than the highest tracked
    /// n-gram order).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl UnscrambleError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
