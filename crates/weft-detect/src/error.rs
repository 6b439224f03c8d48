//! Error types for the detection layer

use thiserror::Error;

/// Errors that can occur during detection
#[derive(Debug, Error)]
pub enum DetectionError {
    /// A strategy key was registered twice
    #[error("Strategy already registered: {0}")]
    DuplicateStrategy(String),

    /// A detection pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// A strategy failed while analyzing a batch
    #[error("Strategy '{strategy}' failed: {message}")]
    Strategy {
        /// Key of the failing strategy
        strategy: String,
        /// What went wrong
        message: String,
    },

    /// The store rejected a read or write; the enclosing operation is
    /// aborted and any in-flight batch rolled back by the store
    #[error("Storage error: {0}")]
    Storage(String),

    /// The caller's cancellation flag was set
    #[error("Detection cancelled")]
    Cancelled,

    /// A strategy worker task could not be joined
    #[error("Worker task failed: {0}")]
    Worker(String),
}
