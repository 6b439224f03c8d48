//! Error types for the graph layer

use thiserror::Error;

/// Result type alias for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while building or analyzing a graph
#[derive(Error, Debug)]
pub enum GraphError {
    /// Reading the store's snapshot failed
    #[error("Store read failed: {0}")]
    Store(String),

    /// A single-entity lookup named a node the graph does not contain
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The caller's cancellation flag was set mid-traversal
    #[error("Traversal cancelled")]
    Cancelled,

    /// Serializing an export document failed
    #[error("Export error: {0}")]
    Export(String),
}
