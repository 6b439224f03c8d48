//! Error types and exit-code mapping for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
///
/// Every variant maps to one of the documented exit codes: 1 for invalid
/// arguments, 2 for missing files, 3 for storage/engine failures.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid input or flag combination
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A named file or path does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] weft_store::StoreError),

    /// Detection pipeline failure
    #[error("Detection error: {0}")]
    Detection(#[from] weft_detect::DetectionError),

    /// Graph analysis failure
    #[error("Graph error: {0}")]
    Graph(#[from] weft_graph::GraphError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// 1 invalid arguments, 2 file(s) not found, 3 storage or engine
    /// failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidInput(_) | CliError::Config(_) | CliError::Toml(_) => 1,
            CliError::FileNotFound(_) => 2,
            CliError::Storage(_)
            | CliError::Detection(_)
            | CliError::Graph(_)
            | CliError::Io(_)
            | CliError::Serialization(_) => 3,
        }
    }
}
