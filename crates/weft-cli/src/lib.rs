//! Weft CLI library.
//!
//! This library provides the core functionality for the Weft
//! command-line interface: configuration management, engine assembly,
//! command execution and output formatting. The collaborator
//! capabilities the core consumes (content reading, similarity scoring)
//! are implemented here, in the front-end, not in the engine crates.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use engine::Engine;
pub use error::{CliError, Result};
pub use output::Formatter;
