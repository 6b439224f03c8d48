//! Path command implementation.

use crate::cli::PathArgs;
use crate::commands::resolve_path;
use crate::engine::Engine;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use weft_domain::CancelFlag;
use weft_graph::RelationshipGraph;

/// Execute the path command: weighted simple paths between two files.
///
/// Both endpoints are single-entity lookups - naming a file the graph
/// does not know is an explicit not-found error.
pub fn execute_path(args: PathArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    let source = resolve_path(&args.source);
    let target = resolve_path(&args.target);

    let graph = {
        let store = engine.store();
        RelationshipGraph::from_store(&*store)?
    };

    for endpoint in [&source, &target] {
        if !graph.contains(endpoint) {
            return Err(CliError::FileNotFound(endpoint.clone()));
        }
    }

    let paths = graph.find_paths(&source, &target, args.max_depth, &CancelFlag::new())?;
    println!("{}", formatter.format_paths(&paths)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OutputFormat};
    use std::path::PathBuf;

    #[test]
    fn test_unknown_endpoint_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(&Config::default(), Some(&dir.path().join("weft.db"))).unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let args = PathArgs {
            source: PathBuf::from("ghost.py"),
            target: PathBuf::from("phantom.py"),
            max_depth: 3,
            format: None,
        };
        let result = execute_path(args, &engine, &formatter);
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }
}
