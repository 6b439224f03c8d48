//! Visualize command implementation.

use std::fs;

use crate::cli::VisualizeArgs;
use crate::commands::resolve_path;
use crate::engine::Engine;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use weft_graph::{ExportFormat, RelationshipGraph};

/// Execute the visualize command: export a neighborhood around a file.
pub fn execute_visualize(
    args: VisualizeArgs,
    engine: &Engine,
    _formatter: &Formatter,
) -> Result<()> {
    let format: ExportFormat = args
        .format
        .parse()
        .map_err(CliError::InvalidInput)?;

    let root = resolve_path(&args.path);
    let graph = {
        let store = engine.store();
        RelationshipGraph::neighborhood(&*store, &[root], args.depth)?
    };

    let document = graph.export(format)?;

    match &args.output {
        Some(file) => {
            fs::write(file, &document)?;
            eprintln!(
                "Wrote {} nodes, {} edges to {}",
                graph.node_count(),
                graph.edge_count(),
                file.display()
            );
        }
        None => println!("{}", document),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OutputFormat};
    use std::path::PathBuf;

    #[test]
    fn test_unknown_format_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(&Config::default(), Some(&dir.path().join("weft.db"))).unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let args = VisualizeArgs {
            path: PathBuf::from("a.py"),
            depth: 2,
            format: "svg".to_string(),
            output: None,
        };
        let result = execute_visualize(args, &engine, &formatter);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(&Config::default(), Some(&dir.path().join("weft.db"))).unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let out = dir.path().join("graph.json");

        let args = VisualizeArgs {
            path: PathBuf::from("a.py"),
            depth: 1,
            format: "json".to_string(),
            output: Some(out.clone()),
        };
        execute_visualize(args, &engine, &formatter).unwrap();

        let written = std::fs::read_to_string(out).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert!(value["nodes"].is_array());
    }
}
