//! Metrics command implementation.

use crate::cli::MetricsArgs;
use crate::commands::resolve_path;
use crate::engine::Engine;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use weft_graph::RelationshipGraph;

/// Execute the metrics command: centrality, clusters and orphans.
pub fn execute_metrics(args: MetricsArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    if !(0.0..=1.0).contains(&args.min_strength) {
        return Err(CliError::InvalidInput(format!(
            "--min-strength must be in [0, 1], got {}",
            args.min_strength
        )));
    }

    let mut graph = {
        let store = engine.store();
        RelationshipGraph::from_store(&*store)?
    };

    // Force-included files show up in the orphan report when isolated
    for path in &args.include {
        graph.with_file(&resolve_path(path));
    }

    let metrics = graph.metrics(args.min_strength);
    println!("{}", formatter.format_metrics(&metrics)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OutputFormat};

    #[test]
    fn test_min_strength_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(&Config::default(), Some(&dir.path().join("weft.db"))).unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let args = MetricsArgs {
            min_strength: 1.5,
            include: vec![],
            format: None,
        };
        let result = execute_metrics(args, &engine, &formatter);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
