//! Find command implementation.

use crate::cli::FindArgs;
use crate::commands::resolve_path;
use crate::engine::Engine;
use crate::error::Result;
use crate::output::Formatter;
use weft_graph::RelationshipGraph;

/// Execute the find command: related files ranked by weight.
pub fn execute_find(args: FindArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    let path = resolve_path(&args.path);

    let graph = {
        let store = engine.store();
        RelationshipGraph::neighborhood(&*store, &[path.clone()], 1)?
    };

    let related = graph.related(&path);
    println!("{}", formatter.format_related(&related)?);
    Ok(())
}
