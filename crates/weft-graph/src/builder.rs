//! Graph construction from the store's read path
//!
//! Both builders take a read-only snapshot: they never hold the store
//! across algorithm execution, and the graph they return may be stale
//! relative to writes committed after the build began. That is expected
//! - the graph is a derived read model, the store stays the system of
//! record.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{GraphError, Result};
use crate::graph::RelationshipGraph;
use weft_domain::{Direction, RelationshipId, RelationshipStore};

impl RelationshipGraph {
    /// Build a graph from every relationship in the store
    pub fn from_store<S: RelationshipStore>(store: &S) -> Result<Self> {
        let mut graph = Self::new();
        let relationships = store.all().map_err(|e| GraphError::Store(e.to_string()))?;
        for relationship in &relationships {
            graph.add_relationship(relationship);
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built graph snapshot"
        );
        Ok(graph)
    }

    /// Build a bounded neighborhood by breadth-first expansion from the
    /// given root files.
    ///
    /// A `max_depth` of 0 returns only the roots themselves, with no
    /// edges. Roots are always present as nodes even when isolated, so
    /// callers can tell "no relationships" apart from "unknown file".
    pub fn neighborhood<S: RelationshipStore>(
        store: &S,
        roots: &[String],
        max_depth: usize,
    ) -> Result<Self> {
        let mut graph = Self::new();
        let mut seen_edges: HashSet<RelationshipId> = HashSet::new();
        let mut visited: HashSet<String> = roots.iter().cloned().collect();
        let mut frontier: Vec<String> = roots.to_vec();

        for path in roots {
            graph.with_file(path);
        }

        for depth in 0..max_depth {
            if frontier.is_empty() {
                break;
            }
            let mut next_frontier = Vec::new();
            for path in &frontier {
                let touching = store
                    .get_for_file(path, Direction::Both)
                    .map_err(|e| GraphError::Store(e.to_string()))?;
                for relationship in &touching {
                    if !seen_edges.insert(relationship.id) {
                        continue;
                    }
                    graph.add_relationship(relationship);
                    for endpoint in [&relationship.source_path, &relationship.target_path] {
                        if visited.insert(endpoint.clone()) {
                            next_frontier.push(endpoint.clone());
                        }
                    }
                }
            }
            debug!(depth = depth + 1, discovered = next_frontier.len(), "expanded frontier");
            frontier = next_frontier;
        }

        Ok(graph)
    }
}
