//! Simple-path search between two files
//!
//! Depth-first enumeration of every simple path (no repeated nodes) up
//! to a hop limit. Path weight is the product of edge weights, so long
//! low-confidence chains rank below a single strong edge. Cycles in the
//! graph are handled by the per-path visited set - there is no global
//! acyclicity assumption.

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction as PetDirection;

use crate::error::{GraphError, Result};
use crate::graph::RelationshipGraph;
use weft_domain::CancelFlag;

/// One path from source to target
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Node sequence, source first, target last
    pub nodes: Vec<String>,

    /// Product of edge weights along the path
    pub weight: f64,
}

impl RelationshipGraph {
    /// Enumerate every simple path from `source` to `target` of at most
    /// `max_depth` hops, strongest first.
    ///
    /// Returns an empty list when either endpoint is absent or no path
    /// exists within the limit. `source == target` yields the single
    /// zero-length trivial path. The cancellation flag is checked at
    /// every expansion step; ties in weight break on the node sequence
    /// so the ordering is deterministic.
    pub fn find_paths(
        &self,
        source: &str,
        target: &str,
        max_depth: usize,
        cancel: &CancelFlag,
    ) -> Result<Vec<PathResult>> {
        let (Some(source_idx), Some(target_idx)) =
            (self.find_node(source), self.find_node(target))
        else {
            return Ok(Vec::new());
        };

        if source_idx == target_idx {
            return Ok(vec![PathResult {
                nodes: vec![source.to_string()],
                weight: 1.0,
            }]);
        }
        if max_depth == 0 {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        let mut trail = vec![source_idx];
        self.expand(
            source_idx,
            target_idx,
            max_depth,
            1.0,
            &mut trail,
            &mut results,
            cancel,
        )?;

        results.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.nodes.cmp(&b.nodes))
        });
        Ok(results)
    }

    #[allow(clippy::too_many_arguments)]
    fn expand(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        remaining: usize,
        weight: f64,
        trail: &mut Vec<NodeIndex>,
        results: &mut Vec<PathResult>,
        cancel: &CancelFlag,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(GraphError::Cancelled);
        }

        for edge in self.graph.edges_directed(current, PetDirection::Outgoing) {
            let next = edge.target();
            if trail.contains(&next) {
                continue; // simple paths only
            }
            let next_weight = weight * edge.weight().weight;
            if next == target {
                let mut nodes: Vec<String> =
                    trail.iter().map(|&idx| self.graph[idx].clone()).collect();
                nodes.push(self.graph[next].clone());
                results.push(PathResult {
                    nodes,
                    weight: next_weight,
                });
                continue;
            }
            if remaining > 1 {
                trail.push(next);
                self.expand(next, target, remaining - 1, next_weight, trail, results, cancel)?;
                trail.pop();
            }
        }
        Ok(())
    }
}
