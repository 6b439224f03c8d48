//! Centrality, clustering and orphan analysis

use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use petgraph::Direction as PetDirection;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::graph::RelationshipGraph;

/// One node's weighted degree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralityEntry {
    /// File path
    pub path: String,

    /// Weighted in-degree
    pub in_degree: f64,

    /// Weighted out-degree
    pub out_degree: f64,

    /// in + out; the ranking key
    pub score: f64,
}

/// Summary of the graph's shape, as reported by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct GraphMetrics {
    /// Number of files
    pub node_count: usize,

    /// Number of relationships
    pub edge_count: usize,

    /// Every node's weighted degree, strongest first
    pub centrality: Vec<CentralityEntry>,

    /// Threshold clusters with at least two members
    pub clusters: Vec<Vec<String>>,

    /// Files present in the graph with no edges at all
    pub orphans: Vec<String>,
}

impl RelationshipGraph {
    /// Weighted degree centrality per node, descending.
    ///
    /// Degree centrality is the sum of weighted in-degree and weighted
    /// out-degree; ties break on the path so the ordering is stable.
    pub fn degree_centrality(&self) -> Vec<CentralityEntry> {
        let mut entries: Vec<CentralityEntry> = self
            .graph
            .node_indices()
            .map(|idx| {
                let out_degree: f64 = self
                    .graph
                    .edges_directed(idx, PetDirection::Outgoing)
                    .map(|e| e.weight().weight)
                    .sum();
                let in_degree: f64 = self
                    .graph
                    .edges_directed(idx, PetDirection::Incoming)
                    .map(|e| e.weight().weight)
                    .sum();
                CentralityEntry {
                    path: self.graph[idx].clone(),
                    in_degree,
                    out_degree,
                    score: in_degree + out_degree,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.path.cmp(&b.path))
        });
        entries
    }

    /// The `n` most connected files
    pub fn most_connected(&self, n: usize) -> Vec<CentralityEntry> {
        let mut entries = self.degree_centrality();
        entries.truncate(n);
        entries
    }

    /// Files with no edges at all (centrality zero).
    ///
    /// Only force-included files can be orphans - a node normally exists
    /// because some relationship references it.
    pub fn orphans(&self) -> Vec<String> {
        let mut orphans: Vec<String> = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .edges_directed(idx, PetDirection::Outgoing)
                    .next()
                    .is_none()
                    && self
                        .graph
                        .edges_directed(idx, PetDirection::Incoming)
                        .next()
                        .is_none()
            })
            .map(|idx| self.graph[idx].clone())
            .collect();
        orphans.sort_unstable();
        orphans
    }

    /// Group nodes into clusters connected by edges of weight at or
    /// above `threshold`.
    ///
    /// Union-find over the qualifying edges - cycle-safe by construction.
    /// Edge direction is ignored: clustering asks "are these files
    /// bound together", not "which way does the dependency point".
    /// Singleton groups are dropped; members and clusters are sorted so
    /// repeated calls return identical output.
    pub fn clusters(&self, threshold: f64) -> Vec<Vec<String>> {
        let mut union_find = UnionFind::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            if edge.weight().weight >= threshold {
                union_find.union(edge.source().index(), edge.target().index());
            }
        }

        let mut groups: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for idx in self.graph.node_indices() {
            let root = union_find.find(idx.index());
            groups.entry(root).or_default().push(self.graph[idx].clone());
        }

        let mut clusters: Vec<Vec<String>> = groups
            .into_values()
            .filter(|members| members.len() > 1)
            .map(|mut members| {
                members.sort_unstable();
                members
            })
            .collect();
        clusters.sort();
        clusters
    }

    /// Full metrics summary for reporting
    pub fn metrics(&self, cluster_threshold: f64) -> GraphMetrics {
        GraphMetrics {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            centrality: self.degree_centrality(),
            clusters: self.clusters(cluster_threshold),
            orphans: self.orphans(),
        }
    }
}
