//! The in-memory relationship graph

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction as PetDirection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use weft_domain::{Relationship, RelationshipId, RelationshipType};

/// Edge payload: one relationship, reduced to what analysis needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Id of the underlying relationship
    pub id: RelationshipId,

    /// Type tag of the underlying relationship
    pub relationship_type: RelationshipType,

    /// Traversal weight: forward strength x confidence
    pub weight: f64,

    /// Reverse-direction strength x confidence, used when ranking from
    /// the target's perspective
    pub reverse_weight: f64,
}

/// A weighted directed graph of file relationships.
///
/// Nodes are file paths; a node exists when it appears in at least one
/// relationship or was force-included via [`with_file`]. Cycles are
/// expected and tolerated - every algorithm in this crate tracks visited
/// nodes instead of assuming acyclicity.
///
/// [`with_file`]: RelationshipGraph::with_file
pub struct RelationshipGraph {
    pub(crate) graph: DiGraph<String, GraphEdge>,
    pub(crate) node_index: HashMap<String, NodeIndex>,
}

impl RelationshipGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Add a node for `path`, or return the existing one
    pub fn with_file(&mut self, path: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(path.to_string());
        self.node_index.insert(path.to_string(), idx);
        idx
    }

    /// Add one relationship as an edge, creating endpoints as needed
    pub fn add_relationship(&mut self, relationship: &Relationship) {
        let source = self.with_file(&relationship.source_path);
        let target = self.with_file(&relationship.target_path);
        self.graph.add_edge(
            source,
            target,
            GraphEdge {
                id: relationship.id,
                relationship_type: relationship.relationship_type.clone(),
                weight: relationship.forward_strength * relationship.confidence,
                reverse_weight: relationship.reverse_strength * relationship.confidence,
            },
        );
    }

    /// Find a node by path
    pub fn find_node(&self, path: &str) -> Option<NodeIndex> {
        self.node_index.get(path).copied()
    }

    /// Whether `path` is present as a node
    pub fn contains(&self, path: &str) -> bool {
        self.node_index.contains_key(path)
    }

    /// All file paths in the graph, sorted
    pub fn files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.node_index.keys().map(String::as_str).collect();
        files.sort_unstable();
        files
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Files related to `path` (either direction), ranked by the
    /// perspective-correct weight, strongest first.
    ///
    /// An outgoing edge contributes its forward weight; an incoming edge
    /// contributes its reverse weight (how strongly the relationship
    /// pulls from this file's point of view).
    pub fn related(&self, path: &str) -> Vec<(String, f64)> {
        let Some(node) = self.find_node(path) else {
            return Vec::new();
        };

        let mut best: HashMap<&str, f64> = HashMap::new();
        for edge in self.graph.edges_directed(node, PetDirection::Outgoing) {
            let neighbor = self.graph[edge.target()].as_str();
            let weight = edge.weight().weight;
            best.entry(neighbor)
                .and_modify(|w| *w = w.max(weight))
                .or_insert(weight);
        }
        for edge in self.graph.edges_directed(node, PetDirection::Incoming) {
            let neighbor = self.graph[edge.source()].as_str();
            let weight = edge.weight().reverse_weight;
            best.entry(neighbor)
                .and_modify(|w| *w = w.max(weight))
                .or_insert(weight);
        }

        let mut related: Vec<(String, f64)> = best
            .into_iter()
            .map(|(path, weight)| (path.to_string(), weight))
            .collect();
        related.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        related
    }
}

impl Default for RelationshipGraph {
    fn default() -> Self {
        Self::new()
    }
}
