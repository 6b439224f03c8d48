//! Visualization export: JSON and Graphviz DOT
//!
//! Export never mutates the graph, and output ordering is fully
//! determined by the input (nodes sorted by path, edges by source,
//! target, type): exporting the same graph twice yields byte-identical
//! strings, which snapshot tests rely on.

use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::error::{GraphError, Result};
use crate::graph::RelationshipGraph;

/// Supported interchange formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Node/edge lists for force-directed layouts
    Json,
    /// Graphviz DOT
    Dot,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "dot" => Ok(ExportFormat::Dot),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

#[derive(Serialize)]
struct JsonNode<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct JsonEdge<'a> {
    source: &'a str,
    target: &'a str,
    #[serde(rename = "type")]
    relationship_type: &'a str,
    weight: f64,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    nodes: Vec<JsonNode<'a>>,
    edges: Vec<JsonEdge<'a>>,
}

/// Escape a string for a quoted DOT identifier
fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl RelationshipGraph {
    /// Serialize the graph for visualization.
    ///
    /// Deterministic: identical graphs produce identical bytes.
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        // (source, target, type, weight), sorted
        let mut edges: Vec<(&str, &str, &str, f64)> = self
            .graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].as_str(),
                    self.graph[edge.target()].as_str(),
                    edge.weight().relationship_type.as_str(),
                    edge.weight().weight,
                )
            })
            .collect();
        edges.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

        let nodes = self.files();

        match format {
            ExportFormat::Json => {
                let document = JsonDocument {
                    nodes: nodes.iter().map(|&id| JsonNode { id }).collect(),
                    edges: edges
                        .iter()
                        .map(|&(source, target, relationship_type, weight)| JsonEdge {
                            source,
                            target,
                            relationship_type,
                            weight,
                        })
                        .collect(),
                };
                serde_json::to_string_pretty(&document)
                    .map_err(|e| GraphError::Export(e.to_string()))
            }
            ExportFormat::Dot => {
                let mut out = String::from("digraph weft {\n");
                out.push_str("    rankdir=LR;\n");
                out.push_str("    node [shape=box];\n");
                for node in &nodes {
                    out.push_str(&format!("    \"{}\";\n", dot_escape(node)));
                }
                for (source, target, relationship_type, weight) in &edges {
                    out.push_str(&format!(
                        "    \"{}\" -> \"{}\" [label=\"{} ({:.3})\"];\n",
                        dot_escape(source),
                        dot_escape(target),
                        relationship_type,
                        weight,
                    ));
                }
                out.push_str("}\n");
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_domain::{Relationship, RelationshipType};

    fn sample_graph() -> RelationshipGraph {
        let mut graph = RelationshipGraph::new();
        graph.add_relationship(&Relationship::new(
            "b.py",
            "c.py",
            RelationshipType::References,
            0.5,
            0.8,
        ));
        graph.add_relationship(&Relationship::new(
            "a.py",
            "b.py",
            RelationshipType::Imports,
            0.9,
            1.0,
        ));
        graph
    }

    #[test]
    fn test_json_export_is_deterministic() {
        let graph = sample_graph();
        let first = graph.export(ExportFormat::Json).unwrap();
        let second = graph.export(ExportFormat::Json).unwrap();
        assert_eq!(first, second, "repeated exports must be byte-identical");
    }

    #[test]
    fn test_json_export_shape() {
        let graph = sample_graph();
        let exported = graph.export(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();

        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        // Sorted by path regardless of insertion order
        assert_eq!(nodes[0]["id"], "a.py");

        let edges = value["edges"].as_array().unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0]["source"], "a.py");
        assert_eq!(edges[0]["type"], "imports");
        assert!((edges[0]["weight"].as_f64().unwrap() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_dot_export_is_valid_and_ordered() {
        let graph = sample_graph();
        let dot = graph.export(ExportFormat::Dot).unwrap();

        assert!(dot.starts_with("digraph weft {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(dot.contains("\"a.py\" -> \"b.py\" [label=\"imports (0.900)\"];"));
        assert!(dot.contains("\"b.py\" -> \"c.py\" [label=\"references (0.400)\"];"));

        // Node declarations come sorted
        let a_pos = dot.find("\"a.py\";").unwrap();
        let b_pos = dot.find("\"b.py\";").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn test_dot_escapes_quotes() {
        let mut graph = RelationshipGraph::new();
        graph.with_file("weird\"name.py");
        let dot = graph.export(ExportFormat::Dot).unwrap();
        assert!(dot.contains("\"weird\\\"name.py\";"));
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("DOT".parse::<ExportFormat>().unwrap(), ExportFormat::Dot);
        assert!("svg".parse::<ExportFormat>().is_err());
    }
}
