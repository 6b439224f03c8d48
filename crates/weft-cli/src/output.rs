//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use weft_detect::DetectionReport;
use weft_domain::Relationship;
use weft_graph::{GraphMetrics, PathResult};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    fn paint(&self, s: &str, color: Color) -> String {
        if self.color_enabled {
            s.color(color).to_string()
        } else {
            s.to_string()
        }
    }

    fn table_from(&self, header: &[&str], rows: Vec<Vec<String>>) -> String {
        let mut builder = Builder::default();
        builder.push_record(header.iter().map(|h| h.to_string()));
        for row in rows {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a list of relationships.
    pub fn format_relationships(&self, relationships: &[Relationship]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(relationships)?),
            OutputFormat::Quiet => Ok(relationships
                .iter()
                .map(|r| format!("{}\t{}\t{}", r.source_path, r.target_path, r.relationship_type))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if relationships.is_empty() {
                    return Ok(self.paint("No relationships found.", Color::Yellow));
                }
                let rows = relationships
                    .iter()
                    .map(|r| {
                        vec![
                            r.source_path.clone(),
                            r.target_path.clone(),
                            r.relationship_type.to_string(),
                            format!("{:.2}", r.forward_strength),
                            format!("{:.2}", r.reverse_strength),
                            format!("{:.2}", r.confidence),
                        ]
                    })
                    .collect();
                Ok(self.table_from(
                    &["SOURCE", "TARGET", "TYPE", "FWD", "REV", "CONF"],
                    rows,
                ))
            }
        }
    }

    /// Format the ranked related-files list.
    pub fn format_related(&self, related: &[(String, f64)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let entries: Vec<serde_json::Value> = related
                    .iter()
                    .map(|(path, weight)| serde_json::json!({ "path": path, "weight": weight }))
                    .collect();
                Ok(serde_json::to_string_pretty(&entries)?)
            }
            OutputFormat::Quiet => Ok(related
                .iter()
                .map(|(path, _)| path.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if related.is_empty() {
                    return Ok(self.paint("No related files.", Color::Yellow));
                }
                let rows = related
                    .iter()
                    .map(|(path, weight)| vec![path.clone(), format!("{:.3}", weight)])
                    .collect();
                Ok(self.table_from(&["FILE", "WEIGHT"], rows))
            }
        }
    }

    /// Format path-finding results.
    pub fn format_paths(&self, paths: &[PathResult]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let entries: Vec<serde_json::Value> = paths
                    .iter()
                    .map(|p| serde_json::json!({ "nodes": p.nodes, "weight": p.weight }))
                    .collect();
                Ok(serde_json::to_string_pretty(&entries)?)
            }
            OutputFormat::Quiet => Ok(paths
                .iter()
                .map(|p| p.nodes.join(" -> "))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if paths.is_empty() {
                    return Ok(self.paint("No path found.", Color::Yellow));
                }
                let rows = paths
                    .iter()
                    .map(|p| vec![p.nodes.join(" -> "), format!("{:.3}", p.weight)])
                    .collect();
                Ok(self.table_from(&["PATH", "WEIGHT"], rows))
            }
        }
    }

    /// Format the metrics summary.
    pub fn format_metrics(&self, metrics: &GraphMetrics) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(metrics)?),
            OutputFormat::Quiet => Ok(format!(
                "{} files, {} relationships, {} clusters, {} orphans",
                metrics.node_count,
                metrics.edge_count,
                metrics.clusters.len(),
                metrics.orphans.len()
            )),
            OutputFormat::Table => {
                let mut out = String::new();
                out.push_str(&format!(
                    "{} {} files, {} relationships\n\n",
                    self.paint("Graph:", Color::Cyan),
                    metrics.node_count,
                    metrics.edge_count
                ));

                out.push_str(&self.paint("Most connected:\n", Color::Cyan));
                let rows = metrics
                    .centrality
                    .iter()
                    .take(10)
                    .map(|entry| {
                        vec![
                            entry.path.clone(),
                            format!("{:.3}", entry.in_degree),
                            format!("{:.3}", entry.out_degree),
                            format!("{:.3}", entry.score),
                        ]
                    })
                    .collect();
                out.push_str(&self.table_from(&["FILE", "IN", "OUT", "SCORE"], rows));

                out.push_str(&format!(
                    "\n\n{}\n",
                    self.paint("Clusters:", Color::Cyan)
                ));
                if metrics.clusters.is_empty() {
                    out.push_str("  (none above threshold)\n");
                } else {
                    for (i, cluster) in metrics.clusters.iter().enumerate() {
                        out.push_str(&format!("  {}: {}\n", i + 1, cluster.join(", ")));
                    }
                }

                if !metrics.orphans.is_empty() {
                    out.push_str(&format!(
                        "\n{} {}\n",
                        self.paint("Orphans:", Color::Yellow),
                        metrics.orphans.join(", ")
                    ));
                }
                Ok(out)
            }
        }
    }

    /// Format a detection report.
    pub fn format_report(&self, report: &DetectionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            _ => {
                let mut out = self.format_relationships(&report.relationships)?;
                out.push_str(&format!(
                    "\n\n{} relationships from {} files ({} strategies, {} ms){}",
                    report.relationships.len(),
                    report.metadata.files_scanned,
                    report.metadata.strategies_run,
                    report.metadata.processing_time_ms,
                    if report.persisted {
                        self.paint(" [persisted]", Color::Green)
                    } else {
                        self.paint(" [dry run - pass --apply to persist]", Color::Yellow)
                    }
                ));
                for failure in &report.failures {
                    out.push_str(&format!(
                        "\n{} strategy '{}' failed: {}",
                        self.paint("warning:", Color::Yellow),
                        failure.strategy,
                        failure.reason
                    ));
                }
                Ok(out)
            }
        }
    }
}
