//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Weft CLI - discover and query relationships between files.
#[derive(Debug, Parser)]
#[command(name = "weft")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Database file path (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (minimal)
    Quiet,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl Command {
    /// The display-format flag of the subcommand, when it has one.
    ///
    /// `visualize` is the exception: its `--format` selects the export
    /// format (json/dot), not the display format.
    pub fn output_format(&self) -> Option<CliFormat> {
        match self {
            Command::Detect(args) => args.format,
            Command::List(args) => args.format,
            Command::Find(args) => args.format,
            Command::Path(args) => args.format,
            Command::Metrics(args) => args.format,
            Command::Visualize(_) => None,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run relationship detection over files
    Detect(DetectArgs),

    /// List stored relationships for a file
    List(ListArgs),

    /// List files related to a file, ranked by weight
    Find(FindArgs),

    /// Find weighted paths between two files
    Path(PathArgs),

    /// Export a neighborhood graph for visualization
    Visualize(VisualizeArgs),

    /// Report centrality and cluster metrics
    Metrics(MetricsArgs),
}

/// Arguments for the detect command.
#[derive(Debug, Parser)]
pub struct DetectArgs {
    /// Files or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Recurse into directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Restrict detection to these relationship types (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub types: Option<Vec<String>>,

    /// Persist detected relationships (report-only without this)
    #[arg(long)]
    pub apply: bool,

    /// Drop candidates below this forward strength
    #[arg(long)]
    pub min_strength: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// File to query
    pub path: PathBuf,

    /// Only relationships where the file is the source
    #[arg(long, conflicts_with = "incoming")]
    pub outgoing: bool,

    /// Only relationships where the file is the target
    #[arg(long, conflicts_with = "outgoing")]
    pub incoming: bool,

    /// Restrict to one relationship type
    #[arg(short = 't', long = "type")]
    pub relationship_type: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,
}

/// Arguments for the find command.
#[derive(Debug, Parser)]
pub struct FindArgs {
    /// File to find related files for
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,
}

/// Arguments for the path command.
#[derive(Debug, Parser)]
pub struct PathArgs {
    /// Start file
    pub source: PathBuf,

    /// End file
    pub target: PathBuf,

    /// Maximum number of hops
    #[arg(long, default_value_t = 5)]
    pub max_depth: usize,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,
}

/// Arguments for the visualize command.
#[derive(Debug, Parser)]
pub struct VisualizeArgs {
    /// Root file of the exported neighborhood
    pub path: PathBuf,

    /// Neighborhood depth around the root
    #[arg(short, long, default_value_t = 2)]
    pub depth: usize,

    /// Export format: json or dot
    #[arg(short, long, default_value = "json")]
    pub format: String,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the metrics command.
#[derive(Debug, Parser)]
pub struct MetricsArgs {
    /// Cluster edges at or above this weight
    #[arg(long, default_value_t = 0.5)]
    pub min_strength: f64,

    /// Force-include these files even when they have no relationships
    /// (reported as orphans)
    #[arg(long)]
    pub include: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_args_parse() {
        let cli = Cli::try_parse_from([
            "weft", "detect", "src/", "--recursive", "--types", "imports,references", "--apply",
        ])
        .unwrap();

        match cli.command {
            Command::Detect(args) => {
                assert!(args.recursive);
                assert!(args.apply);
                assert_eq!(
                    args.types,
                    Some(vec!["imports".to_string(), "references".to_string()])
                );
            }
            _ => panic!("expected detect"),
        }
    }

    #[test]
    fn test_list_direction_flags_conflict() {
        let result = Cli::try_parse_from(["weft", "list", "a.py", "--outgoing", "--incoming"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_path_defaults() {
        let cli = Cli::try_parse_from(["weft", "path", "a.py", "b.py"]).unwrap();
        match cli.command {
            Command::Path(args) => assert_eq!(args.max_depth, 5),
            _ => panic!("expected path"),
        }
    }
}
