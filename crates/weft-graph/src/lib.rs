//! Weft Graph Layer
//!
//! Builds an in-memory weighted directed graph from stored relationships
//! and implements the analysis the CLI and downstream consumers need.
//!
//! ## Architecture
//!
//! ```text
//! RelationshipStore
//!     │
//!     ├──> Builders (full snapshot, or BFS neighborhood from roots)
//!     │
//!     ├──> RelationshipGraph (petgraph)
//!     │      ├─ Nodes: file paths
//!     │      └─ Edges: relationships, weight = strength x confidence
//!     │
//!     ├──> Analysis
//!     │      ├─ find_paths: all simple paths, product weights
//!     │      ├─ degree_centrality / most_connected / orphans
//!     │      └─ clusters: union-find over threshold-passing edges
//!     │
//!     └──> Export (JSON for force-directed layouts, Graphviz DOT)
//! ```
//!
//! The graph is derived state: it is rebuilt (or re-scoped) from the
//! store and never the system of record. Builders take a snapshot - the
//! result may be stale relative to writes that commit after the build
//! began, which callers must treat as eventual consistency, not a bug.

mod builder;
mod error;
mod export;
mod graph;
mod metrics;
mod paths;

pub use error::{GraphError, Result};
pub use export::ExportFormat;
pub use graph::{GraphEdge, RelationshipGraph};
pub use metrics::{CentralityEntry, GraphMetrics};
pub use paths::PathResult;
