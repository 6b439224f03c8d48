//! Configuration for detection runs

use weft_domain::{CancelFlag, RelationshipType};

/// Per-run options supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    /// Restrict the run to strategies producing these types
    pub types: Option<Vec<RelationshipType>>,

    /// Persist merged results (and prune stale edges) when true;
    /// report-only when false
    pub apply: bool,

    /// Drop merged candidates below this forward strength
    pub min_strength: Option<f64>,

    /// Cooperative cancellation, checked between strategy invocations
    pub cancel: CancelFlag,
}

impl DetectOptions {
    /// Whether a strategy producing `relationship_type` is eligible
    pub fn wants(&self, relationship_type: &RelationshipType) -> bool {
        match &self.types {
            Some(types) => types.contains(relationship_type),
            None => true,
        }
    }
}

/// Tuning knobs shared by the built-in strategies
#[derive(Debug, Clone)]
pub struct DetectConfig {
    /// Similarity score at or above which an edge is produced
    pub similarity_threshold: f64,

    /// Stems shorter than this are not considered reference mentions
    pub min_stem_length: usize,

    /// Files larger than this are skipped by content-reading strategies
    pub max_content_bytes: usize,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            min_stem_length: 3,
            max_content_bytes: 2 * 1024 * 1024,
        }
    }
}
