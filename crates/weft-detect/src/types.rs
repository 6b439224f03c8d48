//! Shared types for the detection pipeline

use serde::Serialize;
use std::sync::Arc;
use weft_domain::{ContentReader, Relationship, SimilarityScorer};

/// Capabilities handed to every strategy invocation.
///
/// The content reader and the similarity scorer are supplied by the
/// front-end; the core never implements them. Cloning is cheap (Arcs).
#[derive(Clone)]
pub struct DetectionContext {
    reader: Arc<dyn ContentReader>,
    scorer: Option<Arc<dyn SimilarityScorer>>,
}

impl DetectionContext {
    /// Build a context from the injected capabilities
    pub fn new(reader: Arc<dyn ContentReader>, scorer: Option<Arc<dyn SimilarityScorer>>) -> Self {
        Self { reader, scorer }
    }

    /// The content reader capability
    pub fn reader(&self) -> &dyn ContentReader {
        self.reader.as_ref()
    }

    /// The similarity scorer capability, when one was supplied
    pub fn scorer(&self) -> Option<&dyn SimilarityScorer> {
        self.scorer.as_deref()
    }
}

/// One strategy's failure, isolated from the rest of the run
#[derive(Debug, Clone, Serialize)]
pub struct StrategyFailure {
    /// Key of the strategy that failed
    pub strategy: String,

    /// Rendered error
    pub reason: String,
}

/// Run-level bookkeeping attached to every report
#[derive(Debug, Clone, Serialize)]
pub struct DetectionMetadata {
    /// Number of files in the batch
    pub files_scanned: usize,

    /// Number of strategies that ran (successfully or not)
    pub strategies_run: usize,

    /// Wall-clock duration of the run
    pub processing_time_ms: u64,
}

/// Result of a detection run
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    /// Merged candidate relationships, one per (source, target, type)
    pub relationships: Vec<Relationship>,

    /// Strategies that failed (non-fatal, excluded from the merge)
    pub failures: Vec<StrategyFailure>,

    /// Whether results were written to the store
    pub persisted: bool,

    /// Run-level bookkeeping
    pub metadata: DetectionMetadata,
}
