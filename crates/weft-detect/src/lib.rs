//! Weft Detection Layer
//!
//! Converts file identity and content into candidate relationships via a
//! set of pluggable strategies, then merges, persists and announces the
//! results.
//!
//! # Architecture
//!
//! - [`DetectionStrategy`] - one analyzer, batch-shaped so per-strategy
//!   setup cost (import tables, token sets) is shared across files
//! - [`StrategyRegistry`] - insertion-ordered registration by unique key
//! - [`Orchestrator`] - runs every eligible strategy on a blocking
//!   worker, isolates individual failures, merges candidates by the
//!   (source, target, type) triple, persists through the store in one
//!   batch, prunes stale edges and publishes events
//!
//! A single strategy failing is a non-fatal detection error: it is
//! logged, reported, and excluded from the merge. Store failures abort
//! the enclosing operation.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod strategies;
pub mod strategy;
pub mod types;

pub use config::{DetectConfig, DetectOptions};
pub use error::DetectionError;
pub use orchestrator::Orchestrator;
pub use strategies::{
    ImportStrategy, ReferenceStrategy, SimilarityStrategy, StructuralStrategy,
};
pub use strategy::{DetectionStrategy, StrategyRegistry};
pub use types::{DetectionContext, DetectionMetadata, DetectionReport, StrategyFailure};
