//! Strategy trait and registry

use std::sync::Arc;

use crate::error::DetectionError;
use crate::types::DetectionContext;
use weft_domain::{Relationship, RelationshipType};

/// A pluggable relationship analyzer.
///
/// Strategies are stateless with respect to the store: they see file
/// identity plus whatever they read through the context capabilities,
/// and produce candidate relationships for the orchestrator to merge.
/// `detect` receives the whole batch so per-strategy setup (an import
/// table, a token index) is built once per run, not once per file.
pub trait DetectionStrategy: Send + Sync {
    /// Unique registry key; also the metadata namespace for evidence
    fn key(&self) -> &str;

    /// The relationship type this strategy produces
    fn relationship_type(&self) -> RelationshipType;

    /// Analyze a batch of files and return candidate relationships.
    ///
    /// Both endpoints of every candidate must come from `paths`.
    /// Returned metadata keys are un-namespaced; the orchestrator
    /// prefixes them with the strategy key during the merge.
    fn detect(
        &self,
        ctx: &DetectionContext,
        paths: &[String],
    ) -> Result<Vec<Relationship>, DetectionError>;
}

/// Insertion-ordered strategy registry keyed by string identifier.
///
/// New strategies implement [`DetectionStrategy`] and register at
/// startup; there is no ambient global registry.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn DetectionStrategy>>,
}

impl StrategyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy; duplicate keys are rejected
    pub fn register(&mut self, strategy: Arc<dyn DetectionStrategy>) -> Result<(), DetectionError> {
        if self.strategies.iter().any(|s| s.key() == strategy.key()) {
            return Err(DetectionError::DuplicateStrategy(strategy.key().to_string()));
        }
        self.strategies.push(strategy);
        Ok(())
    }

    /// Look up a strategy by key
    pub fn get(&self, key: &str) -> Option<Arc<dyn DetectionStrategy>> {
        self.strategies.iter().find(|s| s.key() == key).cloned()
    }

    /// Iterate strategies in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DetectionStrategy>> {
        self.strategies.iter()
    }

    /// Registered keys, in registration order
    pub fn keys(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.key().to_string()).collect()
    }

    /// Number of registered strategies
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
