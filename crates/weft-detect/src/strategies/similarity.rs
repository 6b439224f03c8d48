//! Content similarity strategy
//!
//! The only strategy that uses the optional [`SimilarityScorer`]
//! capability. Scoring itself (embeddings, token models) lives outside
//! the core; this strategy just asks the scorer for every pair in the
//! batch and keeps the pairs above the configured threshold. When no
//! scorer was supplied the strategy is a no-op, not a failure.
//!
//! [`SimilarityScorer`]: weft_domain::SimilarityScorer

use tracing::debug;

use crate::config::DetectConfig;
use crate::error::DetectionError;
use crate::strategy::DetectionStrategy;
use crate::types::DetectionContext;
use weft_domain::{Metadata, MetadataValue, Relationship, RelationshipType};

/// Detects `similar_content` relationships via the injected scorer
pub struct SimilarityStrategy {
    threshold: f64,
}

impl SimilarityStrategy {
    /// Create the strategy with the shared tuning knobs
    pub fn new(config: &DetectConfig) -> Self {
        Self {
            threshold: config.similarity_threshold,
        }
    }
}

impl DetectionStrategy for SimilarityStrategy {
    fn key(&self) -> &str {
        "similarity"
    }

    fn relationship_type(&self) -> RelationshipType {
        RelationshipType::SimilarContent
    }

    fn detect(
        &self,
        ctx: &DetectionContext,
        paths: &[String],
    ) -> Result<Vec<Relationship>, DetectionError> {
        let Some(scorer) = ctx.scorer() else {
            debug!("no similarity scorer supplied, skipping");
            return Ok(vec![]);
        };

        let mut relationships = Vec::new();

        for (i, a) in paths.iter().enumerate() {
            for b in &paths[i + 1..] {
                if a == b {
                    continue;
                }
                let score = scorer.similarity(a, b).clamp(0.0, 1.0);
                if score < self.threshold {
                    continue;
                }
                let (source, target) = if a < b { (a, b) } else { (b, a) };
                let mut metadata = Metadata::new();
                metadata.insert("score".to_string(), MetadataValue::Float(score));
                relationships.push(
                    Relationship::new(
                        source.clone(),
                        target.clone(),
                        RelationshipType::SimilarContent,
                        score,
                        0.8,
                    )
                    .with_metadata(metadata),
                );
            }
        }

        debug!(candidates = relationships.len(), "similarity scoring complete");
        Ok(relationships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use weft_domain::{ContentReader, SimilarityScorer};

    struct NoReader;

    impl ContentReader for NoReader {
        fn read_text(&self, path: &str) -> std::io::Result<String> {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.to_string(),
            ))
        }
    }

    /// Scores by shared first character, for predictable pairs
    struct FirstCharScorer;

    impl SimilarityScorer for FirstCharScorer {
        fn similarity(&self, path_a: &str, path_b: &str) -> f64 {
            if path_a.chars().next() == path_b.chars().next() {
                0.9
            } else {
                0.1
            }
        }
    }

    #[test]
    fn test_no_scorer_is_a_noop() {
        let ctx = DetectionContext::new(Arc::new(NoReader), None);
        let strategy = SimilarityStrategy::new(&DetectConfig::default());

        let found = strategy
            .detect(&ctx, &["a.py".to_string(), "b.py".to_string()])
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_pairs_above_threshold() {
        let ctx = DetectionContext::new(Arc::new(NoReader), Some(Arc::new(FirstCharScorer)));
        let strategy = SimilarityStrategy::new(&DetectConfig::default());

        let paths = vec![
            "auth.py".to_string(),
            "auth_helpers.py".to_string(),
            "zebra.py".to_string(),
        ];
        let found = strategy.detect(&ctx, &paths).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source_path, "auth.py");
        assert_eq!(found[0].target_path, "auth_helpers.py");
        assert_eq!(found[0].forward_strength, 0.9);
        assert_eq!(found[0].reverse_strength, 0.9, "similarity is symmetric");
    }
}
