//! Reference detection strategy
//!
//! Finds word-boundary mentions of another batch file's stem inside a
//! file's content. Weaker evidence than an import statement, so the
//! produced strengths and confidence sit lower; the orchestrator's
//! max-merge lets an import edge dominate when both fire.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::config::DetectConfig;
use crate::error::DetectionError;
use crate::strategies::{file_stem, read_content};
use crate::strategy::DetectionStrategy;
use crate::types::DetectionContext;
use weft_domain::{Metadata, MetadataValue, Relationship, RelationshipType};

/// Detects `references` relationships from stem mentions
pub struct ReferenceStrategy {
    min_stem_length: usize,
    max_content_bytes: usize,
}

impl ReferenceStrategy {
    /// Create the strategy with the shared tuning knobs
    pub fn new(config: &DetectConfig) -> Self {
        Self {
            min_stem_length: config.min_stem_length,
            max_content_bytes: config.max_content_bytes,
        }
    }
}

impl DetectionStrategy for ReferenceStrategy {
    fn key(&self) -> &str {
        "references"
    }

    fn relationship_type(&self) -> RelationshipType {
        RelationshipType::References
    }

    fn detect(
        &self,
        ctx: &DetectionContext,
        paths: &[String],
    ) -> Result<Vec<Relationship>, DetectionError> {
        // Shared setup: one compiled pattern per distinct target stem
        let mut stem_patterns: HashMap<&str, (Regex, Vec<&String>)> = HashMap::new();
        for path in paths {
            let Some(stem) = file_stem(path) else {
                continue;
            };
            if stem.len() < self.min_stem_length {
                continue;
            }
            match stem_patterns.entry(stem) {
                Entry::Occupied(mut occupied) => occupied.get_mut().1.push(path),
                Entry::Vacant(vacant) => {
                    let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(stem)))?;
                    vacant.insert((pattern, vec![path]));
                }
            }
        }

        let mut relationships = Vec::new();

        for source in paths {
            let Some(content) = read_content(ctx, source, self.max_content_bytes) else {
                continue;
            };
            let source_stem = file_stem(source);

            for (stem, (pattern, targets)) in &stem_patterns {
                // A file naturally mentions its own name
                if source_stem == Some(*stem) {
                    continue;
                }
                let count = pattern.find_iter(&content).count();
                if count == 0 {
                    continue;
                }
                for target in targets {
                    if *target == source {
                        continue;
                    }
                    let strength = (0.3 + 0.1 * count.min(6) as f64).min(0.9);
                    let mut metadata = Metadata::new();
                    metadata.insert(
                        "mention_count".to_string(),
                        MetadataValue::Int(count as i64),
                    );
                    metadata.insert("stem".to_string(), MetadataValue::Str(stem.to_string()));
                    relationships.push(
                        Relationship::new(
                            source.clone(),
                            (*target).clone(),
                            RelationshipType::References,
                            strength,
                            0.6,
                        )
                        .with_reverse_strength(strength * 0.5)
                        .with_metadata(metadata),
                    );
                }
            }
        }

        debug!(candidates = relationships.len(), "reference detection complete");
        Ok(relationships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;
    use weft_domain::ContentReader;

    struct MapReader(HashMap<String, String>);

    impl ContentReader for MapReader {
        fn read_text(&self, path: &str) -> io::Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
        }
    }

    fn context(files: &[(&str, &str)]) -> DetectionContext {
        let map = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        DetectionContext::new(Arc::new(MapReader(map)), None)
    }

    fn paths(files: &[(&str, &str)]) -> Vec<String> {
        files.iter().map(|(p, _)| p.to_string()).collect()
    }

    #[test]
    fn test_mention_produces_reference() {
        let files = [
            ("docs/readme.md", "See the parser module for details. parser handles input.\n"),
            ("src/parser.rs", "pub fn parse() {}\n"),
        ];
        let strategy = ReferenceStrategy::new(&DetectConfig::default());

        let found = strategy.detect(&context(&files), &paths(&files)).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source_path, "docs/readme.md");
        assert_eq!(found[0].target_path, "src/parser.rs");
        assert_eq!(
            found[0].metadata.get("mention_count"),
            Some(&MetadataValue::Int(2))
        );
        // Two mentions: 0.3 + 0.2
        assert!((found[0].forward_strength - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_short_stems_are_ignored(){
        let files = [
            ("notes.md", "ab is mentioned here\n"),
            ("ab.py", "x = 1\n"),
        ];
        let strategy = ReferenceStrategy::new(&DetectConfig::default());

        let found = strategy.detect(&context(&files), &paths(&files)).unwrap();
        assert!(found.is_empty(), "stems below the minimum length are skipped");
    }

    #[test]
    fn test_substring_is_not_a_mention() {
        let files = [
            ("notes.md", "reparser and parsers are different words\n"),
            ("parser.rs", "pub fn parse() {}\n"),
        ];
        let strategy = ReferenceStrategy::new(&DetectConfig::default());

        let found = strategy.detect(&context(&files), &paths(&files)).unwrap();
        assert!(found.is_empty(), "word boundaries are respected");
    }
}
