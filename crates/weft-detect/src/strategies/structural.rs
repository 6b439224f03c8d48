//! Structural pattern strategy
//!
//! Works on paths alone - no content reads. Two pattern families:
//!
//! - test siblings: `test_foo.py`, `foo_test.go`, `foo.spec.ts` next to
//!   `foo.*` - the test file points at the implementation
//! - same-stem siblings: `foo.h` / `foo.c`, `foo.py` / `foo.pyi` in the
//!   same directory - a symmetric pairing

use tracing::debug;

use crate::error::DetectionError;
use crate::strategies::{file_stem, parent_dir};
use crate::strategy::DetectionStrategy;
use crate::types::DetectionContext;
use weft_domain::{Metadata, MetadataValue, Relationship, RelationshipType};

/// Detects `structural_sibling` relationships from naming and location
#[derive(Default)]
pub struct StructuralStrategy;

impl StructuralStrategy {
    /// Create the strategy
    pub fn new() -> Self {
        Self
    }
}

/// If `stem` names a test for some other stem, return that stem
fn test_subject(stem: &str) -> Option<&str> {
    stem.strip_prefix("test_")
        .or_else(|| stem.strip_suffix("_test"))
        .or_else(|| stem.strip_suffix("_spec"))
        .or_else(|| stem.strip_suffix(".test"))
        .or_else(|| stem.strip_suffix(".spec"))
}

impl DetectionStrategy for StructuralStrategy {
    fn key(&self) -> &str {
        "structural"
    }

    fn relationship_type(&self) -> RelationshipType {
        RelationshipType::StructuralSibling
    }

    fn detect(
        &self,
        _ctx: &DetectionContext,
        paths: &[String],
    ) -> Result<Vec<Relationship>, DetectionError> {
        let mut relationships = Vec::new();

        for (i, a) in paths.iter().enumerate() {
            let Some(stem_a) = file_stem(a) else { continue };
            for b in &paths[i + 1..] {
                let Some(stem_b) = file_stem(b) else { continue };
                if a == b {
                    continue;
                }

                // Test sibling: direction is test -> implementation
                let test_pair = match (test_subject(stem_a), test_subject(stem_b)) {
                    (Some(subject), _) if subject == stem_b => Some((a, b)),
                    (_, Some(subject)) if subject == stem_a => Some((b, a)),
                    _ => None,
                };
                if let Some((test, implementation)) = test_pair {
                    let mut metadata = Metadata::new();
                    metadata.insert(
                        "pattern".to_string(),
                        MetadataValue::Str("test_sibling".to_string()),
                    );
                    relationships.push(
                        Relationship::new(
                            test.clone(),
                            implementation.clone(),
                            RelationshipType::StructuralSibling,
                            0.75,
                            0.8,
                        )
                        .with_reverse_strength(0.6)
                        .with_metadata(metadata),
                    );
                    continue;
                }

                // Same stem, same directory, different extension
                if stem_a == stem_b && parent_dir(a) == parent_dir(b) {
                    let (source, target) = if a < b { (a, b) } else { (b, a) };
                    let mut metadata = Metadata::new();
                    metadata.insert(
                        "pattern".to_string(),
                        MetadataValue::Str("same_stem".to_string()),
                    );
                    relationships.push(
                        Relationship::new(
                            source.clone(),
                            target.clone(),
                            RelationshipType::StructuralSibling,
                            0.8,
                            0.85,
                        )
                        .with_metadata(metadata),
                    );
                }
            }
        }

        debug!(candidates = relationships.len(), "structural analysis complete");
        Ok(relationships)
    }
}
