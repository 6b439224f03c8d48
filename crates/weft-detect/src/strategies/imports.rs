//! Import analysis strategy
//!
//! Extracts import/use/require statements from Python, Rust and
//! JavaScript/TypeScript sources and resolves module names against the
//! stems of the batch's own files. Resolution is name-based, not a full
//! module-system walk: it links `import utils` to `utils.py` when both
//! are in the batch, which is the granularity the relationship graph
//! needs.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::config::DetectConfig;
use crate::error::DetectionError;
use crate::strategies::{extension, file_stem, line_of_offset, read_content};
use crate::strategy::DetectionStrategy;
use crate::types::DetectionContext;
use weft_domain::{Metadata, MetadataValue, Relationship, RelationshipType};

/// Being imported is a weaker association, from the target's side, than
/// importing is from the source's
const REVERSE_FACTOR: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceLanguage {
    Python,
    Rust,
    JavaScript,
}

fn language_of(path: &str) -> Option<SourceLanguage> {
    match extension(path)? {
        "py" | "pyi" => Some(SourceLanguage::Python),
        "rs" => Some(SourceLanguage::Rust),
        "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" => Some(SourceLanguage::JavaScript),
        _ => None,
    }
}

/// Detects `imports` relationships from import statements
pub struct ImportStrategy {
    python: Vec<Regex>,
    rust: Vec<Regex>,
    javascript: Vec<Regex>,
    max_content_bytes: usize,
}

impl ImportStrategy {
    /// Compile the per-language patterns
    pub fn new(config: &DetectConfig) -> Result<Self, DetectionError> {
        Ok(Self {
            python: vec![
                Regex::new(r"(?m)^\s*from\s+([\w.]+)\s+import\b")?,
                Regex::new(r"(?m)^\s*import\s+([\w.]+)")?,
            ],
            rust: vec![
                Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+(?:crate|super|self)::(\w+)")?,
                Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+(\w+)\s*;")?,
            ],
            javascript: vec![
                Regex::new(r#"(?m)\bfrom\s+['"]([^'"]+)['"]"#)?,
                Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#)?,
                Regex::new(r#"(?m)^\s*import\s+['"]([^'"]+)['"]"#)?,
            ],
            max_content_bytes: config.max_content_bytes,
        })
    }

    fn patterns(&self, language: SourceLanguage) -> &[Regex] {
        match language {
            SourceLanguage::Python => &self.python,
            SourceLanguage::Rust => &self.rust,
            SourceLanguage::JavaScript => &self.javascript,
        }
    }
}

/// Last meaningful segment of a module path: `pkg.sub.utils` -> `utils`,
/// `./lib/helpers.js` -> `helpers`
fn module_stem(module: &str) -> Option<&str> {
    let segment = module
        .split(['.', '/', ':'])
        .filter(|s| !s.is_empty())
        .next_back()?;
    // `./helpers.js` splits on '.' too; the filter above already dropped
    // the extension-less empty pieces, and known source extensions are
    // not useful stems.
    match segment {
        "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "py" | "rs" => {
            module
                .split(['.', '/', ':'])
                .filter(|s| !s.is_empty())
                .rev()
                .nth(1)
        }
        other => Some(other),
    }
}

impl DetectionStrategy for ImportStrategy {
    fn key(&self) -> &str {
        "imports"
    }

    fn relationship_type(&self) -> RelationshipType {
        RelationshipType::Imports
    }

    fn detect(
        &self,
        ctx: &DetectionContext,
        paths: &[String],
    ) -> Result<Vec<Relationship>, DetectionError> {
        // Shared setup: resolve targets by stem across the whole batch
        let mut by_stem: HashMap<&str, Vec<&String>> = HashMap::new();
        for path in paths {
            if let Some(stem) = file_stem(path) {
                by_stem.entry(stem).or_default().push(path);
            }
        }

        let mut relationships = Vec::new();

        for source in paths {
            let Some(language) = language_of(source) else {
                continue;
            };
            let Some(content) = read_content(ctx, source, self.max_content_bytes) else {
                continue;
            };

            // (target, count, first match offset)
            let mut hits: HashMap<&String, (i64, usize)> = HashMap::new();
            for pattern in self.patterns(language) {
                for captures in pattern.captures_iter(&content) {
                    let Some(module) = captures.get(1) else {
                        continue;
                    };
                    let Some(stem) = module_stem(module.as_str()) else {
                        continue;
                    };
                    for &target in by_stem.get(stem).into_iter().flatten() {
                        if target == source {
                            continue;
                        }
                        let entry = hits.entry(target).or_insert((0, module.start()));
                        entry.0 += 1;
                        entry.1 = entry.1.min(module.start());
                    }
                }
            }

            for (target, (count, first_offset)) in hits {
                let forward = (0.85 + 0.05 * (count.min(3) as f64)).min(1.0);
                let mut metadata = Metadata::new();
                metadata.insert("import_count".to_string(), MetadataValue::Int(count));
                metadata.insert(
                    "first_line".to_string(),
                    MetadataValue::Int(line_of_offset(&content, first_offset) as i64),
                );
                relationships.push(
                    Relationship::new(
                        source.clone(),
                        target.clone(),
                        RelationshipType::Imports,
                        forward,
                        0.9,
                    )
                    .with_reverse_strength(forward * REVERSE_FACTOR)
                    .with_metadata(metadata),
                );
            }
        }

        debug!(candidates = relationships.len(), "import analysis complete");
        Ok(relationships)
    }
}
