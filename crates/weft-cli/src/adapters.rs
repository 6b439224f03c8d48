//! Collaborator implementations supplied by the front-end.
//!
//! The engine consumes a content reader and an optional similarity
//! scorer through the traits in weft-domain; these are the CLI's
//! implementations. The token-overlap scorer is a deliberately simple
//! baseline - swap in an embedding-backed scorer by implementing
//! [`SimilarityScorer`] and passing it to the engine builder.
//!
//! [`SimilarityScorer`]: weft_domain::SimilarityScorer

use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::Mutex;

use tracing::info;
use weft_domain::{ContentReader, RelationshipEvent, SimilarityScorer};
use weft_events::{EventSubscriber, SubscriberError};

/// Reads file content straight from the filesystem
pub struct FsContentReader;

impl ContentReader for FsContentReader {
    fn read_text(&self, path: &str) -> std::io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Jaccard similarity over identifier-like tokens.
///
/// Token sets are cached per path for the lifetime of the scorer, so a
/// batch of n files costs n reads, not n squared.
pub struct TokenOverlapScorer {
    tokens: Mutex<HashMap<String, HashSet<String>>>,
}

impl TokenOverlapScorer {
    /// Create a scorer with an empty token cache
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    fn tokens_of(&self, path: &str) -> HashSet<String> {
        if let Ok(cache) = self.tokens.lock() {
            if let Some(tokens) = cache.get(path) {
                return tokens.clone();
            }
        }
        let tokens: HashSet<String> = fs::read_to_string(path)
            .map(|content| {
                content
                    .split(|c: char| !c.is_alphanumeric() && c != '_')
                    .filter(|t| t.len() >= 3)
                    .map(|t| t.to_lowercase())
                    .collect()
            })
            .unwrap_or_default();
        if let Ok(mut cache) = self.tokens.lock() {
            cache.insert(path.to_string(), tokens.clone());
        }
        tokens
    }
}

impl Default for TokenOverlapScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityScorer for TokenOverlapScorer {
    fn similarity(&self, path_a: &str, path_b: &str) -> f64 {
        let a = self.tokens_of(path_a);
        let b = self.tokens_of(path_b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let intersection = a.intersection(&b).count();
        let union = a.len() + b.len() - intersection;
        intersection as f64 / union as f64
    }
}

/// Bus subscriber that narrates graph changes into the log stream
pub struct LoggingSubscriber;

impl EventSubscriber for LoggingSubscriber {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_event(&self, event: &RelationshipEvent) -> Result<(), SubscriberError> {
        match event {
            RelationshipEvent::Detected {
                sources,
                relationships,
            } => {
                info!(
                    sources = sources.len(),
                    relationships = relationships.len(),
                    "detection completed"
                );
            }
            RelationshipEvent::Changed {
                file,
                added,
                removed,
                updated,
            } => {
                info!(
                    file,
                    added = added.len(),
                    removed = removed.len(),
                    updated = updated.len(),
                    "relationships changed"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_overlap_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.py");
        let b = dir.path().join("b.py");
        std::fs::write(&a, "def process(data):\n    return data\n").unwrap();
        std::fs::write(&b, "def process(data):\n    return data\n").unwrap();

        let scorer = TokenOverlapScorer::new();
        let score = scorer.similarity(&a.to_string_lossy(), &b.to_string_lossy());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_token_overlap_disjoint_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.py");
        let b = dir.path().join("b.py");
        std::fs::write(&a, "alpha bravo charlie\n").unwrap();
        std::fs::write(&b, "delta echo foxtrot\n").unwrap();

        let scorer = TokenOverlapScorer::new();
        let score = scorer.similarity(&a.to_string_lossy(), &b.to_string_lossy());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_unreadable_file_scores_zero() {
        let scorer = TokenOverlapScorer::new();
        assert_eq!(scorer.similarity("/nonexistent/a", "/nonexistent/b"), 0.0);
    }

    #[test]
    fn test_fs_reader_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.txt");
        std::fs::write(&path, "hello").unwrap();

        let reader = FsContentReader;
        assert_eq!(reader.read_text(&path.to_string_lossy()).unwrap(), "hello");
        assert!(reader.read_text("/nonexistent").is_err());
    }
}
