//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Storage lives in weft-store; content reading and
//! similarity scoring are supplied by the front-end and are never
//! implemented inside the core crates.

use crate::id::RelationshipId;
use crate::relationship::{Direction, Relationship, RelationshipType};

/// Trait for storing and querying relationships
///
/// Implemented by the infrastructure layer (weft-store). Writes update
/// `updated_at`; adds upsert on the (source, target, type) uniqueness
/// triple with the max-merge rule rather than erroring on duplicates.
pub trait RelationshipStore {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Add or merge a single relationship, returning its stored id
    fn add(&mut self, relationship: Relationship) -> Result<RelationshipId, Self::Error>;

    /// Add or merge a batch atomically - all rows commit or none do
    fn add_batch(
        &mut self,
        relationships: Vec<Relationship>,
    ) -> Result<Vec<RelationshipId>, Self::Error>;

    /// Get a relationship by id
    fn get(&self, id: RelationshipId) -> Result<Option<Relationship>, Self::Error>;

    /// Relationships touching `path` along the given query axis
    fn get_for_file(
        &self,
        path: &str,
        direction: Direction,
    ) -> Result<Vec<Relationship>, Self::Error>;

    /// Every stored relationship (graph snapshot read path)
    fn all(&self) -> Result<Vec<Relationship>, Self::Error>;

    /// Remove relationships between two files, optionally restricted to
    /// one type. Returns the number of rows removed.
    fn remove(
        &mut self,
        source: &str,
        target: &str,
        relationship_type: Option<&RelationshipType>,
    ) -> Result<usize, Self::Error>;

    /// Remove every relationship touching `path` (endpoint deletion
    /// lifecycle). Returns the number of rows removed.
    fn remove_for_file(&mut self, path: &str) -> Result<usize, Self::Error>;

    /// Update one direction's strength of an existing relationship.
    ///
    /// Unlike detector-constructed values, the new value is validated
    /// and rejected when outside [0, 1].
    fn update_strength(
        &mut self,
        id: RelationshipId,
        direction: Direction,
        value: f64,
    ) -> Result<(), Self::Error>;
}

/// Capability to read file content as text
///
/// Supplied by the front-end; used by the lexical detection strategies.
pub trait ContentReader: Send + Sync {
    /// Read the content of `path` as UTF-8 text
    fn read_text(&self, path: &str) -> std::io::Result<String>;
}

/// Capability to score content similarity between two files
///
/// Optional; used only by the content-similarity strategy. Scores are
/// expected in [0, 1] - implementations outside that range are clamped
/// by the consumer.
pub trait SimilarityScorer: Send + Sync {
    /// Similarity of the two files' content in [0, 1]
    fn similarity(&self, path_a: &str, path_b: &str) -> f64;
}
