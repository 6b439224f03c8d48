//! Relationship - the central entity of the engine

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::RelationshipId;
use crate::metadata::{validate_metadata, Metadata};

/// Type of relationship between two files.
///
/// The set is extensible: `Custom` tags are persisted by their string
/// form, so new types need no schema change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Source imports target (import/use/require statement)
    Imports,

    /// Source mentions target by name in its content
    References,

    /// Source and target have similar content
    SimilarContent,

    /// Source and target follow a structural naming/location pattern
    StructuralSibling,

    /// A consumer-registered type, persisted by its tag
    Custom(String),
}

impl RelationshipType {
    /// Stable string form, used by the store and by exports
    pub fn as_str(&self) -> &str {
        match self {
            RelationshipType::Imports => "imports",
            RelationshipType::References => "references",
            RelationshipType::SimilarContent => "similar_content",
            RelationshipType::StructuralSibling => "structural_sibling",
            RelationshipType::Custom(tag) => tag,
        }
    }

    /// Parse from the stable string form.
    ///
    /// Unknown tags become `Custom` so types registered by consumers
    /// round-trip through the store without prior coordination. An empty
    /// tag is rejected.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "imports" => Ok(RelationshipType::Imports),
            "references" => Ok(RelationshipType::References),
            "similar_content" => Ok(RelationshipType::SimilarContent),
            "structural_sibling" => Ok(RelationshipType::StructuralSibling),
            "" => Err(ValidationError::UnknownType(s.to_string())),
            other => Ok(RelationshipType::Custom(other.to_string())),
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query axis for relationships of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Relationships where the file is the source
    Outgoing,
    /// Relationships where the file is the target
    Incoming,
    /// Both of the above
    Both,
}

/// The (source, target, type) triple that uniquely identifies a
/// relationship in the store
pub type RelationshipKey = (String, String, RelationshipType);

/// A directed, typed, weighted relationship between two files.
///
/// Strength is independent per direction: a strong outgoing reference
/// does not imply an equally strong incoming one. Confidence reflects
/// detector certainty and is tracked separately from strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier, assigned at creation, immutable
    pub id: RelationshipId,

    /// Normalized identifier of the source file
    pub source_path: String,

    /// Normalized identifier of the target file
    pub target_path: String,

    /// Type tag
    pub relationship_type: RelationshipType,

    /// Strength in the source -> target direction [0, 1]
    pub forward_strength: f64,

    /// Strength in the target -> source direction [0, 1]
    pub reverse_strength: f64,

    /// Detector certainty [0, 1], independent of strength
    pub confidence: f64,

    /// Namespaced detector evidence
    pub metadata: Metadata,

    /// Creation timestamp (epoch milliseconds)
    pub created_at: u64,

    /// Advances on any mutation (epoch milliseconds)
    pub updated_at: u64,
}

/// Current time as epoch milliseconds, consistent with UUIDv7 ids
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl Relationship {
    /// Create a new relationship.
    ///
    /// Strengths and confidence are clamped into [0, 1] - detector
    /// outputs are best-effort scores, not caller statements. Reverse
    /// strength defaults to the forward value; use
    /// [`Relationship::with_reverse_strength`] to set it independently.
    pub fn new(
        source_path: impl Into<String>,
        target_path: impl Into<String>,
        relationship_type: RelationshipType,
        forward_strength: f64,
        confidence: f64,
    ) -> Self {
        let forward = clamp_unit(forward_strength);
        let now = now_millis();
        Self {
            id: RelationshipId::new(),
            source_path: source_path.into(),
            target_path: target_path.into(),
            relationship_type,
            forward_strength: forward,
            reverse_strength: forward,
            confidence: clamp_unit(confidence),
            metadata: Metadata::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set an independent reverse-direction strength (clamped)
    pub fn with_reverse_strength(mut self, reverse_strength: f64) -> Self {
        self.reverse_strength = clamp_unit(reverse_strength);
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check domain invariants.
    ///
    /// Rejects self-loops, empty paths, non-finite scores and empty
    /// metadata keys. Called by the store before any write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source_path.is_empty() {
            return Err(ValidationError::EmptyPath("source"));
        }
        if self.target_path.is_empty() {
            return Err(ValidationError::EmptyPath("target"));
        }
        if self.source_path == self.target_path {
            return Err(ValidationError::SelfRelationship(self.source_path.clone()));
        }
        for (field, value) in [
            ("forward_strength", self.forward_strength),
            ("reverse_strength", self.reverse_strength),
            ("confidence", self.confidence),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteStrength(field));
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::StrengthOutOfRange { field, value });
            }
        }
        validate_metadata(&self.metadata)
    }

    /// The uniqueness triple: (source, target, type)
    pub fn key(&self) -> RelationshipKey {
        (
            self.source_path.clone(),
            self.target_path.clone(),
            self.relationship_type.clone(),
        )
    }

    /// Strength as seen from a query direction.
    ///
    /// Outgoing queries see the forward strength; incoming queries see
    /// the reverse strength. `Both` falls back to forward.
    pub fn effective_strength(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Outgoing | Direction::Both => self.forward_strength,
            Direction::Incoming => self.reverse_strength,
        }
    }

    /// Edge weight used by the graph layer: strength scaled by certainty
    pub fn weight(&self) -> f64 {
        self.forward_strength * self.confidence
    }

    /// Merge another detection of the same triple into this one.
    ///
    /// Strength and confidence take the maximum of the two observations;
    /// metadata is unioned (the caller namespaces keys so neither side's
    /// evidence is dropped); `updated_at` advances. The max-merge policy
    /// is a deliberate choice - see DESIGN.md.
    pub fn merge_from(&mut self, other: &Relationship) {
        debug_assert_eq!(self.key(), other.key());
        self.forward_strength = self.forward_strength.max(other.forward_strength);
        self.reverse_strength = self.reverse_strength.max(other.reverse_strength);
        self.confidence = self.confidence.max(other.confidence);
        for (key, value) in &other.metadata {
            self.metadata.insert(key.clone(), value.clone());
        }
        self.touch();
    }

    /// Advance `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at + 1);
    }
}
