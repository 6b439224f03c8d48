//! Weft Domain Layer
//!
//! This crate contains the core domain model for Weft: the relationship
//! entity, its value types, the events the engine emits, and the trait
//! interfaces that all infrastructure layers implement. Dependencies are
//! kept to serialization primitives so every other crate can depend on
//! this one without dragging in storage or runtime machinery.
//!
//! ## Key Concepts
//!
//! - **Relationship**: a directed, typed, weighted edge between two files
//! - **Strength**: [0, 1] intensity, independent per direction
//! - **Confidence**: [0, 1] detector certainty, distinct from strength
//! - **Metadata**: namespaced detector evidence (closed set of primitives)
//! - **Events**: immutable facts published when the graph changes
//!
//! ## Architecture
//!
//! - Pure domain logic only; no I/O
//! - Trait definitions for all external interactions
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod error;
pub mod event;
pub mod id;
pub mod metadata;
pub mod relationship;
pub mod traits;

// Re-exports for convenience
pub use cancel::CancelFlag;
pub use error::ValidationError;
pub use event::{EventKind, RelationshipEvent};
pub use id::RelationshipId;
pub use metadata::{Metadata, MetadataValue};
pub use relationship::{Direction, Relationship, RelationshipType};
pub use traits::{ContentReader, RelationshipStore, SimilarityScorer};
