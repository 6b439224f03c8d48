//! Relationship change events - immutable facts published by the engine

use serde::{Deserialize, Serialize};

use crate::relationship::Relationship;

/// Subscription key for the event bus.
///
/// `Any` is the supertype of the concrete kinds: a subscriber registered
/// for `Any` receives every event in addition to subscribers registered
/// for the event's own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// All events
    Any,
    /// A detection run completed
    Detected,
    /// The stored relationships of a file changed
    Changed,
}

/// An event describing a change to the relationship graph.
///
/// Events are immutable once published; subscribers receive shared
/// references and must not rely on being the only consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelationshipEvent {
    /// A detection run completed over `sources`
    Detected {
        /// The files that were scanned
        sources: Vec<String>,
        /// Every relationship the run produced (merged)
        relationships: Vec<Relationship>,
    },

    /// The stored relationships of `file` changed
    Changed {
        /// The file whose edge set changed
        file: String,
        /// Newly created relationships
        added: Vec<Relationship>,
        /// Relationships deleted from the store
        removed: Vec<Relationship>,
        /// Relationships whose strength/metadata changed
        updated: Vec<Relationship>,
    },
}

impl RelationshipEvent {
    /// The concrete kind of this event
    pub fn kind(&self) -> EventKind {
        match self {
            RelationshipEvent::Detected { .. } => EventKind::Detected,
            RelationshipEvent::Changed { .. } => EventKind::Changed,
        }
    }
}
