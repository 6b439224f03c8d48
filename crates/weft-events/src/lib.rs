//! Weft Event Bus
//!
//! Synchronous in-process publish/subscribe for relationship change
//! notifications. This is the integration seam for downstream consumers
//! (search re-ranking, tag suggestion): they subscribe to an
//! [`EventKind`] and receive every matching [`RelationshipEvent`] the
//! engine publishes.
//!
//! Delivery rules:
//!
//! - Subscribers registered for an event's own kind are invoked first,
//!   then subscribers registered for [`EventKind::Any`] (the supertype).
//! - A subscriber error is logged and swallowed: it never reaches the
//!   publisher's call stack and never suppresses later subscribers.

#![warn(missing_docs)]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, warn};
use weft_domain::{EventKind, RelationshipEvent};

/// Error returned by a subscriber's handler.
///
/// The bus logs these and carries on; they exist so handlers can report
/// failure without panicking.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    /// Build from any displayable cause
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

/// A consumer of relationship events
pub trait EventSubscriber: Send + Sync {
    /// Identifier used in log lines when the handler fails
    fn name(&self) -> &str;

    /// Handle one published event
    fn on_event(&self, event: &RelationshipEvent) -> Result<(), SubscriberError>;
}

/// Synchronous in-process event bus keyed by event kind
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<EventKind, Vec<Arc<dyn EventSubscriber>>>>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for one event kind.
    ///
    /// Subscribing to [`EventKind::Any`] receives every event.
    pub fn subscribe(&self, kind: EventKind, subscriber: Arc<dyn EventSubscriber>) {
        if let Ok(mut subscribers) = self.subscribers.write() {
            subscribers.entry(kind).or_default().push(subscriber);
        }
    }

    /// Publish an event to every matching subscriber.
    ///
    /// Handlers run on the caller's thread, in registration order, own
    /// kind before `Any`. Handler errors are logged and isolated.
    pub fn publish(&self, event: &RelationshipEvent) {
        let targets: Vec<Arc<dyn EventSubscriber>> = {
            let Ok(subscribers) = self.subscribers.read() else {
                return;
            };
            let mut targets = Vec::new();
            if let Some(own) = subscribers.get(&event.kind()) {
                targets.extend(own.iter().cloned());
            }
            if let Some(any) = subscribers.get(&EventKind::Any) {
                targets.extend(any.iter().cloned());
            }
            targets
        };

        debug!(kind = ?event.kind(), subscribers = targets.len(), "publishing event");

        for subscriber in targets {
            if let Err(e) = subscriber.on_event(event) {
                warn!(
                    subscriber = subscriber.name(),
                    error = %e,
                    "event subscriber failed; continuing"
                );
            }
        }
    }

    /// Number of subscribers registered for a kind
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .read()
            .map(|s| s.get(&kind).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}
