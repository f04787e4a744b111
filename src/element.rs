//! Versioned, independently observable elements.
//!
//! An [`Element`] pairs an immutable identity (`id`, `uri`) with a
//! [`Versioned`] snapshot of its payload carried on the element's own
//! [`ChangeChannel`]. Mutation happens only through
//! [`publish_version`](Element::publish_version), which replaces the snapshot
//! wholesale and notifies subscribers; partial states are never observable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::channel::{ChangeChannel, Subscription};

// ═══════════════════════════════════════════════════════════════════════════════
// Element Id
// ═══════════════════════════════════════════════════════════════════════════════

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of element identifiers, injected so tests can supply deterministic
/// ids.
pub trait IdGenerator: Send + Sync {
    /// Produce a fresh identifier.
    fn generate(&self) -> ElementId;
}

/// Default generator backed by random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> ElementId {
        ElementId::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Versioned Snapshot
// ═══════════════════════════════════════════════════════════════════════════════

/// One version of an element's payload, as delivered to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Versioned<T> {
    /// When this version was published.
    pub last_update: DateTime<Utc>,

    /// Names of the payload properties touched by this version, in their
    /// serialized spelling. Empty for the creation version.
    pub changed_fields: Vec<String>,

    /// The payload itself.
    pub payload: T,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Element
// ═══════════════════════════════════════════════════════════════════════════════

/// One versioned, independently observable item in a resource directory.
///
/// Cheap to clone; clones share the same identity and channel.
pub struct Element<T> {
    inner: Arc<ElementInner<T>>,
}

struct ElementInner<T> {
    id: ElementId,
    uri: String,
    created_at: DateTime<Utc>,
    channel: ChangeChannel<Versioned<T>>,
}

impl<T> Element<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new element. The channel is seeded with the creation version
    /// (no changed fields).
    pub fn new(id: ElementId, uri: impl Into<String>, payload: T) -> Self {
        let created_at = Utc::now();
        let seed = Versioned {
            last_update: created_at,
            changed_fields: Vec::new(),
            payload,
        };
        Self {
            inner: Arc::new(ElementInner {
                id,
                uri: uri.into(),
                created_at,
                channel: ChangeChannel::new(seed),
            }),
        }
    }

    /// The element's identifier. Never changes after creation.
    pub fn id(&self) -> ElementId {
        self.inner.id
    }

    /// The element's derived path. Never changes after creation.
    pub fn uri(&self) -> &str {
        &self.inner.uri
    }

    /// When the element was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// Clone of the current version.
    pub fn version(&self) -> Versioned<T> {
        self.inner.channel.current()
    }

    /// Clone of the current payload.
    pub fn payload(&self) -> T {
        self.inner.channel.current().payload
    }

    /// Timestamp of the most recent mutation (creation time until the first
    /// publish).
    pub fn last_update(&self) -> DateTime<Utc> {
        self.inner.channel.current().last_update
    }

    /// Fields touched by the most recent mutation.
    pub fn changed_fields(&self) -> Vec<String> {
        self.inner.channel.current().changed_fields
    }

    /// Publish a new version of the payload as one atomic replacement.
    ///
    /// `last_update` is kept strictly increasing across versions even when
    /// the wall clock has not advanced since the previous one.
    pub fn publish_version(&self, payload: T, changed_fields: Vec<String>) {
        self.inner.channel.update(|version| {
            let now = Utc::now();
            version.last_update = if now > version.last_update {
                now
            } else {
                version.last_update + Duration::nanoseconds(1)
            };
            version.changed_fields = changed_fields;
            version.payload = payload;
        });
    }

    /// Subscribe to this element's versions. The first receive replays the
    /// current version.
    pub fn subscribe(&self) -> Subscription<Versioned<T>> {
        self.inner.channel.subscribe()
    }

    /// The element's change channel.
    pub fn channel(&self) -> &ChangeChannel<Versioned<T>> {
        &self.inner.channel
    }
}

impl<T> Clone for Element<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Element<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.inner.id)
            .field("uri", &self.inner.uri)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn element() -> Element<String> {
        Element::new(ElementId::new(), "/svc/things/1", "payload".to_string())
    }

    #[test]
    fn test_identity_is_immutable() {
        let element = element();
        let id = element.id();
        let uri = element.uri().to_string();

        element.publish_version("other".to_string(), vec!["value".to_string()]);

        assert_eq!(element.id(), id);
        assert_eq!(element.uri(), uri);
    }

    #[test]
    fn test_creation_version_has_no_changed_fields() {
        let element = element();
        let version = element.version();
        assert!(version.changed_fields.is_empty());
        assert_eq!(version.last_update, element.created_at());
    }

    #[test]
    fn test_publish_version_replaces_payload_and_fields() {
        let element = element();
        element.publish_version("enriched".to_string(), vec!["value".to_string()]);

        let version = element.version();
        assert_eq!(version.payload, "enriched");
        assert_eq!(version.changed_fields, vec!["value".to_string()]);
    }

    #[test]
    fn test_last_update_strictly_increases() {
        let element = element();
        let created = element.last_update();

        // Publish in a tight loop; timestamps must still advance every time.
        let mut previous = created;
        for i in 0..100 {
            element.publish_version(format!("v{}", i), vec!["value".to_string()]);
            let current = element.last_update();
            assert!(current > previous);
            previous = current;
        }
    }

    #[test]
    fn test_subscriber_sees_published_version() {
        tokio_test::block_on(async {
            let element = element();
            let mut sub = element.subscribe();

            let first = sub.recv().await.unwrap();
            assert_eq!(first.payload, "payload");

            element.publish_version("enriched".to_string(), vec!["value".to_string()]);
            let second = sub.recv().await.unwrap();
            assert_eq!(second.payload, "enriched");
            assert!(second.last_update > first.last_update);
        });
    }

    #[test]
    fn test_uuid_generator_produces_unique_ids() {
        let generator = UuidGenerator;
        let a = generator.generate();
        let b = generator.generate();
        assert_ne!(a, b);
    }
}
