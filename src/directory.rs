//! Ordered, observable collections of elements.
//!
//! A [`ResourceDirectory`] owns its elements in insertion order and announces
//! structural changes (init/add/remove/update) on a directory-level
//! [`ChangeChannel`], independent of any single element's payload changes.
//! Individual element mutations are observed through each element's own
//! channel.
//!
//! All directory operations are non-blocking: the synchronous portion of
//! `create` (validate, append, publish the structural event) runs under one
//! writer lock with no awaits inside, so elements and structural events are
//! ordered on a single sequential timeline per directory. Enrichment, when
//! configured, runs afterwards on its own task and touches only the created
//! element.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::channel::{ChangeChannel, Subscription};
use crate::element::{Element, ElementId, IdGenerator, UuidGenerator};
use crate::enrichment::EnrichmentPipeline;
use crate::error::{Result, SignpostError};
use crate::validation::Validate;

// ═══════════════════════════════════════════════════════════════════════════════
// Structural Events
// ═══════════════════════════════════════════════════════════════════════════════

/// What happened to a directory's element set.
///
/// `Remove` and `Update` are part of the event vocabulary for subscribers but
/// no directory operation emits them yet: elements are never deleted or
/// structurally replaced in the current scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Init,
    Add,
    Remove,
    Update,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        };
        write!(f, "{}", s)
    }
}

/// A directory-level notification that the element set changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEvent {
    /// When the change happened.
    pub last_update: DateTime<Utc>,

    /// The kind of change.
    pub action: ChangeAction,
}

impl DirectoryEvent {
    /// The synthetic event every directory starts with, before any element
    /// exists.
    pub fn init() -> Self {
        Self::new(ChangeAction::Init)
    }

    /// An event stamped with the current time.
    pub fn new(action: ChangeAction) -> Self {
        Self {
            last_update: Utc::now(),
            action,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// List Ranges
// ═══════════════════════════════════════════════════════════════════════════════

/// Slice-style pagination bounds for [`ResourceDirectory::list`].
///
/// `offset` is a start index and `limit` an exclusive end index into the
/// insertion-ordered element sequence; an omitted bound defaults to the start
/// or end of the sequence. Out-of-range bounds are clamped, and an end before
/// the start yields an empty page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListRange {
    /// Start index (inclusive). Defaults to 0.
    pub offset: Option<usize>,
    /// End index (exclusive). Defaults to the sequence length.
    pub limit: Option<usize>,
}

impl ListRange {
    /// The full sequence.
    pub fn all() -> Self {
        Self::default()
    }

    /// Both bounds supplied.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    /// Set the start index.
    pub fn starting_at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the exclusive end index.
    pub fn up_to(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Parse raw string bounds as supplied by an outer transport.
    ///
    /// Non-numeric input is an `InvalidArgument` error; absent input leaves
    /// the bound unset.
    pub fn parse(offset: Option<&str>, limit: Option<&str>) -> Result<Self> {
        Ok(Self {
            offset: parse_bound("offset", offset)?,
            limit: parse_bound("limit", limit)?,
        })
    }

    fn slice_bounds(&self, len: usize) -> (usize, usize) {
        let start = self.offset.unwrap_or(0).min(len);
        let end = self.limit.unwrap_or(len).min(len).max(start);
        (start, end)
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<usize>> {
    match raw {
        None => Ok(None),
        Some(s) => s.trim().parse::<usize>().map(Some).map_err(|_| {
            SignpostError::invalid_argument(format!(
                "{} must be a non-negative integer (got {:?})",
                name, s
            ))
        }),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Directory Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for [`ResourceDirectory`].
pub struct DirectoryBuilder<T> {
    service_name: String,
    name: String,
    ids: Arc<dyn IdGenerator>,
    pipeline: Option<EnrichmentPipeline<T>>,
}

impl<T> DirectoryBuilder<T>
where
    T: Validate + Clone + Send + Sync + 'static,
{
    /// Inject an identifier source (defaults to random v4 UUIDs).
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Attach an enrichment pipeline, invoked once per created element.
    pub fn enrichment(mut self, pipeline: EnrichmentPipeline<T>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Build the directory. Its structural channel is seeded with the
    /// synthetic `init` event.
    pub fn build(self) -> ResourceDirectory<T> {
        debug!(
            service = %self.service_name,
            directory = %self.name,
            "Directory created"
        );
        ResourceDirectory {
            inner: Arc::new(DirectoryInner {
                service_name: self.service_name,
                name: self.name,
                elements: RwLock::new(Vec::new()),
                change: ChangeChannel::new(DirectoryEvent::init()),
                ids: self.ids,
                pipeline: self.pipeline,
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Resource Directory
// ═══════════════════════════════════════════════════════════════════════════════

/// An ordered collection of [`Element`]s, homogeneous in payload type `T`.
///
/// Cheap to clone; clones share the same storage and channels.
pub struct ResourceDirectory<T> {
    inner: Arc<DirectoryInner<T>>,
}

struct DirectoryInner<T> {
    service_name: String,
    name: String,
    elements: RwLock<Vec<Element<T>>>,
    change: ChangeChannel<DirectoryEvent>,
    ids: Arc<dyn IdGenerator>,
    pipeline: Option<EnrichmentPipeline<T>>,
}

impl<T> ResourceDirectory<T>
where
    T: Validate + Clone + Send + Sync + 'static,
{
    /// Start building a directory under the given service and directory
    /// names (both lowercased into element URIs).
    pub fn builder(
        service_name: impl Into<String>,
        name: impl Into<String>,
    ) -> DirectoryBuilder<T> {
        DirectoryBuilder {
            service_name: service_name.into(),
            name: name.into(),
            ids: Arc::new(UuidGenerator),
            pipeline: None,
        }
    }

    /// The directory's name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The owning service's name.
    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    /// The directory's derived path.
    pub fn uri(&self) -> String {
        format!(
            "/{}/{}",
            self.inner.service_name.to_lowercase(),
            self.inner.name.to_lowercase()
        )
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.elements.read().len()
    }

    /// Whether the directory holds no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.elements.read().is_empty()
    }

    /// Validate `state`, append a new element, publish an `add` structural
    /// event and return the element handle.
    ///
    /// Returns without waiting on enrichment: when a pipeline is attached the
    /// element is handed to it after this call's effects are already visible,
    /// and enrichment outcomes are only observable through the element's own
    /// channel.
    pub fn create(&self, state: T) -> Result<Element<T>> {
        state.validate()?;

        let id = self.inner.ids.generate();
        let uri = format!("{}/{}", self.uri(), id);
        let element = Element::new(id, uri, state);

        {
            let mut elements = self.inner.elements.write();
            if elements.iter().any(|e| e.id() == id) {
                return Err(SignpostError::duplicate_element(id));
            }
            elements.push(element.clone());
        }

        self.inner.change.publish(DirectoryEvent::new(ChangeAction::Add));
        debug!(
            directory = %self.inner.name,
            element = %id,
            uri = %element.uri(),
            "Element created"
        );

        if let Some(pipeline) = &self.inner.pipeline {
            pipeline.spawn(element.clone());
        }

        Ok(element)
    }

    /// Look up an element by id.
    pub fn element(&self, id: ElementId) -> Result<Element<T>> {
        self.inner
            .elements
            .read()
            .iter()
            .find(|e| e.id() == id)
            .cloned()
            .ok_or_else(|| SignpostError::element_not_found(id))
    }

    /// List elements in insertion order, restricted to `range`.
    pub fn list(&self, range: ListRange) -> Vec<Element<T>> {
        let elements = self.inner.elements.read();
        let (start, end) = range.slice_bounds(elements.len());
        elements[start..end].to_vec()
    }

    /// The directory-level channel of structural events.
    pub fn change(&self) -> &ChangeChannel<DirectoryEvent> {
        &self.inner.change
    }

    /// Subscribe to structural events. The first receive replays the latest
    /// event (the synthetic `init` for an untouched directory).
    pub fn subscribe(&self) -> Subscription<DirectoryEvent> {
        self.inner.change.subscribe()
    }
}

impl<T> Clone for ResourceDirectory<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ResourceDirectory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDirectory")
            .field("service", &self.inner.service_name)
            .field("name", &self.inner.name)
            .field("len", &self.inner.elements.read().len())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementId;
    use crate::validation::{validate_field, Required, ValidationErrors, ValidationResult};
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Debug, Clone)]
    struct Note {
        title: String,
    }

    impl Validate for Note {
        fn validate(&self) -> ValidationResult {
            let mut errors = ValidationErrors::new();
            validate_field(&mut errors, "title", &self.title, &[&Required]);
            errors.into_result()
        }
    }

    fn note(title: &str) -> Note {
        Note {
            title: title.to_string(),
        }
    }

    fn directory() -> ResourceDirectory<Note> {
        ResourceDirectory::builder("journal", "notes").build()
    }

    /// Deterministic id source: nil-prefixed counter UUIDs.
    struct SequentialIds(AtomicU64);

    impl IdGenerator for SequentialIds {
        fn generate(&self) -> ElementId {
            let n = self.0.fetch_add(1, Ordering::Relaxed);
            ElementId(uuid::Uuid::from_u64_pair(0, n))
        }
    }

    #[test]
    fn test_create_appends_and_returns_handle() {
        let dir = directory();
        let element = dir.create(note("first")).unwrap();

        assert_eq!(dir.len(), 1);
        assert_eq!(element.payload().title, "first");
        assert!(element.uri().starts_with("/journal/notes/"));
    }

    #[test]
    fn test_create_rejects_invalid_state() {
        let dir = directory();
        let error = dir.create(note("")).unwrap_err();

        assert_eq!(error.code(), crate::ErrorCode::MissingRequiredField);
        assert!(dir.is_empty());
    }

    #[test]
    fn test_uri_is_deterministic_for_injected_ids() {
        let dir = ResourceDirectory::<Note>::builder("Journal", "Notes")
            .id_generator(Arc::new(SequentialIds(AtomicU64::new(7))))
            .build();

        let element = dir.create(note("first")).unwrap();
        assert_eq!(
            element.uri(),
            format!("/journal/notes/{}", uuid::Uuid::from_u64_pair(0, 7))
        );
    }

    #[test]
    fn test_duplicate_generated_id_is_rejected() {
        // A generator stuck on one id violates the uniqueness invariant.
        struct StuckIds(ElementId);
        impl IdGenerator for StuckIds {
            fn generate(&self) -> ElementId {
                self.0
            }
        }

        let dir = ResourceDirectory::<Note>::builder("journal", "notes")
            .id_generator(Arc::new(StuckIds(ElementId::new())))
            .build();

        dir.create(note("first")).unwrap();
        let error = dir.create(note("second")).unwrap_err();
        assert_eq!(error.code(), crate::ErrorCode::DuplicateElement);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_element_lookup() {
        let dir = directory();
        let created = dir.create(note("first")).unwrap();

        let found = dir.element(created.id()).unwrap();
        assert_eq!(found.id(), created.id());

        let error = dir.element(ElementId::new()).unwrap_err();
        assert_eq!(error.code(), crate::ErrorCode::ElementNotFound);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let dir = directory();
        for i in 0..5 {
            dir.create(note(&format!("note-{}", i))).unwrap();
        }

        let titles: Vec<_> = dir
            .list(ListRange::all())
            .iter()
            .map(|e| e.payload().title)
            .collect();
        assert_eq!(titles, ["note-0", "note-1", "note-2", "note-3", "note-4"]);
    }

    #[test]
    fn test_list_slice_bounds() {
        let dir = directory();
        for i in 0..5 {
            dir.create(note(&format!("note-{}", i))).unwrap();
        }

        assert_eq!(dir.list(ListRange::new(1, 3)).len(), 2);
        assert_eq!(dir.list(ListRange::default().starting_at(3)).len(), 2);
        assert_eq!(dir.list(ListRange::default().up_to(2)).len(), 2);
        // Clamped and inverted bounds degrade to empty, not a panic.
        assert_eq!(dir.list(ListRange::new(10, 20)).len(), 0);
        assert_eq!(dir.list(ListRange::new(4, 2)).len(), 0);
    }

    #[test]
    fn test_list_range_parse() {
        assert_eq!(
            ListRange::parse(Some("2"), Some("5")).unwrap(),
            ListRange::new(2, 5)
        );
        assert_eq!(ListRange::parse(None, None).unwrap(), ListRange::all());

        let error = ListRange::parse(Some("two"), None).unwrap_err();
        assert_eq!(error.code(), crate::ErrorCode::InvalidArgument);
        let error = ListRange::parse(None, Some("-1")).unwrap_err();
        assert_eq!(error.code(), crate::ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_structural_events() {
        tokio_test::block_on(async {
            let dir = directory();

            // Before any element exists the latest event is the seed.
            let mut sub = dir.subscribe();
            let first = sub.recv().await.unwrap();
            assert_eq!(first.action, ChangeAction::Init);

            dir.create(note("first")).unwrap();
            let second = sub.recv().await.unwrap();
            assert_eq!(second.action, ChangeAction::Add);
            assert!(second.last_update >= first.last_update);
        });
    }

    #[test]
    fn test_late_subscriber_replays_latest_structural_event() {
        tokio_test::block_on(async {
            let dir = directory();
            dir.create(note("first")).unwrap();
            dir.create(note("second")).unwrap();

            let mut sub = dir.subscribe();
            let replay = sub.recv().await.unwrap();
            assert_eq!(replay.action, ChangeAction::Add);
        });
    }
}
