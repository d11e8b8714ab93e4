//! In-memory schema registry.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;

use super::{
    Component, ComponentKind, Composition, DocId, ModelError, SchemaDocument, SchemaModel, TargetNamespace, location,
};

/// Manages the mapping between document locations and DocIds.
///
/// This is the "schema database" that assigns stable IDs to locations and
/// tracks parsed content. A location may be known before its content (see
/// [`SchemaSet::reserve`]); such documents report [`TargetNamespace::Unknown`].
///
/// Thread-safe via internal locking, so one set can serve resolve calls from
/// several threads. Each call sees a snapshot of the documents registered
/// when it asked.
#[derive(Debug)]
pub struct SchemaSet {
    inner: RwLock<SchemaSetInner>,
    namespace_imports: bool,
}

#[derive(Debug)]
struct SchemaSetInner {
    /// Location → DocId mapping
    location_to_id: IndexMap<SmolStr, DocId>,
    /// DocId → Location mapping (reverse lookup)
    id_to_location: IndexMap<DocId, SmolStr>,
    /// DocId → parsed content
    documents: IndexMap<DocId, Arc<SchemaDocument>>,
    /// Next DocId to assign
    next_id: DocId,
}

impl Default for SchemaSetInner {
    fn default() -> Self {
        Self {
            location_to_id: IndexMap::new(),
            id_to_location: IndexMap::new(),
            documents: IndexMap::new(),
            next_id: DocId::FIRST,
        }
    }
}

impl Default for SchemaSet {
    fn default() -> Self {
        Self {
            inner: RwLock::default(),
            namespace_imports: true,
        }
    }
}

impl SchemaSet {
    /// Create a new empty schema set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an `import` without `schemaLocation` resolves to a registered
    /// document declaring the imported namespace. On by default.
    ///
    /// Only imports naming a namespace qualify; a bare `<import/>` never
    /// resolves this way, and the importing document is never its own target.
    pub fn with_namespace_imports(mut self, enabled: bool) -> Self {
        self.namespace_imports = enabled;
        self
    }

    /// Get or create a DocId for a location.
    ///
    /// If the location already has a DocId, returns it. Otherwise assigns a
    /// new one with no content attached.
    pub fn reserve(&self, location: &str) -> DocId {
        let location = location::normalize(location);

        // Fast path: read lock
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.location_to_id.get(location.as_str()) {
                return id;
            }
        }

        // Slow path: write lock
        let mut inner = self.inner.write();

        // Double-check
        if let Some(&id) = inner.location_to_id.get(location.as_str()) {
            return id;
        }

        let id = inner.next_id;
        inner.next_id = id.next();
        let location = SmolStr::new(location);
        inner.location_to_id.insert(location.clone(), id);
        inner.id_to_location.insert(id, location);
        id
    }

    /// Register a parsed document under a location.
    ///
    /// Fails if the location already holds parsed content. A location that was
    /// only reserved keeps its id and receives the content.
    pub fn insert(&self, location: &str, document: SchemaDocument) -> Result<DocId, ModelError> {
        let id = self.reserve(location);
        let mut inner = self.inner.write();
        if inner.documents.contains_key(&id) {
            return Err(ModelError::DuplicateLocation(SmolStr::new(location::normalize(location))));
        }
        inner.documents.insert(id, Arc::new(document));
        Ok(id)
    }

    /// Attach or replace the content of a known document.
    pub fn set_document(&self, doc: DocId, document: SchemaDocument) -> Result<(), ModelError> {
        let mut inner = self.inner.write();
        if !inner.id_to_location.contains_key(&doc) {
            return Err(ModelError::UnknownDocument(doc));
        }
        inner.documents.insert(doc, Arc::new(document));
        Ok(())
    }

    /// Remove a document from the set.
    pub fn remove(&self, doc: DocId) {
        let mut inner = self.inner.write();
        if let Some(location) = inner.id_to_location.swap_remove(&doc) {
            inner.location_to_id.swap_remove(&location);
        }
        inner.documents.swap_remove(&doc);
    }

    /// Get the DocId registered for a location.
    pub fn doc_id(&self, location: &str) -> Option<DocId> {
        let location = location::normalize(location);
        self.inner.read().location_to_id.get(location.as_str()).copied()
    }

    /// Get the location of a document.
    pub fn location(&self, doc: DocId) -> Option<SmolStr> {
        self.inner.read().id_to_location.get(&doc).cloned()
    }

    /// Get the parsed content of a document.
    pub fn document(&self, doc: DocId) -> Option<Arc<SchemaDocument>> {
        self.inner.read().documents.get(&doc).cloned()
    }

    /// Whether the document has parsed content.
    pub fn is_parsed(&self, doc: DocId) -> bool {
        self.inner.read().documents.contains_key(&doc)
    }

    /// Get the number of known documents, parsed or not.
    pub fn len(&self) -> usize {
        self.inner.read().location_to_id.len()
    }

    /// Check if the schema set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a location relative to the location of `from`.
    fn resolve_location(&self, from: DocId, relative: &str) -> Option<DocId> {
        let inner = self.inner.read();
        let base = inner.id_to_location.get(&from)?;
        let target = location::join(base, relative);
        inner.location_to_id.get(target.as_str()).copied()
    }

    /// First parsed document other than `importer`, in registration order,
    /// declaring `namespace`.
    fn find_by_namespace(&self, importer: DocId, namespace: &str) -> Option<DocId> {
        let inner = self.inner.read();
        inner
            .documents
            .iter()
            .filter(|&(&id, _)| id != importer)
            .find(|(_, document)| document.target_namespace().matches(Some(namespace)))
            .map(|(&id, _)| id)
    }
}

impl SchemaModel for SchemaSet {
    fn target_namespace(&self, doc: DocId) -> TargetNamespace {
        self.document(doc)
            .map(|document| document.target_namespace())
            .unwrap_or(TargetNamespace::Unknown)
    }

    fn find_component(&self, doc: DocId, kind: ComponentKind, name: &str) -> Option<Component> {
        let document = self.document(doc)?;
        document
            .declares(kind, name)
            .then(|| Component::new(doc, kind, name))
    }

    fn compositions(&self, doc: DocId) -> Vec<Composition> {
        self.document(doc)
            .map(|document| document.compositions().to_vec())
            .unwrap_or_default()
    }

    fn resolve_composition(&self, doc: DocId, composition: &Composition) -> Option<DocId> {
        let resolved = match composition {
            Composition::Import {
                namespace: Some(namespace),
                location: None,
            } if self.namespace_imports => self.find_by_namespace(doc, namespace),
            _ => composition
                .location()
                .and_then(|location| self.resolve_location(doc, location)),
        };
        if resolved.is_none() {
            tracing::debug!(
                target: "xsd_resolve::model",
                %doc,
                reference = ?composition,
                "unresolved composition reference"
            );
        }
        resolved
    }

    fn documents(&self) -> Vec<DocId> {
        self.inner.read().id_to_location.keys().copied().collect()
    }
}
