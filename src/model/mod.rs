//! Schema document model consumed by the resolver.
//!
//! The resolver never touches document content directly. Everything it needs
//! goes through [`SchemaModel`], so any host that can answer five questions
//! about its documents can plug in. [`SchemaSet`] is the in-memory
//! implementation shipped with this crate.

mod document;
mod error;
pub mod location;
mod schema_set;

use std::fmt;

use smol_str::SmolStr;

pub use document::SchemaDocument;
pub use error::ModelError;
pub use schema_set::SchemaSet;

// ============================================================================
// DOCUMENT IDS
// ============================================================================

/// Handle of a document registered in a [`SchemaSet`].
///
/// The registry hands ids out in registration order and never reuses one,
/// so an id only means something to the set that issued it. Session caches
/// and inclusion graphs are keyed by it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(u32);

impl DocId {
    /// Id of the first document a registry registers.
    pub(crate) const FIRST: DocId = DocId(0);

    /// Id issued right after this one.
    pub(crate) fn next(self) -> DocId {
        DocId(self.0 + 1)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

// ============================================================================
// COMPONENTS
// ============================================================================

/// The symbol space a global component lives in.
///
/// Complex and simple types share one symbol space, so both map to `Type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Element,
    Type,
    Attribute,
    AttributeGroup,
    Group,
}

impl ComponentKind {
    /// Human-readable name of the symbol space.
    pub fn display(&self) -> &'static str {
        match self {
            ComponentKind::Element => "element",
            ComponentKind::Type => "type",
            ComponentKind::Attribute => "attribute",
            ComponentKind::AttributeGroup => "attribute group",
            ComponentKind::Group => "group",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// A named global component, owned by exactly one document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Component {
    /// The document declaring this component.
    pub document: DocId,
    pub kind: ComponentKind,
    /// Local (unprefixed) name.
    pub name: SmolStr,
}

impl Component {
    pub fn new(document: DocId, kind: ComponentKind, name: impl Into<SmolStr>) -> Self {
        Self {
            document,
            kind,
            name: name.into(),
        }
    }
}

// ============================================================================
// NAMESPACES
// ============================================================================

/// What a document declares as its target namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetNamespace {
    /// The document has no usable schema (not parsed yet, or broken).
    Unknown,
    /// Parsed, without a `targetNamespace`. Such a document is chameleon-eligible.
    Absent,
    /// Parsed, declaring this namespace URI.
    Uri(SmolStr),
}

impl TargetNamespace {
    /// Build from an optional URI. An empty URI counts as absent.
    pub fn from_option(uri: Option<&str>) -> Self {
        match uri {
            Some(uri) if !uri.is_empty() => TargetNamespace::Uri(SmolStr::new(uri)),
            _ => TargetNamespace::Absent,
        }
    }

    /// Whether the document has a schema at all.
    pub fn is_known(&self) -> bool {
        !matches!(self, TargetNamespace::Unknown)
    }

    /// The namespace as the resolver compares it: `None` for absent or unknown.
    pub fn uri(&self) -> Option<&str> {
        match self {
            TargetNamespace::Uri(uri) => Some(uri.as_str()),
            _ => None,
        }
    }

    /// Exact match against a namespace the resolver is looking for.
    ///
    /// `Unknown` never matches, not even `None`.
    pub fn matches(&self, namespace: Option<&str>) -> bool {
        self.is_known() && self.uri() == namespace
    }
}

// ============================================================================
// COMPOSITIONS
// ============================================================================

/// A composition reference from one document to another.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Composition {
    Include {
        location: SmolStr,
    },
    Redefine {
        location: SmolStr,
    },
    Import {
        /// The namespace the imported document is expected to declare.
        namespace: Option<SmolStr>,
        location: Option<SmolStr>,
    },
}

impl Composition {
    pub fn include(location: impl Into<SmolStr>) -> Self {
        Composition::Include {
            location: location.into(),
        }
    }

    pub fn redefine(location: impl Into<SmolStr>) -> Self {
        Composition::Redefine {
            location: location.into(),
        }
    }

    pub fn import(namespace: Option<&str>, location: Option<&str>) -> Self {
        Composition::Import {
            namespace: namespace.filter(|ns| !ns.is_empty()).map(SmolStr::new),
            location: location.map(SmolStr::new),
        }
    }

    /// Include and redefine both keep the namespace; the resolver treats them alike.
    pub fn is_inclusion(&self) -> bool {
        matches!(self, Composition::Include { .. } | Composition::Redefine { .. })
    }

    /// Whether this is an import of exactly `namespace`.
    pub fn imports(&self, namespace: Option<&str>) -> bool {
        match self {
            Composition::Import { namespace: ns, .. } => ns.as_deref() == namespace,
            _ => false,
        }
    }

    /// The referenced location, if the reference carries one.
    pub fn location(&self) -> Option<&str> {
        match self {
            Composition::Include { location } | Composition::Redefine { location } => {
                Some(location.as_str())
            }
            Composition::Import { location, .. } => location.as_deref(),
        }
    }
}

// ============================================================================
// MODEL TRAIT
// ============================================================================

/// The document-model collaborator the resolver queries.
///
/// Implementations must treat documents as read-only for the duration of one
/// resolve call; the resolver caches what it learns per call.
pub trait SchemaModel {
    /// The target namespace declared by `doc`.
    fn target_namespace(&self, doc: DocId) -> TargetNamespace;

    /// Find a global component declared directly in `doc`.
    fn find_component(&self, doc: DocId, kind: ComponentKind, name: &str) -> Option<Component>;

    /// The composition references of `doc`, in document order.
    fn compositions(&self, doc: DocId) -> Vec<Composition>;

    /// Resolve a reference made by `doc`. Broken references yield `None`.
    fn resolve_composition(&self, doc: DocId, composition: &Composition) -> Option<DocId>;

    /// Snapshot of every document currently known to the model.
    fn documents(&self) -> Vec<DocId>;
}

impl<M: SchemaModel + ?Sized> SchemaModel for &M {
    fn target_namespace(&self, doc: DocId) -> TargetNamespace {
        (**self).target_namespace(doc)
    }

    fn find_component(&self, doc: DocId, kind: ComponentKind, name: &str) -> Option<Component> {
        (**self).find_component(doc, kind, name)
    }

    fn compositions(&self, doc: DocId) -> Vec<Composition> {
        (**self).compositions(doc)
    }

    fn resolve_composition(&self, doc: DocId, composition: &Composition) -> Option<DocId> {
        (**self).resolve_composition(doc, composition)
    }

    fn documents(&self) -> Vec<DocId> {
        (**self).documents()
    }
}
