//! Name resolution: finding global components across schema documents.
//!
//! # Architecture
//!
//! A query names a start document, a namespace, a local name and a kind.
//! The relation between the start document's namespace and the sought one
//! picks one of three strategies ([`Strategy::select`]):
//!
//! 1. **Include** - same namespace (or both absent): search what the start
//!    document includes, then the cluster of documents that include it.
//! 2. **Import** - different namespace: search imports, from the start
//!    document's own imports out to those of its whole inclusion cluster.
//! 3. **Chameleon** - the start document has no namespace but the sought one
//!    does: interleave both, cheapest searches first.
//!
//! Every query owns one [`ResolveSession`]. It remembers which documents
//! have been searched, so cyclic include and import graphs terminate, and it
//! memoizes the inclusion graphs the upward searches need.
//!
//! ## Key Data Structures
//!
//! - [`BidirectionalGraph`] - includes/included-by edges with cycle-safe roots
//! - [`ResolveSession`] - per-query cache
//! - [`SchemaResolver`] - query entry point over a [`SchemaModel`]

pub mod graph;
pub mod import;
pub mod include;
mod session;

use std::fmt;

use crate::model::{Component, ComponentKind, DocId, SchemaModel};

pub use graph::{BidirectionalGraph, Graph};
pub use session::{Checked, ResolveSession};

// ============================================================================
// STRATEGY
// ============================================================================

/// How a query is answered, decided by the namespace relationship alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Start and sought namespace are equal, or both absent.
    Include,
    /// The start document has no namespace; the sought one is not empty.
    Chameleon,
    /// Any other combination: the component must come through an import.
    Import,
}

impl Strategy {
    /// Pick the strategy for a start namespace and a sought namespace.
    pub fn select(start: Option<&str>, sought: Option<&str>) -> Self {
        match (start, sought) {
            (start, sought) if start == sought => Strategy::Include,
            (None, Some(_)) => Strategy::Chameleon,
            _ => Strategy::Import,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Include => "include",
            Strategy::Chameleon => "chameleon",
            Strategy::Import => "import",
        })
    }
}

// ============================================================================
// CHAMELEON DISPATCH
// ============================================================================

/// Resolution from a document without a namespace into a namespace.
///
/// The document's own content comes first: having no namespace it cannot
/// conflict with anything. Then progressively wider circles, with the
/// mega-include closures last.
fn resolve_chameleon<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    namespace: Option<&str>,
    name: &str,
    kind: ComponentKind,
) -> Option<Component> {
    let start = session.start();

    if let Some(found) = include::resolve_recursive_down(session, start, name, kind) {
        return Some(found);
    }
    if let Some(found) = import::find_in_imports(session, start, namespace, name, kind) {
        return Some(found);
    }

    import::populate_recursively_included_imports(session, start, namespace);
    if let Some(found) = import::find_in_included_imports_down(session, name, kind, false) {
        return Some(found);
    }

    if let Some(found) = include::resolve_upwards(session, start, namespace, name, kind) {
        return Some(found);
    }

    import::populate_mega_included_imports(session, start, namespace);
    if let Some(found) = import::find_in_included_imports_down(session, name, kind, true) {
        return Some(found);
    }

    import::find_in_included_imports_upwards(session, namespace, name, kind, false)
        .or_else(|| import::find_in_included_imports_upwards(session, namespace, name, kind, true))
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolver for global components over a [`SchemaModel`].
///
/// Holds no state between queries; each call builds and drops its own session.
#[derive(Debug)]
pub struct SchemaResolver<'a, M: ?Sized> {
    model: &'a M,
}

impl<'a, M: SchemaModel + ?Sized> SchemaResolver<'a, M> {
    /// Create a new resolver.
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    /// The strategy a query from `start` for `namespace` would use.
    ///
    /// `None` when the start document has no known schema.
    pub fn strategy_for(&self, start: DocId, namespace: Option<&str>) -> Option<Strategy> {
        let own = self.model.target_namespace(start);
        own.is_known().then(|| Strategy::select(own.uri(), namespace))
    }

    /// Find the component `(kind, name)` in `namespace`, as seen from `start`.
    ///
    /// `None` means not found. The start document must have been parsed; a
    /// start document without a schema finds nothing.
    pub fn resolve(
        &self,
        start: DocId,
        namespace: Option<&str>,
        name: &str,
        kind: ComponentKind,
    ) -> Option<Component> {
        let Some(strategy) = self.strategy_for(start, namespace) else {
            tracing::warn!(
                target: "xsd_resolve::resolve",
                %start,
                "resolve called on a document without a schema"
            );
            return None;
        };
        self.resolve_with(strategy, start, namespace, name, kind)
    }

    /// Like [`resolve`](Self::resolve), with the strategy already decided.
    pub fn resolve_with(
        &self,
        strategy: Strategy,
        start: DocId,
        namespace: Option<&str>,
        name: &str,
        kind: ComponentKind,
    ) -> Option<Component> {
        let span = tracing::debug_span!(
            target: "xsd_resolve::resolve",
            "resolve",
            %start,
            ?namespace,
            local_name = name,
            %kind,
            %strategy,
            found = tracing::field::Empty,
        );
        let _guard = span.enter();

        let mut session = ResolveSession::new(self.model, start, namespace);
        let found = match strategy {
            Strategy::Include => include::resolve(&mut session, name, kind),
            Strategy::Import => import::resolve(&mut session, name, kind),
            Strategy::Chameleon => resolve_chameleon(&mut session, namespace, name, kind),
        };

        if let Some(component) = &found {
            span.record("found", tracing::field::display(component.document));
        }
        tracing::debug!(target: "xsd_resolve::resolve", hit = found.is_some(), "resolved");
        found
    }
}

/// Find the component `(kind, name)` in `namespace`, as seen from `start`.
///
/// Shorthand for `SchemaResolver::new(model).resolve(..)`.
pub fn resolve<M: SchemaModel + ?Sized>(
    model: &M,
    start: DocId,
    namespace: Option<&str>,
    name: &str,
    kind: ComponentKind,
) -> Option<Component> {
    SchemaResolver::new(model).resolve(start, namespace, name, kind)
}
