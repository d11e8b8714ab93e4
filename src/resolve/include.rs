//! Resolution within one namespace neighborhood.
//!
//! Two directions are searched:
//!
//! - **down**: a document and everything it includes or redefines, transitively;
//! - **up**: the mega-include cluster, i.e. every document reachable from the
//!   inclusion roots above a document. Whatever transitively includes a
//!   document can see its declarations, and vice versa.

use indexmap::IndexSet;
use smol_str::SmolStr;

use super::session::ResolveSession;
use crate::model::{Component, ComponentKind, DocId, SchemaModel};

/// Search `doc`, then its includes and redefines depth-first.
///
/// Each document is searched locally and descended into at most once per
/// session, which is what makes include cycles terminate.
pub fn resolve_recursive_down<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    doc: DocId,
    name: &str,
    kind: ComponentKind,
) -> Option<Component> {
    let model = session.model();

    let checked = session.checked_mut(doc);
    if !checked.itself {
        checked.itself = true;
        if let Some(found) = model.find_component(doc, kind, name) {
            return Some(found);
        }
    }

    let checked = session.checked_mut(doc);
    if checked.included {
        return None;
    }
    checked.included = true;

    for composition in model.compositions(doc) {
        if !composition.is_inclusion() {
            continue;
        }
        let Some(target) = model.resolve_composition(doc, &composition) else {
            continue;
        };
        tracing::trace!(target: "xsd_resolve::include", from = %doc, to = %target, "descending");
        if let Some(found) = resolve_recursive_down(session, target, name, kind) {
            return Some(found);
        }
    }
    None
}

/// Search the mega-include cluster of `doc` under `namespace`.
///
/// Cluster members are already a transitive closure, so only their own
/// components are looked at. Members searched earlier in the session are skipped.
pub fn resolve_upwards<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    doc: DocId,
    namespace: Option<&str>,
    name: &str,
    kind: ComponentKind,
) -> Option<Component> {
    let model = session.model();
    for candidate in mega_included_models(session, doc, namespace) {
        let checked = session.checked_mut(candidate);
        if checked.itself {
            continue;
        }
        checked.itself = true;
        if let Some(found) = model.find_component(candidate, kind, name) {
            tracing::trace!(target: "xsd_resolve::include", from = %doc, at = %candidate, "found upwards");
            return Some(found);
        }
    }
    None
}

/// Documents that see `doc`'s declarations by having included it, directly
/// or indirectly, through a chain that stays in `sought`, plus everything
/// those includers include. `doc` itself is left out.
///
/// A document with its own namespace can only be mega-included under that
/// namespace; chameleons can be mega-included under any.
pub fn mega_included_models<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    doc: DocId,
    sought: Option<&str>,
) -> IndexSet<DocId> {
    let model = session.model();
    let own = model.target_namespace(doc);
    if !own.is_known() {
        return IndexSet::new();
    }
    if own.uri().is_some() && own.uri() != sought {
        return IndexSet::new();
    }

    let Some(graph) = session.inclusion_graph(doc, sought) else {
        return IndexSet::new();
    };

    let mut cluster = IndexSet::new();
    for root in graph.roots(doc, false) {
        if model.target_namespace(root).matches(sought) {
            cluster.extend(graph.reachable_from(root));
        }
    }
    cluster.shift_remove(&doc);

    tracing::trace!(
        target: "xsd_resolve::include",
        %doc,
        ?sought,
        size = cluster.len(),
        "mega-include cluster"
    );
    cluster
}

/// Same-namespace resolution: down from the start document, then upwards.
pub fn resolve<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    name: &str,
    kind: ComponentKind,
) -> Option<Component> {
    let start = session.start();
    let namespace = session.sought_namespace().map(SmolStr::new);
    let namespace = namespace.as_deref();

    resolve_recursive_down(session, start, name, kind)
        .or_else(|| resolve_upwards(session, start, namespace, name, kind))
}
