//! Per-query resolution state.

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::graph::BidirectionalGraph;
use crate::model::{DocId, SchemaModel};

/// Which searches have already run for one document in a session.
///
/// Every flag only ever goes from `false` to `true`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checked {
    /// The document's own components were searched.
    pub itself: bool,
    /// Its includes and redefines were descended into.
    pub included: bool,
    /// Its imports were collected (through its include closure).
    pub imports: bool,
}

/// Cache and memoization scope of one top-level resolve call.
///
/// A session reflects the documents as they were when it was created and is
/// discarded once the call returns. It is never shared between calls.
pub struct ResolveSession<'m, M: SchemaModel + ?Sized> {
    model: &'m M,
    start: DocId,
    start_namespace: Option<SmolStr>,
    sought_namespace: Option<SmolStr>,
    checked: FxHashMap<DocId, Checked>,
    imported: IndexSet<DocId>,
    mega_imported: IndexSet<DocId>,
    sought_graph: Option<BidirectionalGraph<DocId>>,
    own_graph: Option<BidirectionalGraph<DocId>>,
}

/// The two namespaces a session ever builds an inclusion graph for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GraphSlot {
    Sought,
    Own,
}

impl<'m, M: SchemaModel + ?Sized> ResolveSession<'m, M> {
    pub fn new(model: &'m M, start: DocId, sought_namespace: Option<&str>) -> Self {
        let start_namespace = model.target_namespace(start).uri().map(SmolStr::new);
        Self {
            model,
            start,
            start_namespace,
            sought_namespace: sought_namespace.map(SmolStr::new),
            checked: FxHashMap::default(),
            imported: IndexSet::new(),
            mega_imported: IndexSet::new(),
            sought_graph: None,
            own_graph: None,
        }
    }

    pub fn model(&self) -> &'m M {
        self.model
    }

    pub fn start(&self) -> DocId {
        self.start
    }

    pub fn start_namespace(&self) -> Option<&str> {
        self.start_namespace.as_deref()
    }

    pub fn sought_namespace(&self) -> Option<&str> {
        self.sought_namespace.as_deref()
    }

    /// Current flags for `doc`.
    pub fn checked(&self, doc: DocId) -> Checked {
        self.checked.get(&doc).copied().unwrap_or_default()
    }

    /// Mutable flags for `doc`, created on first access.
    pub fn checked_mut(&mut self, doc: DocId) -> &mut Checked {
        self.checked.entry(doc).or_default()
    }

    /// Documents found through imports of the include closure.
    pub fn imported(&self) -> &IndexSet<DocId> {
        &self.imported
    }

    pub fn imported_mut(&mut self) -> &mut IndexSet<DocId> {
        &mut self.imported
    }

    /// Documents found through imports of the mega-include cluster.
    pub fn mega_imported(&self) -> &IndexSet<DocId> {
        &self.mega_imported
    }

    pub fn mega_imported_mut(&mut self) -> &mut IndexSet<DocId> {
        &mut self.mega_imported
    }

    /// The inclusion graph of `namespace`, extended so that it covers `doc`.
    ///
    /// Only the sought namespace and the start document's own namespace are
    /// valid here; anything else is a caller bug and yields `None`.
    pub fn inclusion_graph(
        &mut self,
        doc: DocId,
        namespace: Option<&str>,
    ) -> Option<&mut BidirectionalGraph<DocId>> {
        let slot = if namespace == self.sought_namespace() {
            GraphSlot::Sought
        } else if namespace == self.start_namespace() {
            GraphSlot::Own
        } else {
            tracing::error!(
                target: "xsd_resolve::session",
                ?namespace,
                sought = ?self.sought_namespace,
                own = ?self.start_namespace,
                "inclusion graph requested for a namespace foreign to the session"
            );
            debug_assert!(false, "inclusion graph requested for foreign namespace {namespace:?}");
            return None;
        };

        let model = self.model;
        let graph = match slot {
            GraphSlot::Sought => &mut self.sought_graph,
            GraphSlot::Own => &mut self.own_graph,
        };
        let graph = graph.get_or_insert_with(|| build_inclusion_graph(model, namespace));
        extend_inclusion_graph(model, graph, doc, namespace);
        Some(graph)
    }
}

/// Whether a document reached through an include may join `namespace`'s graph.
///
/// Documents of the same namespace and chameleons qualify; unparsed ones never do.
fn admits<M: SchemaModel + ?Sized>(model: &M, doc: DocId, namespace: Option<&str>) -> bool {
    let target = model.target_namespace(doc);
    target.is_known() && (target.uri().is_none() || target.uri() == namespace)
}

/// Inclusion edges reachable from every known document declaring exactly `namespace`.
fn build_inclusion_graph<M: SchemaModel + ?Sized>(
    model: &M,
    namespace: Option<&str>,
) -> BidirectionalGraph<DocId> {
    let mut graph = BidirectionalGraph::new();
    let candidates: Vec<DocId> = model
        .documents()
        .into_iter()
        .filter(|&doc| model.target_namespace(doc).matches(namespace))
        .collect();
    let count = candidates.len();
    walk_inclusions(model, &mut graph, candidates, namespace);

    tracing::trace!(
        target: "xsd_resolve::session",
        ?namespace,
        candidates = count,
        includers = graph.forward().len(),
        "built inclusion graph"
    );
    graph
}

/// Add the include closure of `doc` and of its roots, for documents the
/// registry snapshot did not cover.
fn extend_inclusion_graph<M: SchemaModel + ?Sized>(
    model: &M,
    graph: &mut BidirectionalGraph<DocId>,
    doc: DocId,
    namespace: Option<&str>,
) {
    let mut pending: Vec<DocId> = graph.roots(doc, false).into_iter().collect();
    pending.push(doc);
    walk_inclusions(model, graph, pending, namespace);
}

/// Record every include and redefine edge reachable from `pending`.
///
/// Each document is expanded once per walk, so include cycles terminate.
fn walk_inclusions<M: SchemaModel + ?Sized>(
    model: &M,
    graph: &mut BidirectionalGraph<DocId>,
    mut pending: Vec<DocId>,
    namespace: Option<&str>,
) {
    let mut visited = FxHashSet::default();
    while let Some(current) = pending.pop() {
        if !visited.insert(current) {
            continue;
        }
        for composition in model.compositions(current) {
            if !composition.is_inclusion() {
                continue;
            }
            let Some(target) = model.resolve_composition(current, &composition) else {
                continue;
            };
            if !admits(model, target, namespace) {
                continue;
            }
            if graph.put(current, target) {
                tracing::trace!(
                    target: "xsd_resolve::session",
                    from = %current,
                    to = %target,
                    "inclusion edge"
                );
            }
            pending.push(target);
        }
    }
}
