//! Resolution across a namespace boundary.
//!
//! Imports are collected in widening circles (the document itself, its
//! include closure, its mega-include cluster) and every imported document is
//! then searched down and, failing that, upwards. Collecting and searching are
//! separate passes so each circle is exhausted before the next one is opened.

use smol_str::SmolStr;

use super::include;
use super::session::ResolveSession;
use crate::model::{Component, ComponentKind, DocId, SchemaModel};

/// Search the documents `doc` directly imports for `namespace`.
///
/// Every resolved target is recorded as imported and marked searched, hit or
/// not, so later passes do not look at its components again.
pub fn find_in_imports<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    doc: DocId,
    namespace: Option<&str>,
    name: &str,
    kind: ComponentKind,
) -> Option<Component> {
    let model = session.model();
    for composition in model.compositions(doc) {
        if !composition.imports(namespace) {
            continue;
        }
        let Some(target) = model.resolve_composition(doc, &composition) else {
            continue;
        };
        session.imported_mut().insert(target);

        let checked = session.checked_mut(target);
        if checked.itself {
            continue;
        }
        checked.itself = true;
        if let Some(found) = model.find_component(target, kind, name) {
            tracing::trace!(target: "xsd_resolve::import", from = %doc, at = %target, "found in direct import");
            return Some(found);
        }
    }
    None
}

/// Collect imports of `namespace` made anywhere in `doc`'s include closure.
///
/// Nothing is searched here; see [`find_in_included_imports_down`].
pub fn populate_recursively_included_imports<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    doc: DocId,
    namespace: Option<&str>,
) {
    let checked = session.checked_mut(doc);
    if checked.imports {
        return;
    }
    checked.imports = true;

    let model = session.model();
    for composition in model.compositions(doc) {
        if composition.imports(namespace) {
            if let Some(target) = model.resolve_composition(doc, &composition) {
                session.imported_mut().insert(target);
            }
        } else if composition.is_inclusion() {
            if let Some(target) = model.resolve_composition(doc, &composition) {
                populate_recursively_included_imports(session, target, namespace);
            }
        }
    }
}

/// Collect imports of `namespace` made by any member of `doc`'s mega-include
/// cluster, computed under `doc`'s own namespace.
pub fn populate_mega_included_imports<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    doc: DocId,
    namespace: Option<&str>,
) {
    let model = session.model();
    let own = model.target_namespace(doc).uri().map(SmolStr::new);
    for member in include::mega_included_models(session, doc, own.as_deref()) {
        for composition in model.compositions(member) {
            if !composition.imports(namespace) {
                continue;
            }
            if let Some(target) = model.resolve_composition(member, &composition) {
                session.mega_imported_mut().insert(target);
            }
        }
    }
    tracing::trace!(
        target: "xsd_resolve::import",
        %doc,
        collected = session.mega_imported().len(),
        "mega-included imports"
    );
}

/// Search each collected import and what it includes.
pub fn find_in_included_imports_down<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    name: &str,
    kind: ComponentKind,
    use_mega: bool,
) -> Option<Component> {
    for target in collected(session, use_mega) {
        if let Some(found) = include::resolve_recursive_down(session, target, name, kind) {
            return Some(found);
        }
    }
    None
}

/// Search the mega-include cluster of each collected import.
pub fn find_in_included_imports_upwards<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    namespace: Option<&str>,
    name: &str,
    kind: ComponentKind,
    use_mega: bool,
) -> Option<Component> {
    for target in collected(session, use_mega) {
        if let Some(found) = include::resolve_upwards(session, target, namespace, name, kind) {
            return Some(found);
        }
    }
    None
}

fn collected<M: SchemaModel + ?Sized>(session: &ResolveSession<'_, M>, use_mega: bool) -> Vec<DocId> {
    let set = if use_mega {
        session.mega_imported()
    } else {
        session.imported()
    };
    set.iter().copied().collect()
}

/// Cross-namespace resolution, from the nearest imports outwards.
pub fn resolve<M: SchemaModel + ?Sized>(
    session: &mut ResolveSession<'_, M>,
    name: &str,
    kind: ComponentKind,
) -> Option<Component> {
    let start = session.start();
    let namespace = session.sought_namespace().map(SmolStr::new);
    let namespace = namespace.as_deref();

    if let Some(found) = find_in_imports(session, start, namespace, name, kind) {
        return Some(found);
    }

    populate_recursively_included_imports(session, start, namespace);
    if let Some(found) = find_in_included_imports_down(session, name, kind, false) {
        return Some(found);
    }

    populate_mega_included_imports(session, start, namespace);
    if let Some(found) = find_in_included_imports_down(session, name, kind, true) {
        return Some(found);
    }

    find_in_included_imports_upwards(session, namespace, name, kind, false)
        .or_else(|| find_in_included_imports_upwards(session, namespace, name, kind, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SchemaDocument, SchemaSet};

    fn ns(uri: &str) -> SchemaDocument {
        SchemaDocument::new(Some(uri))
    }

    #[test]
    fn test_find_in_imports_matches_namespace() {
        let set = SchemaSet::new();
        let x = set
            .insert(
                "x.xsd",
                ns("urn:x")
                    .with_import(Some("urn:z"), Some("z.xsd"))
                    .with_import(Some("urn:y"), Some("y.xsd")),
            )
            .unwrap();
        let y = set.insert("y.xsd", ns("urn:y").with_element("Bar")).unwrap();
        let z = set.insert("z.xsd", ns("urn:z").with_element("Bar")).unwrap();

        let mut session = ResolveSession::new(&set, x, Some("urn:y"));
        let found = find_in_imports(&mut session, x, Some("urn:y"), "Bar", ComponentKind::Element);
        assert_eq!(found.map(|c| c.document), Some(y));
        assert!(session.imported().contains(&y));
        assert!(!session.imported().contains(&z));
    }

    #[test]
    fn test_find_in_imports_marks_misses() {
        let set = SchemaSet::new();
        let x = set.insert("x.xsd", ns("urn:x").with_import(Some("urn:y"), Some("y.xsd"))).unwrap();
        let y = set.insert("y.xsd", ns("urn:y")).unwrap();

        let mut session = ResolveSession::new(&set, x, Some("urn:y"));
        assert!(find_in_imports(&mut session, x, Some("urn:y"), "Nope", ComponentKind::Type).is_none());
        assert!(session.checked(y).itself);
        assert!(session.imported().contains(&y));
    }

    #[test]
    fn test_populate_follows_include_closure() {
        let set = SchemaSet::new();
        let x = set.insert("x.xsd", ns("urn:x").with_include("x2.xsd")).unwrap();
        let x2 = set
            .insert("x2.xsd", ns("urn:x").with_include("x.xsd").with_import(Some("urn:y"), Some("y.xsd")))
            .unwrap();
        let y = set.insert("y.xsd", ns("urn:y")).unwrap();

        let mut session = ResolveSession::new(&set, x, Some("urn:y"));
        populate_recursively_included_imports(&mut session, x, Some("urn:y"));

        assert_eq!(session.imported().iter().copied().collect::<Vec<_>>(), vec![y]);
        assert!(session.checked(x).imports && session.checked(x2).imports);
        // collecting does not search
        assert!(!session.checked(y).itself);
    }

    #[test]
    fn test_populate_mega_included_imports() {
        // the includer of x imports urn:y; x itself imports nothing
        let set = SchemaSet::new();
        set.insert(
            "top.xsd",
            ns("urn:x").with_include("x.xsd").with_import(Some("urn:y"), Some("y.xsd")),
        )
        .unwrap();
        let x = set.insert("x.xsd", ns("urn:x")).unwrap();
        let y = set.insert("y.xsd", ns("urn:y").with_type("T")).unwrap();

        let mut session = ResolveSession::new(&set, x, Some("urn:y"));
        populate_mega_included_imports(&mut session, x, Some("urn:y"));
        assert!(session.mega_imported().contains(&y));

        let found = find_in_included_imports_down(&mut session, "T", ComponentKind::Type, true);
        assert_eq!(found.map(|c| c.document), Some(y));
    }

    #[test]
    fn test_upwards_from_imported_document() {
        // x imports y2, and only y1 (which includes y2) declares the type
        let set = SchemaSet::new();
        let x = set.insert("x.xsd", ns("urn:x").with_import(Some("urn:y"), Some("y2.xsd"))).unwrap();
        let y1 = set.insert("y1.xsd", ns("urn:y").with_type("T").with_include("y2.xsd")).unwrap();
        set.insert("y2.xsd", ns("urn:y")).unwrap();

        let mut session = ResolveSession::new(&set, x, Some("urn:y"));
        let found = resolve(&mut session, "T", ComponentKind::Type);
        assert_eq!(found.map(|c| c.document), Some(y1));
    }
}
