//! Parsed schema document content.

use smol_str::SmolStr;

use super::{ComponentKind, Composition, TargetNamespace};

/// The resolver-relevant content of one parsed schema document.
///
/// Only global components and composition references are kept; everything
/// else a schema says is irrelevant to name resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaDocument {
    target_namespace: Option<SmolStr>,
    components: Vec<(ComponentKind, SmolStr)>,
    compositions: Vec<Composition>,
}

impl SchemaDocument {
    /// A document declaring `target_namespace` (`None` or `""` for none).
    pub fn new(target_namespace: Option<&str>) -> Self {
        Self {
            target_namespace: target_namespace.filter(|ns| !ns.is_empty()).map(SmolStr::new),
            components: Vec::new(),
            compositions: Vec::new(),
        }
    }

    /// A chameleon-eligible document without a target namespace.
    pub fn chameleon() -> Self {
        Self::new(None)
    }

    pub fn with_component(mut self, kind: ComponentKind, name: impl Into<SmolStr>) -> Self {
        self.add_component(kind, name);
        self
    }

    pub fn with_element(self, name: impl Into<SmolStr>) -> Self {
        self.with_component(ComponentKind::Element, name)
    }

    pub fn with_type(self, name: impl Into<SmolStr>) -> Self {
        self.with_component(ComponentKind::Type, name)
    }

    pub fn with_include(self, location: impl Into<SmolStr>) -> Self {
        self.with_composition(Composition::include(location))
    }

    pub fn with_redefine(self, location: impl Into<SmolStr>) -> Self {
        self.with_composition(Composition::redefine(location))
    }

    pub fn with_import(self, namespace: Option<&str>, location: Option<&str>) -> Self {
        self.with_composition(Composition::import(namespace, location))
    }

    pub fn with_composition(mut self, composition: Composition) -> Self {
        self.add_composition(composition);
        self
    }

    pub fn add_component(&mut self, kind: ComponentKind, name: impl Into<SmolStr>) {
        self.components.push((kind, name.into()));
    }

    pub fn add_composition(&mut self, composition: Composition) {
        self.compositions.push(composition);
    }

    pub fn target_namespace(&self) -> TargetNamespace {
        TargetNamespace::from_option(self.target_namespace.as_deref())
    }

    /// Whether a global component `(kind, name)` is declared here.
    ///
    /// The first declaration wins if a document repeats one.
    pub fn declares(&self, kind: ComponentKind, name: &str) -> bool {
        self.components
            .iter()
            .any(|(k, n)| *k == kind && n.as_str() == name)
    }

    pub fn compositions(&self) -> &[Composition] {
        &self.compositions
    }
}
