//! # xsd-resolve
//!
//! Resolution of XML Schema global components across `include`, `redefine`
//! and `import`, including chameleon inclusion of documents without a target
//! namespace.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! xml      → XSD loading into a SchemaSet (feature "xml")
//!   ↓
//! resolve  → Strategies, per-query sessions, inclusion graphs
//!   ↓
//! model    → DocId, SchemaModel trait, SchemaDocument, SchemaSet registry
//! ```
//!
//! ## Example
//!
//! ```
//! use xsd_resolve::{ComponentKind, SchemaDocument, SchemaSet, resolve};
//!
//! let set = SchemaSet::new();
//! let main = set
//!     .insert("main.xsd", SchemaDocument::new(Some("urn:a")).with_include("common.xsd"))
//!     .unwrap();
//! let common = set
//!     .insert("common.xsd", SchemaDocument::chameleon().with_type("Address"))
//!     .unwrap();
//!
//! let found = resolve(&set, main, Some("urn:a"), "Address", ComponentKind::Type).unwrap();
//! assert_eq!(found.document, common);
//! ```

/// Schema content as seen by the resolver
pub mod model;

/// Component resolution across include, redefine and import
pub mod resolve;

/// XSD loading
#[cfg(feature = "xml")]
pub mod xml;

// Re-export the model
pub use model::{
    Component, ComponentKind, Composition, DocId, ModelError, SchemaDocument, SchemaModel, SchemaSet,
    TargetNamespace,
};

// Re-export the resolver
pub use resolve::{BidirectionalGraph, Graph, ResolveSession, SchemaResolver, Strategy, resolve};
