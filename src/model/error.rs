use smol_str::SmolStr;

use super::DocId;

/// Errors raised while populating a [`SchemaSet`](super::SchemaSet).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A parsed document is already registered under this location.
    #[error("a schema is already registered at '{0}'")]
    DuplicateLocation(SmolStr),

    /// The id was never handed out by this registry, or has been removed.
    #[error("unknown document {0}")]
    UnknownDocument(DocId),
}
