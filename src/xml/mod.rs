//! XSD loading: populating a [`SchemaSet`] from schema files.
//!
//! Only what resolution needs is read: the root's `targetNamespace`, named
//! top-level components, and `include`/`redefine`/`import`. Prefixes are
//! ignored; elements are matched by local name.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::model::{
    ComponentKind, Composition, DocId, ModelError, SchemaDocument, SchemaModel, SchemaSet, location,
};

/// Errors raised while loading schema documents.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document has no root element")]
    NoRoot,

    #[error("root element is '{0}', not a schema")]
    NotASchema(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Outcome of loading many files at once.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Documents registered with parsed content.
    pub loaded: Vec<DocId>,
    /// Files that could not be read or parsed. Their locations are reserved,
    /// so references to them resolve to documents without a schema.
    pub failed: Vec<(PathBuf, LoadError)>,
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse schema text into a [`SchemaDocument`].
pub fn parse_schema(text: &str) -> Result<SchemaDocument, LoadError> {
    let mut reader = Reader::from_str(text);
    let mut document: Option<SchemaDocument> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                visit(&element, depth, &mut document)?;
                depth += 1;
            }
            Event::Empty(element) => visit(&element, depth, &mut document)?,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    document.ok_or(LoadError::NoRoot)
}

/// Handle one element at `depth` (0 = root).
fn visit(element: &BytesStart<'_>, depth: usize, document: &mut Option<SchemaDocument>) -> Result<(), LoadError> {
    let local = element.local_name();
    let local = String::from_utf8_lossy(local.as_ref());

    if depth == 0 {
        if local != "schema" {
            return Err(LoadError::NotASchema(local.into_owned()));
        }
        let namespace = attribute(element, "targetNamespace")?;
        *document = Some(SchemaDocument::new(namespace.as_deref()));
        return Ok(());
    }
    if depth > 1 {
        return Ok(());
    }
    let Some(document) = document.as_mut() else {
        return Ok(());
    };

    match &*local {
        "include" | "redefine" | "import" => {
            let location = attribute(element, "schemaLocation")?;
            let composition = match (&*local, location) {
                ("include", Some(location)) => Composition::include(location),
                ("redefine", Some(location)) => Composition::redefine(location),
                ("import", location) => {
                    let namespace = attribute(element, "namespace")?;
                    Composition::import(namespace.as_deref(), location.as_deref())
                }
                // include or redefine without a location refers to nothing
                _ => return Ok(()),
            };
            document.add_composition(composition);
        }
        other => {
            let Some(kind) = component_kind(other) else {
                return Ok(());
            };
            if let Some(name) = attribute(element, "name")? {
                document.add_component(kind, name);
            }
        }
    }
    Ok(())
}

fn component_kind(local_name: &str) -> Option<ComponentKind> {
    match local_name {
        "element" => Some(ComponentKind::Element),
        "complexType" | "simpleType" => Some(ComponentKind::Type),
        "attribute" => Some(ComponentKind::Attribute),
        "attributeGroup" => Some(ComponentKind::AttributeGroup),
        "group" => Some(ComponentKind::Group),
        _ => None,
    }
}

/// Unescaped value of the unprefixed attribute `name`.
fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, LoadError> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

// ============================================================================
// LOADING
// ============================================================================

/// The location a file is registered under.
fn path_location(path: &Path) -> String {
    location::normalize(&path.to_string_lossy().replace('\\', "/"))
}

/// The file behind a location, if it names one.
fn location_path(location: &str) -> Option<PathBuf> {
    if let Some(rest) = location.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if let Some(rest) = location.strip_prefix("file:") {
        return Some(PathBuf::from(rest));
    }
    let is_uri = location::is_absolute(location) && !location.starts_with('/') && !is_drive_path(location);
    (!is_uri).then(|| PathBuf::from(location))
}

fn is_drive_path(location: &str) -> bool {
    let bytes = location.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Parse `text` and register it under `location`.
pub fn load_str(set: &SchemaSet, location: &str, text: &str) -> Result<DocId, LoadError> {
    let document = parse_schema(text)?;
    Ok(set.insert(location, document)?)
}

/// Read, parse and register a single file.
pub fn load_file(set: &SchemaSet, path: &Path) -> Result<DocId, LoadError> {
    let text = read(path)?;
    load_str(set, &path_location(path), &text)
}

/// Load a file and every local file it references, transitively.
///
/// Only the root file must load. A referenced file that cannot be read or
/// parsed is reserved instead, so it resolves to a document without a schema.
pub fn load_closure(set: &SchemaSet, path: &Path) -> Result<DocId, LoadError> {
    let root = load_file(set, path)?;
    let mut pending = vec![root];

    while let Some(doc) = pending.pop() {
        let Some(base) = set.location(doc) else {
            continue;
        };
        for composition in set.compositions(doc) {
            let Some(relative) = composition.location() else {
                continue;
            };
            let target = location::join(&base, relative);
            if set.doc_id(&target).is_some() {
                continue;
            }
            let Some(file) = location_path(&target) else {
                continue;
            };
            match read(&file).and_then(|text| load_str(set, &target, &text)) {
                Ok(loaded) => pending.push(loaded),
                Err(err) => {
                    tracing::warn!(
                        target: "xsd_resolve::xml",
                        location = %target,
                        error = %err,
                        "referenced schema could not be loaded"
                    );
                    set.reserve(&target);
                }
            }
        }
    }
    Ok(root)
}

/// Load every `.xsd` file under `dir`. Files are parsed in parallel.
pub fn load_dir(set: &SchemaSet, dir: &Path) -> Result<LoadReport, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::Io {
            path: dir.to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "xsd"))
        .collect();
    paths.sort();

    // Parse files in parallel
    let parsed: Vec<_> = paths
        .par_iter()
        .map(|path| (path, read(path).and_then(|text| parse_schema(&text))))
        .collect();

    // Register sequentially so ids follow path order
    let mut report = LoadReport::default();
    for (path, result) in parsed {
        let location = path_location(path);
        match result.and_then(|document| set.insert(&location, document).map_err(LoadError::from)) {
            Ok(doc) => report.loaded.push(doc),
            Err(err) => {
                set.reserve(&location);
                report.failed.push((path.clone(), err));
            }
        }
    }
    Ok(report)
}
