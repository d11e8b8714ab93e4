//! Document location arithmetic.
//!
//! Locations are `/`-separated strings: plain paths (`schemas/a.xsd`,
//! `/abs/a.xsd`) or URIs (`file:/abs/a.xsd`, `http://host/a.xsd`). A
//! `schemaLocation` is resolved against the location of the document that
//! carries it, the way a browser resolves a relative link.

/// Resolve `relative` against the location of the referencing document.
///
/// Absolute references (leading `/`, a URI scheme, a drive letter) are only
/// normalized. Relative ones replace the last segment of `base`.
pub fn join(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return normalize(base);
    }
    if is_absolute(relative) {
        return normalize(relative);
    }
    let dir = match base.rfind('/') {
        Some(idx) => &base[..=idx],
        None => "",
    };
    normalize(&format!("{dir}{relative}"))
}

/// Whether a location stands on its own, without a base.
pub fn is_absolute(location: &str) -> bool {
    location.starts_with('/') || has_scheme(location) || has_drive_letter(location)
}

/// Remove `.` and `..` segments.
///
/// Leading `..` segments of a relative location are kept; `..` never climbs
/// above the root of an absolute one.
pub fn normalize(location: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in location.split('/') {
        match segment {
            "." => {}
            ".." => match out.last() {
                Some(&last) if !last.is_empty() && last != ".." && !last.ends_with(':') => {
                    out.pop();
                }
                None => out.push(".."),
                Some(&"..") => out.push(".."),
                Some(_) => {}
            },
            other => out.push(other),
        }
    }
    out.join("/")
}

fn has_scheme(location: &str) -> bool {
    let Some(idx) = location.find(':') else {
        return false;
    };
    let scheme = &location[..idx];
    scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn has_drive_letter(location: &str) -> bool {
    let bytes = location.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
